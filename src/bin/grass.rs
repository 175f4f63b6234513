use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use mimalloc::MiMalloc;
use tracing_subscriber::EnvFilter;

use grass::config::{Config, DEFAULT_GRASS_DIR, DEFAULT_OUTPUT, DEFAULT_SUFFIX};
use grass::{Corpus, normalize_dir, process_corpus};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Flatten Macula Greek syntax trees into word tables", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory for per-document tables
    #[arg(long, global = true, value_name = "DIRECTORY_PATH", env = "GRASS_DIR", default_value = DEFAULT_GRASS_DIR)]
    grass_dir: PathBuf,

    /// Consolidated output table
    #[arg(short, long, global = true, value_name = "FILE", env = "GRASS_OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Suffix replacing the input extension for per-document tables
    #[arg(long, global = true, value_name = "SUFFIX", default_value = DEFAULT_SUFFIX)]
    suffix: String,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Flatten every matching file, then normalize the intermediate tables
    #[command(arg_required_else_help = true)]
    Run {
        /// Glob patterns of Macula XML files (.xml or .xml.gz)
        #[arg(value_name = "PATTERN", required = true)]
        patterns: Vec<String>,
    },

    /// Write per-document tables only
    #[command(arg_required_else_help = true)]
    Flatten {
        /// Glob patterns of Macula XML files (.xml or .xml.gz)
        #[arg(value_name = "PATTERN", required = true)]
        patterns: Vec<String>,
    },

    /// Consolidate the intermediate directory into the output table
    Normalize,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let env_filter = match (quiet, verbose) {
        (true, _) => EnvFilter::new("error"),
        (false, 0) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        (false, 1) => EnvFilter::new("debug"),
        (false, _) => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

impl Cli {
    fn config(&self) -> Config {
        Config::default()
            .with_grass_dir(&self.grass_dir)
            .with_output(&self.output)
            .with_suffix(&self.suffix)
    }
}

fn flatten(patterns: &[String], config: &Config) -> Result<()> {
    let corpus = Corpus::from_globs(patterns)?;
    let report = process_corpus(&corpus, config)?;
    if !report.is_success() {
        tracing::warn!("{} documents skipped during flattening", report.failed.len());
    }
    Ok(())
}

fn normalize(config: &Config) -> Result<()> {
    let report = normalize_dir(&config.grass_dir, &config.output)?;
    if !report.skipped.is_empty() {
        tracing::warn!("{} tables skipped during normalization", report.skipped.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = cli.config();

    match cli.command {
        Commands::Run { patterns } => {
            flatten(&patterns, &config)?;
            normalize(&config)?;
        }
        Commands::Flatten { patterns } => flatten(&patterns, &config)?,
        Commands::Normalize => normalize(&config)?,
    }

    Ok(())
}
