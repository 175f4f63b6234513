//! Per-document pipeline and corpus driver
//!
//! Each document is parsed, flattened, put in reference order and
//! clause-corrected, then written as its own table. A document that fails
//! at any step is reported and skipped; the rest of the corpus still runs.
//! Once every document has been tried, the intermediate tables are
//! normalized into one corpus-wide table.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::Config;
use crate::correct::correct_clauses;
use crate::corpus::Corpus;
use crate::flatten::flatten_document;
use crate::macula::{MaculaReader, ParseError};
use crate::natural::sort_by_reference;
use crate::normalize::{NormalizeError, NormalizeReport, normalize_dir};
use crate::table::{TableError, write_words_to_path};
use crate::tree::Document;
use crate::word::Word;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Failed to open file {path:?}: {source}")]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Normalize error: {0}")]
    Normalize(#[from] NormalizeError),
}

/// Flatten, sort by reference and correct clauses
pub fn flatten_corrected(document: &Document) -> Vec<Word> {
    let mut words = flatten_document(document);
    sort_by_reference(&mut words);
    let corrected = correct_clauses(&mut words);
    tracing::debug!("Corrected {} of {} words", corrected, words.len());
    words
}

/// Run one input file through the pipeline; returns the table written
///
/// On failure no table is left behind for this input.
pub fn process_document(input: &Path, config: &Config) -> Result<PathBuf, PipelineError> {
    let reader = MaculaReader::from_file(input).map_err(|source| PipelineError::FileOpen {
        path: input.to_path_buf(),
        source,
    })?;
    let document = reader.read_document()?;
    let words = flatten_corrected(&document);

    let output = config.table_path_for(input);
    if let Err(e) = write_words_to_path(&output, &words) {
        let _ = fs::remove_file(&output);
        return Err(e.into());
    }

    tracing::info!(
        "Wrote {} words from {} sentences ({} nodes) to {:?}",
        words.len(),
        document.sentences.len(),
        document.node_count(),
        output
    );
    Ok(output)
}

/// Outcome of flattening a corpus
#[derive(Debug, Default)]
pub struct CorpusReport {
    /// Tables written, in processing order
    pub written: Vec<PathBuf>,
    /// Inputs that failed, with the reason
    pub failed: Vec<(PathBuf, PipelineError)>,
}

impl CorpusReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Flatten every document of a corpus into the intermediate directory
///
/// Only failing to create the intermediate directory is an error.
pub fn process_corpus(corpus: &Corpus, config: &Config) -> Result<CorpusReport, PipelineError> {
    fs::create_dir_all(&config.grass_dir)?;

    let mut report = CorpusReport::default();
    for path in corpus {
        tracing::info!("Processing {:?}...", path);
        match process_document(path, config) {
            Ok(output) => report.written.push(output),
            Err(e) => {
                tracing::error!("Error processing {:?}: {}", path, e);
                report.failed.push((path.clone(), e));
            }
        }
    }

    tracing::info!(
        "Flattened {} of {} documents",
        report.written.len(),
        corpus.len()
    );
    Ok(report)
}

/// Flatten a corpus, then normalize the intermediate directory
pub fn run(
    corpus: &Corpus,
    config: &Config,
) -> Result<(CorpusReport, NormalizeReport), PipelineError> {
    let flattened = process_corpus(corpus, config)?;
    let normalized = normalize_dir(&config.grass_dir, &config.output)?;
    Ok((flattened, normalized))
}
