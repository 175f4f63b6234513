//! Run configuration

use std::path::{Path, PathBuf};

/// Default directory for per-document tables
pub const DEFAULT_GRASS_DIR: &str = "grass";

/// Default consolidated output file
pub const DEFAULT_OUTPUT: &str = "macula_grass.csv";

/// Suffix replacing the input extension for per-document tables
pub const DEFAULT_SUFFIX: &str = "_flat_corrected.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Intermediate directory holding per-document tables
    pub grass_dir: PathBuf,
    /// Consolidated output file
    pub output: PathBuf,
    /// Per-document table suffix; must end in `.csv` to be normalized
    pub suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grass_dir: PathBuf::from(DEFAULT_GRASS_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl Config {
    pub fn with_grass_dir(mut self, grass_dir: impl Into<PathBuf>) -> Self {
        self.grass_dir = grass_dir.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Where the per-document table for `input` goes
    ///
    /// `01-matthew.xml` and `01-matthew.xml.gz` both become
    /// `<grass_dir>/01-matthew_flat_corrected.csv`.
    pub fn table_path_for(&self, input: &Path) -> PathBuf {
        let name = input
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let name = name.strip_suffix(".gz").unwrap_or(&name);
        let stem = Path::new(name)
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default();
        self.grass_dir.join(format!("{}{}", stem, self.suffix))
    }
}
