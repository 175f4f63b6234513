//! Input discovery
//!
//! A [`Corpus`] is the ordered list of treebank files to flatten, built
//! from explicit paths or glob patterns. [`list_tables`] finds the
//! per-document tables the normalizer consumes.

use std::io;
use std::path::{Path, PathBuf};

/// Ordered collection of treebank files
///
/// # Examples
///
/// ```no_run
/// use grass::Corpus;
///
/// let corpus = Corpus::from_glob("Nestle1904/nodes/*.xml").unwrap();
/// for path in &corpus {
///     println!("{}", path.display());
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    paths: Vec<PathBuf>,
}

impl Corpus {
    /// Create from a glob pattern
    ///
    /// Files are processed in sorted order for deterministic results.
    pub fn from_glob(pattern: &str) -> Result<Self, glob::PatternError> {
        Self::from_globs(&[pattern])
    }

    /// Create from several glob patterns
    ///
    /// Each pattern's matches are sorted, patterns keep their given order,
    /// and a file matched twice is only listed the first time.
    pub fn from_globs<S: AsRef<str>>(patterns: &[S]) -> Result<Self, glob::PatternError> {
        let mut paths: Vec<PathBuf> = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let mut matched: Vec<PathBuf> = glob::glob(pattern)?
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!("Cannot read {:?}: {}", e.path(), e.error());
                        None
                    }
                })
                .filter(|path| path.is_file())
                .collect();
            if matched.is_empty() {
                tracing::warn!("No files match {:?}", pattern);
            }
            matched.sort();
            for path in matched {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }

        Ok(Self::from_paths(paths))
    }

    /// Create from explicit file paths, kept in the given order
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }
}

impl IntoIterator for Corpus {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Every `*.csv` file directly in `dir`, sorted by file name
pub fn list_tables(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut tables = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            tables.push(path);
        }
    }
    tables.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(tables)
}
