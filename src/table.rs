//! Per-document tables
//!
//! Tables are CSV with a header row. Per-document tables carry a leading
//! unnamed row-index column, which [`read_table`] drops again.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::word::{COLUMNS, Word};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write words as a per-document table
pub fn write_words<W: Write>(output: W, words: &[Word]) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_writer(output);

    let header: Vec<&str> = std::iter::once("").chain(COLUMNS).collect();
    writer.write_record(&header)?;

    for (i, word) in words.iter().enumerate() {
        let index = i.to_string();
        let mut record = Vec::with_capacity(COLUMNS.len() + 1);
        record.push(index.as_str());
        record.extend(word.fields());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write words as a per-document table at `path`
pub fn write_words_to_path(path: &Path, words: &[Word]) -> Result<(), TableError> {
    let file = File::create(path)?;
    write_words(file, words)
}

/// A table held in memory, without its row-index column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Position of a named column
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

/// Read a whole table; a leading unnamed column is treated as the row index
pub fn read_table(path: &Path) -> Result<Table, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let skip = usize::from(headers.get(0) == Some(""));
    let header: Vec<String> = headers.iter().skip(skip).map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().skip(skip).map(str::to_string).collect());
    }

    Ok(Table { header, rows })
}
