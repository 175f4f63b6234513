//! Cross-file identifier normalization
//!
//! Sentence, clause and phrase identifiers are only unique within the
//! document they came from. The [`Normalizer`] consumes per-document
//! tables in a fixed order and rewrites each identifier column to dense
//! integers `1..=k`, assigned in first-seen order across the corpus.
//!
//! Each column has its own [`IdMap`]. Maps only ever grow, so a raw value
//! keeps the integer it was first given for the rest of the run.

use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use lasso::{Key, Rodeo, Spur};
use rustc_hash::FxBuildHasher;
use thiserror::Error;

use crate::corpus::list_tables;
use crate::table::{Table, TableError, read_table};
use crate::word::FALLBACK_HEADER;

/// Identifier columns rewritten by the normalizer
pub const ID_COLUMNS: [&str; 3] = ["sentence_id", "clause_id", "phrase_id"];

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Table has no {0:?} column")]
    MissingColumn(&'static str),

    #[error("Identifier space exhausted for {0:?}")]
    IdSpaceExhausted(&'static str),
}

/// Append-only bijection from raw identifiers to `1..=len`
pub struct IdMap {
    ids: Rodeo<Spur, FxBuildHasher>,
}

impl fmt::Debug for IdMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdMap").field("len", &self.ids.len()).finish()
    }
}

impl Default for IdMap {
    fn default() -> Self {
        Self::new()
    }
}

impl IdMap {
    pub fn new() -> Self {
        Self {
            ids: Rodeo::with_hasher(FxBuildHasher),
        }
    }

    /// Integer for `raw`, assigning the next one if unseen
    pub fn get_or_assign(&mut self, raw: &str) -> Option<usize> {
        self.ids
            .try_get_or_intern(raw)
            .ok()
            .map(|key| key.into_usize() + 1)
    }

    /// Number of distinct raw identifiers seen
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Corpus-wide identifier rewriting and row accumulation
#[derive(Debug, Default)]
pub struct Normalizer {
    maps: [IdMap; 3],
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sentence_ids(&self) -> &IdMap {
        &self.maps[0]
    }

    pub fn clause_ids(&self) -> &IdMap {
        &self.maps[1]
    }

    pub fn phrase_ids(&self) -> &IdMap {
        &self.maps[2]
    }

    /// Output header: the first table's columns, or the fallback
    pub fn header(&self) -> Vec<String> {
        match &self.header {
            Some(header) => header.clone(),
            None => FALLBACK_HEADER.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Rewritten rows, in accumulation order
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Rewrite and append every row of a table; returns the row count
    ///
    /// A table without all identifier columns is rejected before any
    /// identifier is assigned. Columns are matched by name against the
    /// first table's header; cells with no matching column are empty.
    pub fn add_table(&mut self, table: &Table) -> Result<usize, NormalizeError> {
        for name in ID_COLUMNS {
            if table.column(name).is_none() {
                return Err(NormalizeError::MissingColumn(name));
            }
        }

        let header = self.header.get_or_insert_with(|| table.header.clone());
        let projection: Vec<Option<usize>> =
            header.iter().map(|name| table.column(name)).collect();
        let id_slots: Vec<Option<usize>> = header
            .iter()
            .map(|name| ID_COLUMNS.iter().position(|id| id == name))
            .collect();

        for row in &table.rows {
            let mut out = Vec::with_capacity(projection.len());
            for (source, slot) in projection.iter().zip(&id_slots) {
                let value = source.and_then(|i| row.get(i)).map_or("", String::as_str);
                match slot {
                    Some(map) => {
                        let id = self.maps[*map]
                            .get_or_assign(value)
                            .ok_or(NormalizeError::IdSpaceExhausted(ID_COLUMNS[*map]))?;
                        out.push(id.to_string());
                    }
                    None => out.push(value.to_string()),
                }
            }
            self.rows.push(out);
        }

        Ok(table.rows.len())
    }

    /// Write the header and all rows as CSV
    pub fn write<W: Write>(&self, output: W) -> Result<(), NormalizeError> {
        let mut writer = csv::Writer::from_writer(output);
        writer.write_record(self.header())?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Outcome of normalizing an intermediate directory
#[derive(Debug, Default)]
pub struct NormalizeReport {
    pub tables: usize,
    pub rows: usize,
    pub sentences: usize,
    pub clauses: usize,
    pub phrases: usize,
    /// Tables that could not be read or lacked identifier columns
    pub skipped: Vec<(PathBuf, NormalizeError)>,
}

/// Normalize every table in `dir` (sorted by file name) into `output`
///
/// Unreadable tables are reported and skipped. Only failing to write
/// `output` is an error.
pub fn normalize_dir(dir: &Path, output: &Path) -> Result<NormalizeReport, NormalizeError> {
    let paths = if dir.is_dir() {
        list_tables(dir)?
    } else {
        tracing::warn!("Intermediate directory {:?} does not exist", dir);
        Vec::new()
    };

    let mut normalizer = Normalizer::new();
    let mut report = NormalizeReport::default();

    for path in paths {
        tracing::info!("Processing {:?}...", path);
        let added = read_table(&path)
            .map_err(NormalizeError::from)
            .and_then(|table| normalizer.add_table(&table));
        match added {
            Ok(rows) => {
                report.tables += 1;
                report.rows += rows;
            }
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                report.skipped.push((path, e));
            }
        }
    }

    normalizer.write(File::create(output)?)?;

    report.sentences = normalizer.sentence_ids().len();
    report.clauses = normalizer.clause_ids().len();
    report.phrases = normalizer.phrase_ids().len();
    tracing::info!(
        "Wrote {} rows from {} tables to {:?} ({} sentences, {} clauses, {} phrases)",
        report.rows,
        report.tables,
        output,
        report.sentences,
        report.clauses,
        report.phrases
    );
    Ok(report)
}
