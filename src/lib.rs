//! Grass: Macula Greek syntax trees, flattened
//!
//! Turns the Macula Greek New Testament treebank into one row per word,
//! tagged with the sentence, clause and phrase it belongs to, with clause
//! identifiers made consistent across the whole corpus.

// Core modules (pipeline order)
pub mod config; // Directories and file naming
pub mod corpus; // Input and intermediate file discovery
pub mod correct; // Conjunction clause correction
pub mod flatten; // Tree to word rows
pub mod macula; // Macula XML reader
pub mod natural; // Natural ordering of references
pub mod normalize; // Corpus-wide identifier normalization
pub mod pipeline; // Per-document pipeline and corpus driver
pub mod table; // Per-document CSV tables
pub mod tree; // Syntax tree data structures
pub mod word; // Flat word records

// Re-exports for convenience
pub use config::Config;
pub use corpus::Corpus;
pub use correct::correct_clauses;
pub use flatten::{flatten_document, flatten_sentence};
pub use macula::{MaculaReader, ParseError, parse_document, read_document};
pub use natural::{natural_cmp, sort_by_reference};
pub use normalize::{IdMap, NormalizeError, NormalizeReport, Normalizer, normalize_dir};
pub use pipeline::{CorpusReport, PipelineError, flatten_corrected, process_corpus, process_document, run};
pub use tree::{Document, Node, NodeId, Sentence, Tree};
pub use word::Word;
