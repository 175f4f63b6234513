//! Flat word records
//!
//! A [`Word`] is one row of a per-document table: a leaf of the syntax
//! tree together with the sentence, clause and phrase it was found in.

/// Semantic columns of a per-document table, in output order
pub const COLUMNS: [&str; 10] = [
    "sentence_id",
    "clause_id",
    "phrase_id",
    "word_id",
    "ref",
    "text",
    "lemma",
    "gloss",
    "strong",
    "morph",
];

/// Header used for the corpus table when no per-document tables exist
pub const FALLBACK_HEADER: [&str; 9] = [
    "sentence_id",
    "clause_id",
    "phrase_id",
    "word_id",
    "ref",
    "text",
    "lemma",
    "strong",
    "morph",
];

/// Morphological tag of clause-linking conjunctions
pub const CONJUNCTION_TAG: &str = "CONJ";

/// One leaf word with its syntactic context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Word {
    pub sentence_id: Option<String>,
    pub clause_id: Option<String>,
    pub phrase_id: Option<String>,
    pub word_id: Option<String>,
    /// Canonical reference, e.g. `MAT 1:1!1`
    pub reference: Option<String>,
    pub text: String,
    pub lemma: Option<String>,
    pub gloss: Option<String>,
    pub strong: Option<String>,
    pub morph: Option<String>,
}

impl Word {
    pub fn is_conjunction(&self) -> bool {
        self.morph.as_deref() == Some(CONJUNCTION_TAG)
    }

    /// Field values in [`COLUMNS`] order, unset fields as empty strings
    pub fn fields(&self) -> [&str; 10] {
        fn opt(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("")
        }

        [
            opt(&self.sentence_id),
            opt(&self.clause_id),
            opt(&self.phrase_id),
            opt(&self.word_id),
            opt(&self.reference),
            &self.text,
            opt(&self.lemma),
            opt(&self.gloss),
            opt(&self.strong),
            opt(&self.morph),
        ]
    }
}
