//! Tuning constants and defaults.
//!
//! Runtime overrides come from the command line (`main.rs`) or, for the
//! HTTP service, from its own arguments and environment.

/// BM25 term-frequency saturation.
pub const BM25_K1: f64 = 1.2;

/// BM25 document-length normalization strength. 0.0 disables it.
pub const BM25_B: f64 = 0.75;

/// BM25 query-term-frequency saturation.
pub const BM25_K2: f64 = 7.0;

/// Number of ranked documents displayed per query.
pub const RESULTS_SHOWN: usize = 10;

/// Number of summary sentences shown under each result.
pub const SUMMARY_SENTENCES: usize = 2;

/// Characters of body text used when a document has no headline.
pub const HEADLINE_FALLBACK_CHARS: usize = 50;

pub const LEXICON_FILE: &str = "lexicon.bin";
pub const POSTINGS_FILE: &str = "postings.bin";
pub const METADATA_FILE: &str = "metadata.bin";
pub const DOCUMENTS_DB_FILE: &str = "documents.db";

/// Documents tokenized together by one parallel batch during indexing.
pub const INDEX_BATCH_SIZE: usize = 512;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
