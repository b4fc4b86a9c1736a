//! Error type shared by the indexer, the scorer and the collaborators
//! around them (corpus reader, document store, index persistence).

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A single document's attributes could not be derived.
    #[error("cannot parse document {docno:?}: {reason}")]
    Parse { docno: String, reason: String },

    #[error("document {0:?} is already indexed")]
    DuplicateDocument(String),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("ordinal {ordinal} out of range (index holds {len} documents)")]
    OrdinalOutOfRange { ordinal: usize, len: usize },

    #[error("no result at rank {rank} ({len} results)")]
    RankOutOfRange { rank: usize, len: usize },

    #[error("malformed index: {0}")]
    MalformedIndex(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("document store error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl Error {
    pub(crate) fn parse(docno: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Parse {
            docno: docno.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedIndex(reason.into())
    }

    /// True for failures scoped to one document, which a lenient build skips.
    pub fn is_per_document(&self) -> bool {
        matches!(self, Error::Parse { .. } | Error::DuplicateDocument(_))
    }

    /// True for lookups of documents or ranks the index does not know.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::DocumentNotFound(_)
                | Error::OrdinalOutOfRange { .. }
                | Error::RankOutOfRange { .. }
        )
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
