//! Document records as they come out of the corpus, and where their raw
//! text lives after indexing.

pub mod parser;
pub mod store;

pub use parser::{CorpusReader, open_corpus};
pub use store::{DocumentFetcher, DocumentStore, MemoryDocuments};

/// One corpus document with its markup already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Natural key, e.g. `LA010189-0001`.
    pub docno: String,
    pub headline: String,
    /// Article text followed by table cells and graphic captions.
    pub body: String,
    /// The record exactly as it appeared in the corpus.
    pub raw: String,
}

impl SourceDocument {
    pub fn new(docno: impl Into<String>, headline: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            docno: docno.into(),
            headline: headline.into(),
            body: body.into(),
            raw: String::new(),
        }
    }

    /// Text the index is built from: headline, then body.
    pub fn indexable_text(&self) -> String {
        format!("{}\n{}", self.headline, self.body)
    }
}
