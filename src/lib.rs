//! BM25 retrieval over newswire collections such as the LA Times TREC
//! corpus, with query-biased summaries of every hit.

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod preprocessing;
pub mod repl;
pub mod util;

pub use document::{DocumentFetcher, DocumentStore, MemoryDocuments, SourceDocument};
pub use engine::{Bm25Params, Hit, ScoredDocument, ScoredSentence, score, summarize};
pub use error::{Error, Result};
pub use index::{BuildOptions, BuildReport, Index, IndexBuilder, build_index};
pub use preprocessing::tokenize;
pub use util::{build_index_dir, load_index, save_index};
