//! The inverted index: lexicon, posting store and document metadata.
//!
//! [`IndexBuilder`] is the only mutable form. [`Index`] is frozen and
//! shared read-only (typically behind an `Arc`) by every query.

pub mod builder;
pub mod lexicon;
pub mod metadata;
pub mod postings;

pub use builder::{BuildOptions, BuildReport, IndexBuilder, build_index, build_index_with};
pub use lexicon::{Lexicon, TermId};
pub use metadata::{DocDate, DocEntry, MetadataStore, Ordinal};
pub use postings::{PostingLists, PostingMatrix};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct Index {
    lexicon: Lexicon,
    postings: PostingMatrix,
    metadata: MetadataStore,
    lengths: Vec<u32>,
    average_length: f64,
}

/// Serializable form of an [`Index`], one field per persisted artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub lexicon: Lexicon,
    pub postings: PostingLists,
    pub metadata: MetadataStore,
}

impl Index {
    pub(crate) fn from_parts(lexicon: Lexicon, postings: PostingMatrix, metadata: MetadataStore) -> Self {
        let average_length = metadata.average_length();
        let lengths = metadata.lengths();
        Self {
            lexicon,
            postings,
            metadata,
            lengths,
            average_length,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn postings(&self) -> &PostingMatrix {
        &self.postings
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub fn document_count(&self) -> usize {
        self.metadata.len()
    }

    /// Document lengths indexed by ordinal.
    pub fn document_lengths(&self) -> &[u32] {
        &self.lengths
    }

    /// Mean token length over all documents.
    pub fn average_length(&self) -> f64 {
        self.average_length
    }

    pub fn snapshot(&self) -> IndexSnapshot {
        IndexSnapshot {
            lexicon: self.lexicon.clone(),
            postings: self.postings.to_lists(),
            metadata: self.metadata.clone(),
        }
    }

    /// Rebuilds an index from its artifacts, rejecting any snapshot whose
    /// parts disagree with each other.
    pub fn from_snapshot(snapshot: IndexSnapshot) -> Result<Self> {
        let IndexSnapshot {
            lexicon,
            postings,
            metadata,
        } = snapshot;

        lexicon.validate()?;
        metadata.validate()?;
        if postings.len() != lexicon.len() {
            return Err(Error::malformed(format!(
                "{} posting lists for {} terms",
                postings.len(),
                lexicon.len()
            )));
        }
        if let Some(term) = postings.iter().position(|list| list.is_empty()) {
            return Err(Error::malformed(format!("term {term} has an empty posting list")));
        }

        let postings = PostingMatrix::from_lists(&postings, metadata.len())?;
        let totals = postings.tokens_per_document();
        for (ordinal, (&length, &total)) in metadata.lengths().iter().zip(&totals).enumerate() {
            if u64::from(length) != total {
                return Err(Error::malformed(format!(
                    "document {ordinal} records length {length} but its postings count {total} tokens"
                )));
            }
        }

        Ok(Self::from_parts(lexicon, postings, metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SourceDocument;
    use std::collections::BTreeMap;

    fn sample() -> Index {
        let mut builder = IndexBuilder::new();
        builder
            .add_document(&SourceDocument::new("LA010189-0001", "", "the cat sat. the dog ran."))
            .unwrap();
        builder
            .add_document(&SourceDocument::new("LA010189-0002", "", "birds fly high."))
            .unwrap();
        builder.finish()
    }

    #[test]
    fn test_frozen_index_statistics() {
        let index = sample();
        assert_eq!(index.document_count(), 2);
        assert!((index.average_length() - 4.5).abs() < 1e-12);
        assert_eq!(index.lexicon().len(), 8);
        assert_eq!(index.metadata().docnos(), ["LA010189-0001", "LA010189-0002"]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let index = sample();
        let snapshot = index.snapshot();
        let restored = Index::from_snapshot(snapshot.clone()).unwrap();
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.average_length(), index.average_length());
    }

    #[test]
    fn test_rejects_posting_table_size_mismatch() {
        let mut snapshot = sample().snapshot();
        snapshot.postings.pop();
        assert!(matches!(Index::from_snapshot(snapshot), Err(Error::MalformedIndex(_))));
    }

    #[test]
    fn test_rejects_out_of_range_ordinal() {
        let mut snapshot = sample().snapshot();
        snapshot.postings[0].insert(7, 1);
        assert!(matches!(Index::from_snapshot(snapshot), Err(Error::MalformedIndex(_))));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let mut snapshot = sample().snapshot();
        *snapshot.postings[0].get_mut(&0).unwrap() += 1;
        assert!(matches!(Index::from_snapshot(snapshot), Err(Error::MalformedIndex(_))));
    }

    #[test]
    fn test_rejects_empty_posting_list() {
        let mut snapshot = sample().snapshot();
        snapshot.postings[1] = BTreeMap::new();
        assert!(Index::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn test_empty_index() {
        let index = IndexBuilder::new().finish();
        assert_eq!(index.document_count(), 0);
        assert_eq!(index.average_length(), 0.0);
        let restored = Index::from_snapshot(index.snapshot()).unwrap();
        assert!(restored.lexicon().is_empty());
    }
}
