//! Posting store.
//!
//! While an index is being built each term owns a small hash map from
//! document ordinal to raw term frequency. Freezing turns those maps into a
//! term x document sparse matrix (CSR, one row per term), which the scorer
//! walks row by row.

use crate::error::{Error, Result};
use crate::index::lexicon::TermId;
use crate::index::metadata::Ordinal;
use sprs::{CsMat, CsVecView, TriMat};
use std::collections::{BTreeMap, HashMap};

/// One posting list per term id, in serialized form.
pub type PostingLists = Vec<BTreeMap<Ordinal, u32>>;

/// Mutable per-term posting lists, filled by the index builder.
#[derive(Debug, Default)]
pub(crate) struct PostingAccumulator {
    lists: Vec<HashMap<Ordinal, u32>>,
}

impl PostingAccumulator {
    /// Counts one occurrence of `term` in document `ordinal`.
    ///
    /// Term ids arrive densely from the lexicon, so a new id is always
    /// exactly one past the last list.
    pub(crate) fn record(&mut self, term: TermId, ordinal: Ordinal) {
        let term = term as usize;
        if term == self.lists.len() {
            self.lists.push(HashMap::new());
        }
        *self.lists[term].entry(ordinal).or_insert(0) += 1;
    }

    pub(crate) fn document_frequency(&self, term: TermId) -> usize {
        self.lists.get(term as usize).map_or(0, HashMap::len)
    }

    pub(crate) fn term_count(&self) -> usize {
        self.lists.len()
    }

    pub(crate) fn freeze(self, num_docs: usize) -> PostingMatrix {
        let mut tri = TriMat::new((self.lists.len(), num_docs));
        for (term, list) in self.lists.iter().enumerate() {
            for (&ordinal, &count) in list {
                tri.add_triplet(term, ordinal as usize, count);
            }
        }
        PostingMatrix {
            matrix: tri.to_csr(),
        }
    }
}

/// Frozen posting store: entry (t, d) is the frequency of term t in
/// document d. Absent entries mean zero occurrences.
#[derive(Debug, Clone)]
pub struct PostingMatrix {
    matrix: CsMat<u32>,
}

impl PostingMatrix {
    /// Builds the matrix from serialized posting lists, rejecting ordinals
    /// outside `0..num_docs` and zero counts.
    pub fn from_lists(lists: &PostingLists, num_docs: usize) -> Result<Self> {
        let mut tri = TriMat::new((lists.len(), num_docs));
        for (term, list) in lists.iter().enumerate() {
            for (&ordinal, &count) in list {
                if ordinal as usize >= num_docs {
                    return Err(Error::malformed(format!(
                        "term {term} posts to ordinal {ordinal} but only {num_docs} documents exist"
                    )));
                }
                if count == 0 {
                    return Err(Error::malformed(format!(
                        "term {term} has a zero count posting for ordinal {ordinal}"
                    )));
                }
                tri.add_triplet(term, ordinal as usize, count);
            }
        }
        Ok(Self {
            matrix: tri.to_csr(),
        })
    }

    pub fn to_lists(&self) -> PostingLists {
        self.matrix
            .outer_iterator()
            .map(|row| {
                row.iter()
                    .map(|(ordinal, &count)| (ordinal as Ordinal, count))
                    .collect()
            })
            .collect()
    }

    /// Posting list of `term` as a sparse row over document ordinals.
    pub fn row(&self, term: TermId) -> Option<CsVecView<'_, u32>> {
        self.matrix.outer_view(term as usize)
    }

    /// Number of documents containing `term`.
    pub fn document_frequency(&self, term: TermId) -> usize {
        self.row(term).map_or(0, |row| row.nnz())
    }

    /// Frequency of `term` in document `ordinal`, 0 when absent.
    pub fn frequency(&self, term: TermId, ordinal: Ordinal) -> u32 {
        self.row(term)
            .and_then(|row| row.get(ordinal as usize).copied())
            .unwrap_or(0)
    }

    pub fn term_count(&self) -> usize {
        self.matrix.rows()
    }

    pub fn document_count(&self) -> usize {
        self.matrix.cols()
    }

    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// Sum of term frequencies per document, i.e. the token count each
    /// document contributed to the index.
    pub(crate) fn tokens_per_document(&self) -> Vec<u64> {
        let mut totals = vec![0u64; self.matrix.cols()];
        for row in self.matrix.outer_iterator() {
            for (ordinal, &count) in row.iter() {
                totals[ordinal] += u64::from(count);
            }
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accumulate(docs: &[&[TermId]]) -> PostingAccumulator {
        let mut acc = PostingAccumulator::default();
        for (ordinal, terms) in docs.iter().enumerate() {
            for &term in terms.iter() {
                acc.record(term, ordinal as Ordinal);
            }
        }
        acc
    }

    #[test]
    fn test_record_counts_repeats() {
        let acc = accumulate(&[&[0, 1, 2, 0, 3, 4]]);
        assert_eq!(acc.term_count(), 5);
        assert_eq!(acc.document_frequency(0), 1);

        let matrix = acc.freeze(1);
        assert_eq!(matrix.frequency(0, 0), 2);
        assert_eq!(matrix.frequency(1, 0), 1);
    }

    #[test]
    fn test_document_frequency_counts_distinct_documents() {
        let matrix = accumulate(&[&[0, 1, 0], &[1, 2], &[1]]).freeze(3);
        assert_eq!(matrix.document_frequency(0), 1);
        assert_eq!(matrix.document_frequency(1), 3);
        assert_eq!(matrix.document_frequency(2), 1);
        assert_eq!(matrix.document_frequency(99), 0);
        assert_eq!(matrix.frequency(2, 0), 0);
    }

    #[test]
    fn test_row_iterates_postings() {
        let matrix = accumulate(&[&[0, 0, 0], &[1], &[0]]).freeze(3);
        let row = matrix.row(0).expect("term 0 exists");
        let postings: Vec<(usize, u32)> = row.iter().map(|(d, &f)| (d, f)).collect();
        assert_eq!(postings, vec![(0, 3), (2, 1)]);
    }

    #[test]
    fn test_lists_round_trip() {
        let matrix = accumulate(&[&[0, 1, 0], &[1, 2], &[]]).freeze(3);
        let lists = matrix.to_lists();
        assert_eq!(lists.len(), 3);
        assert_eq!(lists[0], BTreeMap::from([(0, 2)]));

        let restored = PostingMatrix::from_lists(&lists, 3).unwrap();
        assert_eq!(restored.to_lists(), lists);
        assert_eq!(restored.tokens_per_document(), vec![3, 2, 0]);
    }

    #[test]
    fn test_from_lists_rejects_out_of_range_ordinal() {
        let lists = vec![BTreeMap::from([(5, 1)])];
        assert!(matches!(
            PostingMatrix::from_lists(&lists, 2),
            Err(Error::MalformedIndex(_))
        ));
    }

    #[test]
    fn test_from_lists_rejects_zero_count() {
        let lists = vec![BTreeMap::from([(0, 0)])];
        assert!(PostingMatrix::from_lists(&lists, 1).is_err());
    }
}
