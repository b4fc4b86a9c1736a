//! BM25 ranking over a frozen [`Index`].
//!
//! For each distinct query term t with query frequency qf and document
//! frequency n, every document d holding t with frequency f accrues
//!
//! ```text
//! (k1+1)f / (K+f) * (k2+1)qf / (k2+qf) * ln((N - n + 0.5) / (n + 0.5))
//! K = k1 * ((1 - b) + b * dl / avdl)
//! ```
//!
//! The idf factor goes negative for terms in more than half the corpus and
//! is applied as is.

use crate::config::{BM25_B, BM25_K1, BM25_K2};
use crate::error::{Error, Result};
use crate::index::{Index, Ordinal, TermId};
use crate::preprocessing::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
    pub k2: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: BM25_K1,
            b: BM25_B,
            k2: BM25_K2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub docno: String,
    pub ordinal: Ordinal,
    pub score: f64,
}

/// Tokenizes `query` and ranks the index against it.
pub fn score(query: &str, index: &Index, params: &Bm25Params) -> Vec<ScoredDocument> {
    score_tokens(&tokenize(query), index, params)
}

/// Ranks documents by descending BM25 score, ties by ascending ordinal.
///
/// Tokens missing from the lexicon are ignored. Documents matching no
/// query term are absent from the result, which is empty when no token
/// resolves.
pub fn score_tokens(tokens: &[String], index: &Index, params: &Bm25Params) -> Vec<ScoredDocument> {
    let query_terms = query_frequencies(tokens, index);
    if query_terms.is_empty() {
        debug!(tokens = tokens.len(), "query resolved to no known terms");
        return Vec::new();
    }

    let n = index.document_count() as f64;
    let avdl = index.average_length();
    let lengths = index.document_lengths();
    let mut scores: HashMap<Ordinal, f64> = HashMap::new();

    for &(term, qf) in &query_terms {
        let Some(row) = index.postings().row(term) else {
            continue;
        };
        let df = row.nnz() as f64;
        for (ordinal, &f) in row.iter() {
            let dl = f64::from(lengths[ordinal]);
            let partial = partial_score(params, f64::from(f), f64::from(qf), dl, avdl, n, df);
            *scores.entry(ordinal as Ordinal).or_insert(0.0) += partial;
        }
    }

    let mut ranked: Vec<(Ordinal, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    debug!(
        terms = query_terms.len(),
        matched = ranked.len(),
        "scored query"
    );

    let docnos = index.metadata().docnos();
    ranked
        .into_iter()
        .map(|(ordinal, score)| ScoredDocument {
            docno: docnos[ordinal as usize].clone(),
            ordinal,
            score,
        })
        .collect()
}

/// Distinct resolved terms in first-seen order with their raw counts in
/// the full token sequence.
fn query_frequencies(tokens: &[String], index: &Index) -> Vec<(TermId, u32)> {
    let mut terms: Vec<(TermId, u32)> = Vec::new();
    for term in tokens.iter().filter_map(|t| index.lexicon().lookup(t)) {
        match terms.iter_mut().find(|(t, _)| *t == term) {
            Some((_, qf)) => *qf += 1,
            None => terms.push((term, 1)),
        }
    }
    terms
}

/// Contribution of one query term to one document.
pub fn partial_score(params: &Bm25Params, f: f64, qf: f64, dl: f64, avdl: f64, n: f64, df: f64) -> f64 {
    let Bm25Params { k1, b, k2 } = *params;
    let k = k1 * ((1.0 - b) + b * dl / avdl);
    let idf = ((n - df + 0.5) / (df + 0.5)).ln();
    (k1 + 1.0) * f / (k + f) * (k2 + 1.0) * qf / (k2 + qf) * idf
}

/// Picks the result shown at 1-based display `rank`.
pub fn result_at_rank(results: &[ScoredDocument], rank: usize) -> Result<&ScoredDocument> {
    rank.checked_sub(1)
        .and_then(|i| results.get(i))
        .ok_or(Error::RankOutOfRange {
            rank,
            len: results.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SourceDocument;
    use crate::index::IndexBuilder;
    use proptest::prelude::*;

    fn build(bodies: &[&str]) -> Index {
        let mut builder = IndexBuilder::new();
        for (i, body) in bodies.iter().enumerate() {
            builder
                .add_document(&SourceDocument::new(format!("LA010189-{i:04}"), "", *body))
                .unwrap();
        }
        builder.finish()
    }

    fn corpus() -> Index {
        build(&[
            "rust programming systems language fast",
            "python programming scripting easy",
            "java enterprise programming verbose",
            "rust memory safety zero cost abstractions",
            "gardening tips for spring",
        ])
    }

    #[test]
    fn test_two_document_scenario() {
        let index = build(&["the cat sat. the dog ran.", "birds fly high."]);
        let results = score("cat dog", &index, &Bm25Params::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].docno, "LA010189-0000");
        assert!(results[0].score > 0.0);
    }

    #[test]
    fn test_scenario_matches_formula() {
        let index = build(&["the cat sat. the dog ran.", "birds fly high."]);
        let params = Bm25Params::default();
        let results = score("cat dog", &index, &params);

        // N = 2, avdl = 4.5, dl = 6, f = qf = n = 1 for both terms.
        let expected = 2.0 * partial_score(&params, 1.0, 1.0, 6.0, 4.5, 2.0, 1.0);
        assert!((results[0].score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_terms_are_dropped() {
        let index = corpus();
        assert!(score("nonexistent_xyz_term", &index, &Bm25Params::default()).is_empty());
        assert!(score("", &index, &Bm25Params::default()).is_empty());
        assert_eq!(
            score("rust zzz", &index, &Bm25Params::default()),
            score("rust", &index, &Bm25Params::default())
        );
    }

    #[test]
    fn test_only_matching_documents_returned() {
        let index = corpus();
        let results = score("rust", &index, &Bm25Params::default());
        let ordinals: Vec<Ordinal> = results.iter().map(|r| r.ordinal).collect();
        assert_eq!(ordinals.len(), 2);
        assert!(ordinals.contains(&0));
        assert!(ordinals.contains(&3));
    }

    #[test]
    fn test_ranking_prefers_higher_term_frequency() {
        let index = build(&[
            "rust rust rust",
            "rust programming",
            "other words",
            "more words",
            "alpha beta",
            "gamma delta",
        ]);
        let results = score("rust", &index, &Bm25Params::default());
        assert_eq!(results[0].ordinal, 0);
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn test_ties_break_by_ordinal() {
        let index = build(&["gamma delta", "alpha beta", "alpha beta", "epsilon zeta"]);
        let results = score("alpha", &index, &Bm25Params::default());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].score, results[1].score);
        assert_eq!(results[0].ordinal, 1);
        assert_eq!(results[1].ordinal, 2);
    }

    #[test]
    fn test_common_terms_score_negative() {
        let index = build(&["common alpha", "common beta", "common gamma"]);
        let results = score("common", &index, &Bm25Params::default());
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.score < 0.0));
    }

    #[test]
    fn test_repeated_query_terms_raise_score() {
        let index = corpus();
        let once = score("rust", &index, &Bm25Params::default());
        let twice = score("rust rust", &index, &Bm25Params::default());
        assert!(twice[0].score > once[0].score);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let index = corpus();
        let params = Bm25Params::default();
        assert_eq!(
            score("rust programming memory", &index, &params),
            score("rust programming memory", &index, &params)
        );
    }

    #[test]
    fn test_empty_index() {
        let index = IndexBuilder::new().finish();
        assert!(score("anything", &index, &Bm25Params::default()).is_empty());
    }

    #[test]
    fn test_result_at_rank_is_one_based() {
        let index = corpus();
        let results = score("programming", &index, &Bm25Params::default());
        assert_eq!(result_at_rank(&results, 1).unwrap(), &results[0]);
        assert_eq!(result_at_rank(&results, 3).unwrap(), &results[2]);
        assert!(matches!(
            result_at_rank(&results, 4),
            Err(Error::RankOutOfRange { rank: 4, len: 3 })
        ));
        assert!(result_at_rank(&results, 0).is_err());
    }

    proptest! {
        #[test]
        fn prop_monotonic_in_term_frequency(
            f in 1u32..200,
            qf in 1u32..5,
            dl in 1u32..500,
            avdl in 1.0f64..300.0,
            df in 1u32..50,
            extra in 1u32..100,
        ) {
            let params = Bm25Params::default();
            let n = f64::from(2 * df + extra);
            let (dl, df) = (f64::from(dl), f64::from(df));
            let lower = partial_score(&params, f64::from(f), f64::from(qf), dl, avdl, n, df);
            let higher = partial_score(&params, f64::from(f + 1), f64::from(qf), dl, avdl, n, df);
            prop_assert!(higher >= lower);
            prop_assert!(higher <= (params.k1 + 1.0) * (params.k2 + 1.0) * ((n - df + 0.5) / (df + 0.5)).ln());
        }
    }
}
