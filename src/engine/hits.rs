//! Ranked results dressed for display: headline, date and the leading
//! summary sentences of each document.

use crate::config::{HEADLINE_FALLBACK_CHARS, SUMMARY_SENTENCES};
use crate::document::DocumentFetcher;
use crate::engine::search::ScoredDocument;
use crate::engine::summary::summarize_tokens;
use crate::error::Result;
use crate::index::{DocDate, Index};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    /// 1-based display rank.
    pub rank: usize,
    pub docno: String,
    pub score: f64,
    pub headline: String,
    pub date: DocDate,
    pub summary: Vec<String>,
}

/// Builds hits for the first `limit` results, summarizing each body
/// against the query tokens.
pub fn collect_hits<D>(
    index: &Index,
    documents: &D,
    query: &[String],
    results: &[ScoredDocument],
    limit: usize,
) -> Result<Vec<Hit>>
where
    D: DocumentFetcher + ?Sized,
{
    results
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, result)| {
            let entry = index.metadata().get(&result.docno)?;
            let body = documents.body(&result.docno)?;
            let headline = if entry.headline.is_empty() {
                fallback_headline(&body)
            } else {
                entry.headline.clone()
            };
            let summary = summarize_tokens(query, &body)
                .into_iter()
                .take(SUMMARY_SENTENCES)
                .map(|s| s.text)
                .collect();
            Ok(Hit {
                rank: i + 1,
                docno: result.docno.clone(),
                score: result.score,
                headline,
                date: entry.date.clone(),
                summary,
            })
        })
        .collect()
}

fn fallback_headline(body: &str) -> String {
    let mut headline: String = body.chars().take(HEADLINE_FALLBACK_CHARS).collect();
    headline.push_str("...");
    headline
}

/// Plain-text listing, one block per hit:
///
/// ```text
///  1. <headline> (<DD>/<MM>/<YY>)
/// <summary sentences> (<docno>)
/// ```
pub fn render_hits(hits: &[Hit]) -> String {
    let mut out = String::from("\n");
    for hit in hits {
        out.push_str(&format!(
            "{:2}. {} ({}/{}/{})\n",
            hit.rank, hit.headline, hit.date.day, hit.date.month, hit.date.year
        ));
        for sentence in &hit.summary {
            out.push_str(sentence);
            out.push(' ');
        }
        out.push_str(&format!("({})\n\n", hit.docno));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MemoryDocuments, SourceDocument};
    use crate::engine::search::{Bm25Params, score_tokens};
    use crate::index::IndexBuilder;
    use crate::preprocessing::tokenize;

    fn fixture() -> (Index, MemoryDocuments) {
        let docs = vec![
            SourceDocument::new("LA010189-0001", "Cat News", "Nothing here. The cat sat. The dog ran."),
            SourceDocument::new(
                "LA020389-0002",
                "",
                "A dog barked all night long and the neighbours complained loudly.",
            ),
            SourceDocument::new("LA010189-0003", "Birds", "Birds fly high."),
        ];
        let mut builder = IndexBuilder::new();
        for doc in &docs {
            builder.add_document(doc).unwrap();
        }
        (builder.finish(), docs.iter().collect())
    }

    #[test]
    fn test_hits_carry_metadata_and_summary() {
        let (index, documents) = fixture();
        let query = tokenize("cat");
        let results = score_tokens(&query, &index, &Bm25Params::default());
        let hits = collect_hits(&index, &documents, &query, &results, 10).unwrap();

        assert_eq!(hits.len(), 1);
        let hit = &hits[0];
        assert_eq!(hit.rank, 1);
        assert_eq!(hit.headline, "Cat News");
        assert_eq!(hit.date.full, "January 1, 1989");
        assert_eq!(hit.summary, vec!["The cat sat.", "Nothing here."]);
    }

    #[test]
    fn test_missing_headline_falls_back_to_body() {
        let (index, documents) = fixture();
        let query = tokenize("dog");
        let results = score_tokens(&query, &index, &Bm25Params::default());
        let hits = collect_hits(&index, &documents, &query, &results, 10).unwrap();

        let hit = hits.iter().find(|h| h.docno == "LA020389-0002").unwrap();
        assert_eq!(
            hit.headline,
            "A dog barked all night long and the neighbours com..."
        );
        assert_eq!((hit.date.day.as_str(), hit.date.month.as_str()), ("03", "02"));
    }

    #[test]
    fn test_limit_and_missing_body() {
        let (index, _) = fixture();
        let query = tokenize("dog");
        let results = score_tokens(&query, &index, &Bm25Params::default());
        assert!(collect_hits(&index, &MemoryDocuments::new(), &query, &results, 0)
            .unwrap()
            .is_empty());
        assert!(collect_hits(&index, &MemoryDocuments::new(), &query, &results, 10)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_render_layout() {
        let hit = Hit {
            rank: 1,
            docno: "LA010189-0001".into(),
            score: 1.5,
            headline: "Cat News".into(),
            date: DocDate::from_docno("LA010189-0001").unwrap(),
            summary: vec!["The cat sat.".into(), "Nothing here.".into()],
        };
        assert_eq!(
            render_hits(&[hit]),
            "\n 1. Cat News (01/01/89)\nThe cat sat. Nothing here. (LA010189-0001)\n\n"
        );
    }
}
