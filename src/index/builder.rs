//! Index construction.
//!
//! Term ids depend on first-seen order, so documents are committed strictly
//! in input order through `IndexBuilder::commit`, the only place that
//! touches the lexicon, the posting accumulator and the metadata store.
//! Tokenization has no shared state and runs in parallel per batch.

use crate::config::INDEX_BATCH_SIZE;
use crate::document::SourceDocument;
use crate::error::{Error, Result};
use crate::index::Index;
use crate::index::lexicon::Lexicon;
use crate::index::metadata::{DocDate, DocEntry, MetadataStore, Ordinal};
use crate::index::postings::PostingAccumulator;
use crate::preprocessing::tokenize;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Abort on the first document that cannot be indexed instead of
    /// skipping it.
    pub strict: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub indexed: usize,
    /// (document number, reason) for every document left out.
    pub skipped: Vec<(String, String)>,
}

impl BuildReport {
    fn reject(&mut self, err: Error, options: &BuildOptions) -> Result<()> {
        if options.strict {
            return Err(err);
        }
        let docno = match &err {
            Error::Parse { docno, .. } => docno.clone(),
            Error::DuplicateDocument(docno) => docno.clone(),
            _ => String::new(),
        };
        warn!(docno = %docno, error = %err, "skipping document");
        self.skipped.push((docno, err.to_string()));
        Ok(())
    }
}

/// Mutable side of an index. Call [`IndexBuilder::finish`] to freeze it.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    lexicon: Lexicon,
    postings: PostingAccumulator,
    metadata: MetadataStore,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes one document and returns its ordinal.
    ///
    /// On error nothing has been recorded for the document.
    pub fn add_document(&mut self, doc: &SourceDocument) -> Result<Ordinal> {
        let tokens = tokenize(&doc.indexable_text());
        self.commit(doc, tokens)
    }

    /// Indexes a batch: tokenizes every document in parallel, then commits
    /// them one by one in slice order. Outcomes line up with `docs`.
    pub fn add_batch(&mut self, docs: &[SourceDocument]) -> Vec<Result<Ordinal>> {
        let tokenized: Vec<Vec<String>> = docs
            .par_iter()
            .map(|doc| tokenize(&doc.indexable_text()))
            .collect();

        docs.iter()
            .zip(tokenized)
            .map(|(doc, tokens)| self.commit(doc, tokens))
            .collect()
    }

    fn commit(&mut self, doc: &SourceDocument, tokens: Vec<String>) -> Result<Ordinal> {
        // Everything fallible happens before the first mutation.
        if self.metadata.contains(&doc.docno) {
            return Err(Error::DuplicateDocument(doc.docno.clone()));
        }
        let date = DocDate::from_docno(&doc.docno)?;
        let length = u32::try_from(tokens.len())
            .map_err(|_| Error::parse(&doc.docno, "document has too many tokens"))?;

        let ordinal = self.metadata.next_ordinal();
        for token in &tokens {
            let term = self.lexicon.intern(token);
            self.postings.record(term, ordinal);
        }
        self.metadata.push(
            doc.docno.clone(),
            DocEntry {
                ordinal,
                length,
                date,
                headline: doc.headline.clone(),
            },
        );
        Ok(ordinal)
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn finish(self) -> Index {
        debug_assert_eq!(self.lexicon.len(), self.postings.term_count());
        let postings = self.postings.freeze(self.metadata.len());
        Index::from_parts(self.lexicon, postings, self.metadata)
    }
}

/// Builds an index from a document source.
///
/// Per-document failures are skipped and reported unless
/// `options.strict` is set; any other error from the source aborts.
pub fn build_index<I>(source: I, options: &BuildOptions) -> Result<(Index, BuildReport)>
where
    I: IntoIterator<Item = Result<SourceDocument>>,
{
    build_index_with(source, options, |_| Ok(()))
}

/// Like [`build_index`], handing each batch of successfully indexed
/// documents to `on_commit` (e.g. to store their raw text).
pub fn build_index_with<I, F>(
    source: I,
    options: &BuildOptions,
    mut on_commit: F,
) -> Result<(Index, BuildReport)>
where
    I: IntoIterator<Item = Result<SourceDocument>>,
    F: FnMut(&[&SourceDocument]) -> Result<()>,
{
    let start = Instant::now();
    let mut builder = IndexBuilder::new();
    let mut report = BuildReport::default();
    let mut batch = Vec::with_capacity(INDEX_BATCH_SIZE);

    for item in source {
        match item {
            Ok(doc) => {
                batch.push(doc);
                if batch.len() >= INDEX_BATCH_SIZE {
                    flush(&mut builder, &mut batch, options, &mut report, &mut on_commit)?;
                    info!(
                        documents = builder.len(),
                        terms = builder.lexicon().len(),
                        elapsed = ?start.elapsed(),
                        "indexing"
                    );
                }
            }
            Err(err) if err.is_per_document() => report.reject(err, options)?,
            Err(err) => return Err(err),
        }
    }
    flush(&mut builder, &mut batch, options, &mut report, &mut on_commit)?;

    let index = builder.finish();
    info!(
        documents = index.document_count(),
        terms = index.lexicon().len(),
        skipped = report.skipped.len(),
        elapsed = ?start.elapsed(),
        "index built"
    );
    Ok((index, report))
}

fn flush<F>(
    builder: &mut IndexBuilder,
    batch: &mut Vec<SourceDocument>,
    options: &BuildOptions,
    report: &mut BuildReport,
    on_commit: &mut F,
) -> Result<()>
where
    F: FnMut(&[&SourceDocument]) -> Result<()>,
{
    if batch.is_empty() {
        return Ok(());
    }
    let outcomes = builder.add_batch(batch.as_slice());
    let mut committed = Vec::with_capacity(batch.len());
    for (doc, outcome) in batch.iter().zip(outcomes) {
        match outcome {
            Ok(_) => committed.push(doc),
            Err(err) => report.reject(err, options)?,
        }
    }
    report.indexed += committed.len();
    on_commit(&committed)?;
    batch.clear();
    Ok(())
}
