//! Interactive retrieval loop.
//!
//! Reads a query, prints the top results with their summaries, then takes
//! selections until the user asks for a new query or quits.

use crate::config::RESULTS_SHOWN;
use crate::document::DocumentFetcher;
use crate::engine::{Bm25Params, ScoredDocument, collect_hits, render_hits, result_at_rank, score_tokens};
use crate::error::Result;
use crate::index::Index;
use crate::preprocessing::tokenize;
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::{debug, warn};

const HELP: &str = "Q:\tquit\nN:\tenter new query\nR:\tshow results list\n1-10:\tshow full document\n";

pub struct Repl<'a, D: ?Sized> {
    index: &'a Index,
    documents: &'a D,
    params: Bm25Params,
}

enum Next {
    Query,
    Quit,
}

impl<'a, D: DocumentFetcher + ?Sized> Repl<'a, D> {
    pub fn new(index: &'a Index, documents: &'a D, params: Bm25Params) -> Self {
        Self {
            index,
            documents,
            params,
        }
    }

    /// Runs until the user quits or `input` reaches end of file.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut out: W) -> Result<()> {
        loop {
            write!(out, "\nquery: ")?;
            out.flush()?;
            let Some(query) = read_line(&mut input)? else {
                return Ok(());
            };

            let start = Instant::now();
            let tokens = tokenize(&query);
            let mut results = score_tokens(&tokens, self.index, &self.params);
            results.truncate(RESULTS_SHOWN);
            let listing = match collect_hits(self.index, self.documents, &tokens, &results, RESULTS_SHOWN) {
                Ok(hits) => {
                    debug!(query = %query.trim(), hits = hits.len(), "query answered");
                    render_hits(&hits)
                }
                Err(err) if err.is_not_found() => {
                    warn!(query = %query.trim(), error = %err, "results listing incomplete");
                    format!("\n{err}\n\n")
                }
                Err(err) => return Err(err),
            };

            write!(out, "{listing}")?;
            write!(out, "Retrieval took {:?}\n\n", start.elapsed())?;

            match self.select(&mut input, &mut out, &results, &listing)? {
                Next::Query => continue,
                Next::Quit => return Ok(()),
            }
        }
    }

    fn select<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        out: &mut W,
        results: &[ScoredDocument],
        listing: &str,
    ) -> Result<Next> {
        loop {
            write!(out, "make a selection: ")?;
            out.flush()?;
            let Some(line) = read_line(input)? else {
                return Ok(Next::Quit);
            };

            match line.trim() {
                "" => continue,
                "q" | "Q" => {
                    writeln!(out, "quit")?;
                    return Ok(Next::Quit);
                }
                "n" | "N" => {
                    writeln!(out, "new query ...")?;
                    return Ok(Next::Query);
                }
                "r" | "R" => write!(out, "{listing}")?,
                other => match other.parse::<usize>() {
                    Ok(rank @ 1..=RESULTS_SHOWN) => self.show_document(out, results, rank)?,
                    _ => write!(out, "{HELP}")?,
                },
            }
        }
    }

    fn show_document<W: Write>(&self, out: &mut W, results: &[ScoredDocument], rank: usize) -> Result<()> {
        let raw = result_at_rank(results, rank).and_then(|hit| self.documents.raw(&hit.docno));
        match raw {
            Ok(raw) => writeln!(out, "\n{raw}")?,
            Err(err) if err.is_not_found() => writeln!(out, "{err}")?,
            Err(err) => return Err(err),
        }
        Ok(())
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
