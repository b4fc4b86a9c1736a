//! Query-biased extractive summaries.
//!
//! Every sentence of a document is scored against the query as
//! `l + c + d + k`:
//!
//! - `l`: position weight, 2 for the first sentence, 1 for the second;
//! - `c`: sentence tokens equal to some query token, repeats included;
//! - `d`: distinct query tokens present in the sentence;
//! - `k`: longest run of consecutive sentence tokens that also appears,
//!   in the same order, as consecutive query tokens.

use crate::preprocessing::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSentence {
    pub text: String,
    pub score: f64,
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '?' | '!')
}

/// Splits text at runs of `.`, `?` and `!`, keeping each run with the
/// sentence it closes. A trailing unterminated fragment is a sentence of
/// its own. Fragments that are blank or bare punctuation are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !is_terminal(c) {
            continue;
        }
        while let Some(&(_, next)) = chars.peek() {
            if !is_terminal(next) {
                break;
            }
            chars.next();
        }
        let end = chars.peek().map_or(text.len(), |&(i, _)| i);
        push_sentence(&mut sentences, &text[start..end]);
        start = end;
    }
    push_sentence(&mut sentences, &text[start..]);

    sentences
}

fn push_sentence<'a>(sentences: &mut Vec<&'a str>, fragment: &'a str) {
    let fragment = fragment.trim();
    if fragment.chars().any(|c| !is_terminal(c)) {
        sentences.push(fragment);
    }
}

/// Tokenizes `query` and ranks the sentences of `text` against it.
pub fn summarize(query: &str, text: &str) -> Vec<ScoredSentence> {
    summarize_tokens(&tokenize(query), text)
}

/// Ranks the sentences of `text` by descending score; equal scores keep
/// document order.
pub fn summarize_tokens(query: &[String], text: &str) -> Vec<ScoredSentence> {
    let query_set: HashSet<&str> = query.iter().map(String::as_str).collect();

    let mut scored: Vec<ScoredSentence> = split_sentences(text)
        .into_iter()
        .enumerate()
        .map(|(position, sentence)| {
            let words = tokenize(sentence);
            let l = 2usize.saturating_sub(position);
            let c = words.iter().filter(|w| query_set.contains(w.as_str())).count();
            let d = distinct_matches(&query_set, &words);
            let k = longest_common_run(query, &words);
            ScoredSentence {
                text: sentence.to_string(),
                score: (l + c + d + k) as f64,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

fn distinct_matches(query_set: &HashSet<&str>, words: &[String]) -> usize {
    let present: HashSet<&str> = words.iter().map(String::as_str).collect();
    query_set.intersection(&present).count()
}

/// Length of the longest contiguous token run shared by `query` and
/// `words`, in the same order.
fn longest_common_run(query: &[String], words: &[String]) -> usize {
    // run[j] = length of the common run ending at query[i] and words[j].
    let mut run = vec![0usize; words.len() + 1];
    let mut best = 0;
    for q in query {
        let mut diagonal = 0;
        for (j, w) in words.iter().enumerate() {
            let above = run[j + 1];
            run[j + 1] = if q == w { diagonal + 1 } else { 0 };
            best = best.max(run[j + 1]);
            diagonal = above;
        }
    }
    best
}
