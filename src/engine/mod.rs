pub mod hits;
pub mod search;
pub mod summary;

pub use hits::{Hit, collect_hits, render_hits};
pub use search::{Bm25Params, ScoredDocument, result_at_rank, score, score_tokens};
pub use summary::{ScoredSentence, split_sentences, summarize, summarize_tokens};
