//! Term dictionary: token string <-> dense term id.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Dense term identifier, assigned in first-seen order from 0.
pub type TermId = u32;

/// Bidirectional token/id mapping.
///
/// Ids are only ever allocated by [`Lexicon::intern`], which the index
/// builder owns exclusively; a frozen [`crate::Index`] exposes the lexicon
/// through `&Lexicon` only, so query-time code can `lookup` but not grow it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    words: Vec<String>,
    word_to_id: HashMap<String, TermId>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `token`, allocating the next one if it is new.
    pub fn intern(&mut self, token: &str) -> TermId {
        if let Some(&id) = self.word_to_id.get(token) {
            return id;
        }
        let id = self.words.len() as TermId;
        self.words.push(token.to_string());
        self.word_to_id.insert(token.to_string(), id);
        id
    }

    /// Read-only lookup; unseen tokens are never inserted.
    pub fn lookup(&self, token: &str) -> Option<TermId> {
        self.word_to_id.get(token).copied()
    }

    pub fn word(&self, id: TermId) -> Option<&str> {
        self.words.get(id as usize).map(String::as_str)
    }

    /// Tokens in id order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Checks that `words` and `word_to_id` describe the same bijection.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.words.len() != self.word_to_id.len() {
            return Err(Error::malformed(format!(
                "lexicon lists {} words but maps {}",
                self.words.len(),
                self.word_to_id.len()
            )));
        }
        for (id, word) in self.words.iter().enumerate() {
            match self.word_to_id.get(word) {
                Some(&mapped) if mapped as usize == id => {}
                Some(&mapped) => {
                    return Err(Error::malformed(format!(
                        "lexicon word {word:?} listed at {id} but mapped to {mapped}"
                    )));
                }
                None => {
                    return Err(Error::malformed(format!(
                        "lexicon word {word:?} at {id} has no id mapping"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_intern_same_token_twice() {
        let mut lex = Lexicon::new();
        let a = lex.intern("cat");
        let b = lex.intern("cat");
        assert_eq!(a, b);
        assert_eq!(lex.len(), 1);
    }

    #[test]
    fn test_ids_follow_first_seen_order() {
        let mut lex = Lexicon::new();
        for token in ["the", "cat", "the", "sat", "cat", "dog"] {
            lex.intern(token);
        }
        assert_eq!(lex.words(), ["the", "cat", "sat", "dog"]);
        assert_eq!(lex.lookup("sat"), Some(2));
        assert_eq!(lex.word(3), Some("dog"));
    }

    #[test]
    fn test_lookup_does_not_allocate() {
        let mut lex = Lexicon::new();
        lex.intern("cat");
        assert_eq!(lex.lookup("bird"), None);
        assert_eq!(lex.len(), 1);
        assert_eq!(lex.word(1), None);
    }

    #[test]
    fn test_validate_detects_broken_mapping() {
        let mut lex = Lexicon::new();
        lex.intern("cat");
        lex.intern("dog");
        assert!(lex.validate().is_ok());

        lex.word_to_id.insert("dog".to_string(), 0);
        assert!(matches!(lex.validate(), Err(Error::MalformedIndex(_))));
    }

    proptest! {
        #[test]
        fn prop_dense_ids_in_first_seen_order(tokens in prop::collection::vec("[a-e]{1,3}", 0..60)) {
            let mut lex = Lexicon::new();
            let mut first_seen: Vec<String> = Vec::new();
            for token in &tokens {
                let id = lex.intern(token);
                if !first_seen.contains(token) {
                    first_seen.push(token.clone());
                }
                let expected = first_seen.iter().position(|t| t == token).unwrap();
                prop_assert_eq!(id as usize, expected);
            }
            prop_assert_eq!(lex.words(), first_seen.as_slice());
            prop_assert!(lex.validate().is_ok());
        }
    }
}
