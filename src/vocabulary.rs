//! Bijective mapping between word tokens and dense column indices.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Word <-> index mapping for the columns of a document-word matrix.
///
/// Indices are dense in `[0, len)` and assigned in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    words: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Create an empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vocabulary from an ordered list of distinct words.
    ///
    /// Returns an error if a word appears twice, since the mapping must stay bijective.
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::new();
        for word in words {
            let word = word.into();
            if vocab.index.contains_key(&word) {
                return Err(Error::Other(format!("duplicate vocabulary word '{word}'")));
            }
            vocab.insert(word);
        }
        Ok(vocab)
    }

    /// Index of `word`, inserting it at the end if unseen.
    pub fn insert(&mut self, word: impl Into<String>) -> usize {
        let word = word.into();
        if let Some(&i) = self.index.get(&word) {
            return i;
        }
        let i = self.words.len();
        self.index.insert(word.clone(), i);
        self.words.push(word);
        i
    }

    /// Index of `word`, if known.
    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// Word stored at `index`, if in range.
    pub fn word(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}
