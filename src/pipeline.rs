//! Document preprocessing: raw text in, word tokens out.
//!
//! The EM engine never looks at text. Preprocessing matters in two places only:
//! building a [`Corpus`](crate::Corpus) from raw documents, and projecting an
//! unseen document in [`PlsaResult::predict`](crate::PlsaResult::predict). Both
//! must run the *same* preprocessor, so the corpus keeps it and hands it on.
//!
//! [`Pipeline`] is a small language-agnostic default. Anything fancier
//! (lemmatization, POS filtering, ...) plugs in through [`Preprocess`], which
//! is also implemented for plain closures.

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#?\w+;").expect("valid entity pattern"));
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation pattern"));

/// Turns one raw document into its ordered word tokens.
pub trait Preprocess: Send + Sync {
    /// Process a document into tokens.
    fn process(&self, doc: &str) -> Vec<String>;
}

impl<F> Preprocess for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn process(&self, doc: &str) -> Vec<String> {
        self(doc)
    }
}

/// Default preprocessor.
///
/// Steps, in order:
/// 1. custom removal patterns,
/// 2. markup stripping: HTML/XML tags and character entities (on by default),
/// 3. optional removal of non-ASCII characters,
/// 4. punctuation replaced by whitespace, optional lowercasing,
/// 5. splitting into Unicode words,
/// 6. dropping digit-only tokens (unless `keep_numbers`),
/// 7. dropping tokens shorter than `min_word_len` characters,
/// 8. dropping stopwords (compared after lowercasing, if enabled).
#[derive(Debug, Clone)]
pub struct Pipeline {
    lowercase: bool,
    keep_numbers: bool,
    strip_markup: bool,
    ascii_only: bool,
    min_word_len: usize,
    stopwords: HashSet<String>,
    remove_patterns: Vec<Regex>,
}

impl Pipeline {
    /// Lowercasing, markup stripping, no numbers, minimum word length 1, no stopwords.
    pub fn new() -> Self {
        Self {
            lowercase: true,
            keep_numbers: false,
            strip_markup: true,
            ascii_only: false,
            min_word_len: 1,
            stopwords: HashSet::new(),
            remove_patterns: Vec::new(),
        }
    }

    /// Set whether tokens are lowercased.
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Set whether digit-only tokens survive.
    pub fn with_numbers(mut self, keep: bool) -> Self {
        self.keep_numbers = keep;
        self
    }

    /// Set whether tags (`<...>`) and entities (`&nbsp;`, `&#39;`) are removed.
    pub fn with_markup_stripping(mut self, strip: bool) -> Self {
        self.strip_markup = strip;
        self
    }

    /// Set whether non-ASCII characters are dropped before tokenizing.
    pub fn with_ascii_only(mut self, ascii_only: bool) -> Self {
        self.ascii_only = ascii_only;
        self
    }

    /// Set the minimum token length, in characters.
    pub fn with_min_word_len(mut self, len: usize) -> Self {
        self.min_word_len = len;
        self
    }

    /// Add stopwords.
    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for w in words {
            let w = w.as_ref();
            let w = if self.lowercase {
                w.to_lowercase()
            } else {
                w.to_string()
            };
            self.stopwords.insert(w);
        }
        self
    }

    /// Add a regex whose matches are blanked out before anything else runs.
    pub fn with_remove_pattern(mut self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| Error::Other(e.to_string()))?;
        self.remove_patterns.push(regex);
        Ok(self)
    }

    fn clean(&self, doc: &str) -> String {
        let mut text = doc.to_string();
        for pattern in &self.remove_patterns {
            text = pattern.replace_all(&text, " ").into_owned();
        }
        if self.strip_markup {
            text = TAG.replace_all(&text, " ").into_owned();
            text = ENTITY.replace_all(&text, " ").into_owned();
        }
        if self.ascii_only {
            text.retain(|c| c.is_ascii());
        }
        text = PUNCTUATION.replace_all(&text, " ").into_owned();
        if self.lowercase {
            text = text.to_lowercase();
        }
        text
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocess for Pipeline {
    fn process(&self, doc: &str) -> Vec<String> {
        self.clean(doc)
            .unicode_words()
            .filter(|tok| self.keep_numbers || !tok.chars().all(|c| c.is_numeric()))
            .filter(|tok| tok.chars().count() >= self.min_word_len)
            .filter(|tok| !self.stopwords.contains(*tok))
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pipeline(lowercase={}, markup={}, ascii_only={}, numbers={}, min_word_len={}, stopwords={})",
            self.lowercase,
            self.strip_markup,
            self.ascii_only,
            self.keep_numbers,
            self.min_word_len,
            self.stopwords.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline() {
        let tokens = Pipeline::new().process("Hello, World! 42 times: <b>bold</b>");
        assert_eq!(tokens, vec!["hello", "world", "times", "bold"]);
    }

    #[test]
    fn test_markup_is_stripped() {
        let tokens = Pipeline::new().process("<p>Bread&nbsp;oven</p> <b>flour</b> caf\u{e9}");
        assert_eq!(tokens, vec!["bread", "oven", "flour", "caf\u{e9}"]);

        let kept = Pipeline::new()
            .with_markup_stripping(false)
            .process("<b>flour</b>");
        assert_eq!(kept, vec!["b", "flour", "b"]);
    }

    #[test]
    fn test_ascii_only_drops_accented_characters() {
        let tokens = Pipeline::new()
            .with_ascii_only(true)
            .process("na\u{ef}ve caf\u{e9}");
        assert_eq!(tokens, vec!["nave", "caf"]);
    }

    #[test]
    fn test_remove_pattern() {
        let p = Pipeline::new()
            .with_remove_pattern(r"https?://\S+")
            .unwrap();
        assert_eq!(p.process("see https://example.com/x now"), vec!["see", "now"]);
        assert!(Pipeline::new().with_remove_pattern("(").is_err());
    }

    #[test]
    fn test_filters_compose() {
        let p = Pipeline::new()
            .with_min_word_len(3)
            .with_stopwords(["The", "and"]);
        let tokens = p.process("The cat and the hat sat");
        assert_eq!(tokens, vec!["cat", "hat", "sat"]);
    }

    #[test]
    fn test_numbers_kept_on_request() {
        let tokens = Pipeline::new().with_numbers(true).process("year 2024");
        assert_eq!(tokens, vec!["year", "2024"]);
    }

    #[test]
    fn test_closure_preprocessor() {
        let ws = |doc: &str| doc.split_whitespace().map(String::from).collect::<Vec<_>>();
        assert_eq!(ws.process("a  b"), vec!["a", "b"]);
    }
}
