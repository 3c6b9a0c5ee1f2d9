//! Document-word statistics consumed by the EM engines.
//!
//! A [`Corpus`] owns three things:
//! - the raw count matrix `n(d, w)` (documents x words),
//! - the [`Vocabulary`] naming its columns,
//! - the [`Preprocess`] implementation that produced the tokens.
//!
//! Engines never see counts directly. They ask for the joint
//! `P(d, w) = n(d, w) / Σ n`, optionally re-weighted per word by the inverse
//! document frequency:
//!
//! ```text
//! idf(w) = ln(N / df(w))
//! P(d, w) ∝ n(d, w) · idf(w)      (Weighting::TfIdf)
//! ```
//!
//! A word that occurs in every document gets `idf = 0` and drops out of the
//! weighted matrix entirely.

use crate::error::{Error, Result};
use crate::normalize::normalize_total;
use crate::pipeline::Preprocess;
use crate::vocabulary::Vocabulary;
use ndarray::{Array1, Array2, Axis};
use std::fmt;
use std::sync::Arc;

/// How counts are turned into the joint `P(d, w)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Weighting {
    /// Plain term frequencies.
    #[default]
    Raw,
    /// Term frequencies scaled by inverse document frequency.
    TfIdf,
}

/// Documents represented as word counts over a shared vocabulary.
#[derive(Clone)]
pub struct Corpus {
    counts: Array2<f64>,
    idf: Array1<f64>,
    vocabulary: Arc<Vocabulary>,
    pipeline: Arc<dyn Preprocess>,
}

impl Corpus {
    /// Tokenize `docs` with `pipeline` and count word occurrences.
    ///
    /// Word indices are assigned in order of first appearance. Documents that
    /// end up with no tokens still occupy a (zero) row.
    pub fn from_documents<I, S, P>(docs: I, pipeline: P) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        P: Preprocess + 'static,
    {
        let mut vocabulary = Vocabulary::new();
        let mut rows: Vec<Vec<(usize, f64)>> = Vec::new();
        for doc in docs {
            let mut row = Vec::new();
            for token in pipeline.process(doc.as_ref()) {
                row.push((vocabulary.insert(token), 1.0));
            }
            rows.push(row);
        }
        if rows.is_empty() || vocabulary.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut counts = Array2::zeros((rows.len(), vocabulary.len()));
        for (d, row) in rows.into_iter().enumerate() {
            for (w, c) in row {
                counts[[d, w]] += c;
            }
        }
        Self::from_counts(counts, vocabulary, pipeline)
    }

    /// Wrap a ready-made count matrix.
    ///
    /// `counts` must have one column per vocabulary word and contain only
    /// finite, non-negative values.
    pub fn from_counts<P>(counts: Array2<f64>, vocabulary: Vocabulary, pipeline: P) -> Result<Self>
    where
        P: Preprocess + 'static,
    {
        if counts.is_empty() {
            return Err(Error::EmptyInput);
        }
        if counts.ncols() != vocabulary.len() {
            return Err(Error::DimensionMismatch {
                expected: vocabulary.len(),
                found: counts.ncols(),
            });
        }
        if counts.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(Error::InvalidParameter {
                name: "counts",
                message: "must be finite and non-negative",
            });
        }

        let n_docs = counts.nrows() as f64;
        let idf = counts
            .map(|&c| if c > 0.0 { 1.0 } else { 0.0 })
            .sum_axis(Axis(0))
            .mapv(|df| if df > 0.0 { (n_docs / df).ln() } else { 0.0 });

        Ok(Self {
            counts,
            idf,
            vocabulary: Arc::new(vocabulary),
            pipeline: Arc::new(pipeline),
        })
    }

    /// Number of documents.
    pub fn n_docs(&self) -> usize {
        self.counts.nrows()
    }

    /// Number of distinct words.
    pub fn n_words(&self) -> usize {
        self.counts.ncols()
    }

    /// Total number of word occurrences.
    pub fn n_occurrences(&self) -> f64 {
        self.counts.sum()
    }

    /// Raw count matrix `n(d, w)`.
    pub fn counts(&self) -> &Array2<f64> {
        &self.counts
    }

    /// Inverse document frequency per word.
    pub fn idf(&self) -> &Array1<f64> {
        &self.idf
    }

    /// Column vocabulary.
    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocabulary
    }

    /// Preprocessor that produced the tokens.
    pub fn pipeline(&self) -> &Arc<dyn Preprocess> {
        &self.pipeline
    }

    /// Joint `P(d, w)`, summing to one over the whole matrix.
    ///
    /// Returns an all-zero matrix if the (weighted) counts carry no mass.
    pub fn doc_word(&self, weighting: Weighting) -> Array2<f64> {
        let weighted = match weighting {
            Weighting::Raw => self.counts.clone(),
            Weighting::TfIdf => &self.counts * &self.idf,
        };
        normalize_total(weighted).0
    }

    /// Word marginal `P(w) = Σ_d P(d, w)`.
    pub fn word(&self, weighting: Weighting) -> Array1<f64> {
        self.doc_word(weighting).sum_axis(Axis(0))
    }

    /// Document marginal `P(d) = Σ_w P(d, w)`.
    pub fn doc(&self, weighting: Weighting) -> Array1<f64> {
        self.doc_word(weighting).sum_axis(Axis(1))
    }
}

impl fmt::Debug for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Corpus")
            .field("n_docs", &self.n_docs())
            .field("n_words", &self.n_words())
            .field("n_occurrences", &self.n_occurrences())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Corpus:")?;
        writeln!(f, "=======")?;
        writeln!(f, "Number of documents: {}", self.n_docs())?;
        write!(f, "Number of words:     {}", self.n_words())
    }
}
