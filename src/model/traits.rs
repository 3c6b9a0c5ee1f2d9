//! The seam between the shared EM loop and a factorization variant.

use crate::normalize::normalize;
use ndarray::{Array1, Array2, Array3, Axis};
use std::fmt::Debug;

/// Variant-specific M-step of a PLSA-style model.
///
/// The engine owns `P(d, w)` and the responsibilities `q(t|d, w)`; the
/// variant owns its conditional factors and rebuilds the joint from them.
pub trait Maximize: Debug {
    /// Short human-readable name, used in summaries and logs.
    const NAME: &'static str;

    /// Allocate empty factors for a `(n_docs, n_words)` joint and `n_topics` topics.
    fn new(doc_word: &Array2<f64>, n_topics: usize) -> Self
    where
        Self: Sized;

    /// Update the factors from the current responsibilities and return the
    /// new joint `p̃(t, d, w)` with shape `(n_topics, n_docs, n_words)`.
    fn maximize(&mut self, doc_word: &Array2<f64>, conditional: &Array3<f64>) -> Array3<f64>;

    /// Snapshot of the fitted factors in the layout the result expects.
    fn factors(&self) -> Factors;
}

/// Fitted factors handed from a variant to [`PlsaResult`](crate::PlsaResult).
#[derive(Debug, Clone)]
pub struct Factors {
    /// Topic weights `p̃(t)`, shape `(n_topics,)`.
    pub topic: Array1<f64>,
    /// Per-document topic proportions `p̃(t|d)`, shape `(n_docs, n_topics)`.
    pub topic_given_doc: Array2<f64>,
    /// Word distribution per topic `p̃(w|t)`, shape `(n_words, n_topics)`.
    pub word_given_topic: Array2<f64>,
    /// Topic distribution per word `p̃(t|w)`, shape `(n_topics, n_words)`.
    ///
    /// Only variants that model `p(t|w)` directly provide it; prediction needs it.
    pub topic_given_word: Option<Array2<f64>>,
}

/// `P(d, w) · q(t|d, w)`, the mass of every document-word pair attributed to each topic.
pub(crate) fn attributed_mass(doc_word: &Array2<f64>, conditional: &Array3<f64>) -> Array3<f64> {
    conditional * doc_word
}

/// `p̃(d|t)` with shape `(n_docs, n_topics)` from the attributed mass.
pub(crate) fn doc_given_topic(mass: &Array3<f64>) -> Array2<f64> {
    normalize(mass.sum_axis(Axis(2)).reversed_axes(), Axis(0)).0
}
