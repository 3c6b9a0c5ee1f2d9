//! Conditional (asymmetric) PLSA.
//!
//! # The Model
//!
//! Any joint can be written `P(d, w) = P(d|w) P(w)`. Conditional PLSA keeps the
//! empirical word marginal `P(w)` fixed and factorizes only the conditional:
//!
//! ```text
//! P(d|w) ≈ Σₜ p̃(d|t) p̃(t|w)
//! ```
//!
//! There is no free topic-weight vector; `p̃(t)` is read off the joint.
//!
//! # The M-step
//!
//! ```text
//! p̃(d|t) ∝ Σ_w P(d, w) q(t|d, w)        normalized over d
//! p̃(t|w) ∝ Σ_d P(d, w) q(t|d, w)        normalized over t
//! p̃(t, d, w) = P(w) p̃(d|t) p̃(t|w)       normalized over everything
//! p̃(t) = Σ_{d,w} p̃(t, d, w)
//! ```
//!
//! The final global normalization matters: once underflowed entries are
//! clamped, nothing in the construction above keeps the joint at unit mass.
//!
//! # Why keep `p̃(t|w)`?
//!
//! It is exactly what is needed to project an unseen document onto the topic
//! space, so conditional results support [`predict`](crate::PlsaResult::predict).

use super::traits::{attributed_mass, doc_given_topic, Factors, Maximize};
use crate::normalize::{invert, normalize, normalize_total};
use ndarray::{Array1, Array2, Array3, Axis, Zip};

/// Factors of the conditional model.
#[derive(Debug, Clone)]
pub struct Conditional {
    /// `p̃(d|t)`, shape `(n_docs, n_topics)`.
    doc_given_topic: Array2<f64>,
    /// `p̃(t|w)`, shape `(n_topics, n_words)`.
    topic_given_word: Array2<f64>,
    /// Empirical `P(w)`; fixed for the lifetime of the model.
    word: Array1<f64>,
    /// `p̃(t)`, derived from the joint.
    topic: Array1<f64>,
}

impl Conditional {
    /// Current `p̃(d|t)`.
    pub fn doc_given_topic(&self) -> &Array2<f64> {
        &self.doc_given_topic
    }

    /// Current `p̃(t|w)`.
    pub fn topic_given_word(&self) -> &Array2<f64> {
        &self.topic_given_word
    }

    /// Empirical word marginal `P(w)`.
    pub fn word(&self) -> &Array1<f64> {
        &self.word
    }

    /// Current `p̃(t)`.
    pub fn topic(&self) -> &Array1<f64> {
        &self.topic
    }
}

impl Maximize for Conditional {
    const NAME: &'static str = "ConditionalPLSA";

    fn new(doc_word: &Array2<f64>, n_topics: usize) -> Self {
        let (n_docs, n_words) = doc_word.dim();
        Self {
            doc_given_topic: Array2::zeros((n_docs, n_topics)),
            topic_given_word: Array2::zeros((n_topics, n_words)),
            word: doc_word.sum_axis(Axis(0)),
            topic: Array1::zeros(n_topics),
        }
    }

    fn maximize(&mut self, doc_word: &Array2<f64>, conditional: &Array3<f64>) -> Array3<f64> {
        let mass = attributed_mass(doc_word, conditional);
        self.doc_given_topic = doc_given_topic(&mass);
        self.topic_given_word = normalize(mass.sum_axis(Axis(1)), Axis(0)).0;

        let mut joint = Array3::<f64>::zeros(conditional.raw_dim());
        for (t, mut slice) in joint.outer_iter_mut().enumerate() {
            let docs = self.doc_given_topic.column(t);
            let topic_given_word = self.topic_given_word.row(t);
            let word = &self.word;
            Zip::indexed(&mut slice)
                .for_each(|(d, w), p| *p = docs[d] * topic_given_word[w] * word[w]);
        }
        let (joint, _) = normalize_total(joint);
        self.topic = joint.sum_axis(Axis(2)).sum_axis(Axis(1));
        joint
    }

    fn factors(&self) -> Factors {
        Factors {
            topic: self.topic.clone(),
            topic_given_doc: invert(self.doc_given_topic.view(), self.topic.view())
                .reversed_axes(),
            word_given_topic: invert(self.topic_given_word.view(), self.word.view()),
            topic_given_word: Some(self.topic_given_word.clone()),
        }
    }
}
