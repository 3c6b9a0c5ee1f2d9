//! Symmetric PLSA.
//!
//! # The Model
//!
//! The joint distribution of documents and words is factorized through a
//! latent topic:
//!
//! ```text
//! P(d, w) ≈ Σₜ p̃(d|t) p̃(w|t) p̃(t)
//! ```
//!
//! # The M-step
//!
//! With responsibilities `q(t|d, w)` from the previous E-step:
//!
//! ```text
//! p̃(d|t) ∝ Σ_w P(d, w) q(t|d, w)        normalized over d
//! p̃(w|t) ∝ Σ_d P(d, w) q(t|d, w)        normalized over w
//! p̃(t)   = Σ_{d,w} P(d, w) q(t|d, w)
//! p̃(t, d, w) = p̃(d|t) p̃(w|t) p̃(t)
//! ```
//!
//! The joint needs no extra normalization: `p̃(t)` already carries the full
//! mass of `P(d, w)`.
//!
//! # Failure Modes
//!
//! - **No `p(t|w)`**: the factorization never models topics given words, so a
//!   fitted symmetric model cannot project unseen documents.

use super::traits::{attributed_mass, doc_given_topic, Factors, Maximize};
use crate::normalize::{invert, normalize};
use ndarray::{Array1, Array2, Array3, Axis, Zip};

/// Factors of the symmetric model.
#[derive(Debug, Clone)]
pub struct Symmetric {
    /// `p̃(d|t)`, shape `(n_docs, n_topics)`.
    doc_given_topic: Array2<f64>,
    /// `p̃(w|t)`, shape `(n_words, n_topics)`.
    word_given_topic: Array2<f64>,
    /// `p̃(t)`.
    topic: Array1<f64>,
}

impl Symmetric {
    /// Current `p̃(d|t)`.
    pub fn doc_given_topic(&self) -> &Array2<f64> {
        &self.doc_given_topic
    }

    /// Current `p̃(w|t)`.
    pub fn word_given_topic(&self) -> &Array2<f64> {
        &self.word_given_topic
    }

    /// Current `p̃(t)`.
    pub fn topic(&self) -> &Array1<f64> {
        &self.topic
    }
}

impl Maximize for Symmetric {
    const NAME: &'static str = "PLSA";

    fn new(doc_word: &Array2<f64>, n_topics: usize) -> Self {
        let (n_docs, n_words) = doc_word.dim();
        Self {
            doc_given_topic: Array2::zeros((n_docs, n_topics)),
            word_given_topic: Array2::zeros((n_words, n_topics)),
            topic: Array1::zeros(n_topics),
        }
    }

    fn maximize(&mut self, doc_word: &Array2<f64>, conditional: &Array3<f64>) -> Array3<f64> {
        let mass = attributed_mass(doc_word, conditional);
        self.doc_given_topic = doc_given_topic(&mass);
        self.word_given_topic = normalize(mass.sum_axis(Axis(1)).reversed_axes(), Axis(0)).0;
        self.topic = mass.sum_axis(Axis(2)).sum_axis(Axis(1));

        let mut joint = Array3::<f64>::zeros(conditional.raw_dim());
        for (t, mut slice) in joint.outer_iter_mut().enumerate() {
            let docs = self.doc_given_topic.column(t);
            let words = self.word_given_topic.column(t);
            let weight = self.topic[t];
            Zip::indexed(&mut slice).for_each(|(d, w), p| *p = docs[d] * words[w] * weight);
        }
        joint
    }

    fn factors(&self) -> Factors {
        Factors {
            topic: self.topic.clone(),
            topic_given_doc: invert(self.doc_given_topic.view(), self.topic.view())
                .reversed_axes(),
            word_given_topic: self.word_given_topic.clone(),
            topic_given_word: None,
        }
    }
}
