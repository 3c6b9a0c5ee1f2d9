//! Packaged output of a fit: sorted topics, labelled word lists, prediction.
//!
//! A [`PlsaResult`] is an immutable snapshot. On construction it
//!
//! 1. sorts topics by descending weight `p̃(t)` and applies that one
//!    permutation to every topic-indexed array,
//! 2. sorts each topic's word distribution by descending probability and
//!    labels it with vocabulary words,
//! 3. keeps what [`predict`](PlsaResult::predict) needs, but only when the
//!    fitted variant provides `p̃(t|w)`.

use super::traits::Factors;
use crate::corpus::Weighting;
use crate::error::{Error, Result};
use crate::normalize::normalize_total;
use crate::pipeline::Preprocess;
use crate::vocabulary::Vocabulary;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Corpus context an engine hands to every result it packages.
#[derive(Clone)]
pub(crate) struct ResultContext {
    pub(crate) vocabulary: Arc<Vocabulary>,
    pub(crate) pipeline: Arc<dyn Preprocess>,
    pub(crate) weighting: Weighting,
    pub(crate) idf: Array1<f64>,
}

/// Everything `predict` needs; absent for variants without `p̃(t|w)`.
#[derive(Clone)]
struct Predictor {
    /// `p̃(t|w)` with rows in sorted topic order.
    topic_given_word: Array2<f64>,
    context: ResultContext,
}

/// Projection of an unseen document onto the fitted topics.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Unnormalized topic affinities, in the result's (sorted) topic order.
    pub topic: Array1<f64>,
    /// Number of tokens not found in the vocabulary (with repetition).
    pub n_unknown_words: usize,
    /// Distinct tokens not found in the vocabulary.
    pub unknown_words: BTreeSet<String>,
}

/// Fitted topic model.
#[derive(Clone)]
pub struct PlsaResult {
    topic: Array1<f64>,
    topic_given_doc: Array2<f64>,
    word_given_topic: Vec<Vec<(String, f64)>>,
    convergence: Vec<f64>,
    n_words: usize,
    weighting: Weighting,
    predictor: Option<Predictor>,
}

impl PlsaResult {
    pub(crate) fn new(factors: Factors, convergence: Vec<f64>, context: &ResultContext) -> Self {
        let order = descending_order(factors.topic.view());
        let topic = factors.topic.select(Axis(0), &order);
        let topic_given_doc = factors.topic_given_doc.select(Axis(1), &order);
        let word_given_topic = factors.word_given_topic.select(Axis(1), &order);
        let n_words = word_given_topic.nrows();

        let vocabulary = &context.vocabulary;
        let word_given_topic = word_given_topic
            .columns()
            .into_iter()
            .map(|column| {
                descending_order(column)
                    .into_iter()
                    .map(|w| {
                        let word = vocabulary.word(w).unwrap_or_default().to_string();
                        (word, column[w])
                    })
                    .collect()
            })
            .collect();

        let predictor = factors.topic_given_word.map(|tgw| Predictor {
            topic_given_word: tgw.select(Axis(0), &order),
            context: context.clone(),
        });

        Self {
            topic,
            topic_given_doc,
            word_given_topic,
            convergence,
            n_words,
            weighting: context.weighting,
            predictor,
        }
    }

    /// Number of topics.
    pub fn n_topics(&self) -> usize {
        self.topic.len()
    }

    /// Number of documents the model was fitted on.
    pub fn n_docs(&self) -> usize {
        self.topic_given_doc.nrows()
    }

    /// Vocabulary size.
    pub fn n_words(&self) -> usize {
        self.n_words
    }

    /// Topic weights `p̃(t)`, in descending order.
    pub fn topic(&self) -> &Array1<f64> {
        &self.topic
    }

    /// Topic proportions per document, shape `(n_docs, n_topics)`; each row sums to one.
    pub fn topic_given_doc(&self) -> &Array2<f64> {
        &self.topic_given_doc
    }

    /// Per topic, every vocabulary word with its probability, most probable first.
    pub fn word_given_topic(&self) -> &[Vec<(String, f64)>] {
        &self.word_given_topic
    }

    /// The `n` most probable words of `topic`, or `None` if `topic` is out of range.
    pub fn top_words(&self, topic: usize, n: usize) -> Option<&[(String, f64)]> {
        self.word_given_topic
            .get(topic)
            .map(|words| &words[..n.min(words.len())])
    }

    /// Kullback-Leibler divergence recorded after each tracked iteration.
    pub fn convergence(&self) -> &[f64] {
        &self.convergence
    }

    /// Last recorded divergence, or `f64::INFINITY` if nothing was recorded.
    pub fn kl_divergence(&self) -> f64 {
        self.convergence.last().copied().unwrap_or(f64::INFINITY)
    }

    /// Weighting of the document-word matrix the model was fitted on.
    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    /// Whether [`predict`](Self::predict) is available.
    pub fn can_predict(&self) -> bool {
        self.predictor.is_some()
    }

    /// `p̃(t|w)` in sorted topic order, if the fitted variant models it.
    pub fn topic_given_word(&self) -> Option<&Array2<f64>> {
        self.predictor.as_ref().map(|p| &p.topic_given_word)
    }

    /// Project an unseen document onto the fitted topics.
    ///
    /// The document goes through the corpus preprocessor, known tokens are
    /// counted (and idf-weighted if the model was), the counts are normalized
    /// and multiplied by `p̃(t|w)`. A document with no known tokens maps to
    /// the zero vector.
    ///
    /// Returns [`Error::PredictionUnsupported`] for results of variants that
    /// do not model `p̃(t|w)`.
    pub fn predict(&self, doc: &str) -> Result<Prediction> {
        let predictor = self
            .predictor
            .as_ref()
            .ok_or(Error::PredictionUnsupported)?;
        let context = &predictor.context;

        let mut counts = Array1::<f64>::zeros(self.n_words);
        let mut n_unknown_words = 0;
        let mut unknown_words = BTreeSet::new();
        for token in context.pipeline.process(doc) {
            match context.vocabulary.index_of(&token) {
                Some(w) => counts[w] += 1.0,
                None => {
                    n_unknown_words += 1;
                    unknown_words.insert(token);
                }
            }
        }
        if context.weighting == Weighting::TfIdf {
            counts *= &context.idf;
        }
        let (doc_word, _) = normalize_total(counts);

        Ok(Prediction {
            topic: predictor.topic_given_word.dot(&doc_word),
            n_unknown_words,
            unknown_words,
        })
    }
}

/// Indices of `values`, largest value first. Ties keep their original order.
fn descending_order(values: ArrayView1<'_, f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].partial_cmp(&values[a]).unwrap_or(Ordering::Equal));
    order
}

impl fmt::Debug for PlsaResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlsaResult")
            .field("topic", &self.topic)
            .field("n_docs", &self.n_docs())
            .field("n_words", &self.n_words)
            .field("iterations", &self.convergence.len())
            .field("can_predict", &self.can_predict())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for PlsaResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PlsaResult:")?;
        writeln!(f, "===========")?;
        writeln!(f, "Number of topics:    {}", self.n_topics())?;
        writeln!(f, "Number of documents: {}", self.n_docs())?;
        write!(f, "Number of words:     {}", self.n_words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use ndarray::array;

    fn context(words: &[&str]) -> ResultContext {
        let vocabulary = Vocabulary::from_words(words.iter().copied()).unwrap();
        ResultContext {
            idf: Array1::ones(vocabulary.len()),
            vocabulary: Arc::new(vocabulary),
            pipeline: Arc::new(Pipeline::new()),
            weighting: Weighting::Raw,
        }
    }

    fn factors(with_topic_given_word: bool) -> Factors {
        Factors {
            topic: array![0.1, 0.5, 0.4],
            // Documents x topics; column t marks topic t.
            topic_given_doc: array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            // Words x topics.
            word_given_topic: array![[0.7, 0.1, 0.3], [0.2, 0.6, 0.3], [0.1, 0.3, 0.4]],
            topic_given_word: with_topic_given_word.then(|| {
                array![[0.2, 0.0, 0.0], [0.5, 1.0, 0.0], [0.3, 0.0, 1.0]]
            }),
        }
    }

    #[test]
    fn test_topics_sorted_and_permuted_consistently() {
        let ctx = context(&["alpha", "beta", "gamma"]);
        let r = PlsaResult::new(factors(true), vec![3.0, 2.0], &ctx);

        assert_eq!(r.topic(), &array![0.5, 0.4, 0.1]);
        // Old topic 1 is now topic 0, old topic 2 is topic 1, old topic 0 is topic 2.
        assert_eq!(r.topic_given_doc().row(1).to_vec(), vec![1.0, 0.0, 0.0]);
        assert_eq!(r.topic_given_doc().row(2).to_vec(), vec![0.0, 1.0, 0.0]);
        assert_eq!(r.topic_given_doc().row(0).to_vec(), vec![0.0, 0.0, 1.0]);

        let tgw = r.topic_given_word().unwrap();
        assert_eq!(tgw.row(0).to_vec(), vec![0.5, 1.0, 0.0]);
        assert_eq!(tgw.row(2).to_vec(), vec![0.2, 0.0, 0.0]);
    }

    #[test]
    fn test_words_sorted_and_labelled() {
        let ctx = context(&["alpha", "beta", "gamma"]);
        let r = PlsaResult::new(factors(false), vec![], &ctx);

        let top = &r.word_given_topic()[0];
        assert_eq!(top[0], ("beta".to_string(), 0.6));
        assert_eq!(top[1], ("gamma".to_string(), 0.3));
        assert_eq!(top[2], ("alpha".to_string(), 0.1));

        let last = &r.word_given_topic()[2];
        assert_eq!(last[0].0, "alpha");

        let two = r.top_words(1, 2).unwrap();
        assert_eq!(two.len(), 2);
        assert_eq!(two[0].0, "gamma");
        assert!(r.top_words(3, 1).is_none());
        assert_eq!(r.top_words(0, 10).unwrap().len(), 3);
    }

    #[test]
    fn test_predict_unsupported_without_topic_given_word() {
        let ctx = context(&["alpha", "beta", "gamma"]);
        let r = PlsaResult::new(factors(false), vec![1.0], &ctx);
        assert!(!r.can_predict());
        assert_eq!(r.predict("alpha"), Err(Error::PredictionUnsupported));
        // Everything else still works.
        assert_eq!(r.n_topics(), 3);
        assert_eq!(r.convergence(), &[1.0]);
    }

    #[test]
    fn test_predict_projects_known_words() {
        let ctx = context(&["alpha", "beta", "gamma"]);
        let r = PlsaResult::new(factors(true), vec![], &ctx);
        let p = r.predict("beta beta zeta").unwrap();
        // Only "beta" is known: document vector is e_beta.
        assert_eq!(p.topic, array![1.0, 0.0, 0.0]);
        assert_eq!(p.n_unknown_words, 1);
        assert_eq!(p.unknown_words, BTreeSet::from(["zeta".to_string()]));
    }

    #[test]
    fn test_predict_all_unknown_is_zero() {
        let ctx = context(&["alpha", "beta", "gamma"]);
        let r = PlsaResult::new(factors(true), vec![], &ctx);
        let p = r.predict("zeta eta zeta").unwrap();
        assert!(p.topic.iter().all(|&x| x == 0.0));
        assert_eq!(p.topic.len(), 3);
        assert_eq!(p.n_unknown_words, 3);
        assert_eq!(
            p.unknown_words,
            BTreeSet::from(["eta".to_string(), "zeta".to_string()])
        );
    }

    #[test]
    fn test_kl_divergence_of_empty_history() {
        let ctx = context(&["alpha", "beta", "gamma"]);
        let r = PlsaResult::new(factors(false), vec![], &ctx);
        assert_eq!(r.kl_divergence(), f64::INFINITY);
    }
}
