//! The shared EM loop.
//!
//! # The Algorithm
//!
//! Every iteration alternates
//!
//! 1. **M-step** (variant-specific, see [`Maximize`]): rebuild the joint
//!    `p̃(t, d, w)` from the current responsibilities `q(t|d, w)`.
//! 2. **E-step** (shared): `q(t|d, w) = p̃(t, d, w) / p̃(d, w)`, where the
//!    model marginal `p̃(d, w)` falls out of the normalization for free.
//! 3. **Divergence**: with the empirical `P(d, w)`,
//!
//! ```text
//! L  = Σ_{d,w} P(d, w) ln p̃(d, w)
//! KL = Σ_{d,w} P(d, w) ln P(d, w) − L
//! ```
//!
//! The negative entropy `Σ P ln P` is a constant of the data and is computed
//! once at construction.
//!
//! # Stopping
//!
//! At most `max_iter` iterations run. The first `warmup` of them are neither
//! recorded nor checked. After that, a run stops as soon as the relative
//! change of the divergence w.r.t. the last recorded value drops below `tol`;
//! the stopping value itself is not recorded.
//!
//! # Failure Modes
//!
//! - **Local optima**: EM only finds a local optimum of the likelihood; use
//!   [`Plsa::best_of`] to restart from several random initializations.
//! - **Underflow**: absorbed by [`normalize`](crate::normalize::normalize);
//!   never an error.

use super::result::{PlsaResult, ResultContext};
use super::traits::Maximize;
use crate::corpus::{Corpus, Weighting};
use crate::error::{Error, Result};
use crate::normalize::{normalize, EPS};
use ndarray::{Array2, Array3, Axis, Zip};
use rand::prelude::*;
use std::fmt;
use tracing::{debug, info};

/// Construction parameters of an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Number of latent topics.
    pub n_topics: usize,
    /// Weighting of the document-word matrix.
    pub weighting: Weighting,
    /// Seed for the random initialization; `None` draws one.
    pub seed: Option<u64>,
}

impl EngineConfig {
    /// Raw counts, unseeded.
    pub fn new(n_topics: usize) -> Self {
        Self {
            n_topics,
            weighting: Weighting::Raw,
            seed: None,
        }
    }

    /// Set the document-word weighting.
    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Stopping parameters of a fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    /// Relative change of the divergence below which fitting stops.
    pub tol: f64,
    /// Maximum number of iterations, warm-up included.
    pub max_iter: usize,
    /// Leading iterations that are neither recorded nor checked for convergence.
    pub warmup: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            tol: 1e-5,
            max_iter: 200,
            warmup: 5,
        }
    }
}

impl FitConfig {
    /// Default stopping parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the iteration limit.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the warm-up length.
    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.tol.is_finite() || self.tol < 0.0 {
            return Err(Error::InvalidParameter {
                name: "tol",
                message: "must be finite and >= 0",
            });
        }
        Ok(())
    }
}

/// EM engine for a PLSA-style factorization `M`.
///
/// Tensors are allocated once from the corpus dimensions and updated in
/// place; repeated calls to [`fit`](Self::fit) continue from the current state.
pub struct Plsa<M: Maximize> {
    n_topics: usize,
    /// Empirical joint `P(d, w)`.
    doc_word: Array2<f64>,
    /// `Σ P ln P`, the data's negative entropy.
    negative_entropy: f64,
    /// Responsibilities `q(t|d, w)`, shape `(n_topics, n_docs, n_words)`.
    conditional: Array3<f64>,
    /// Model joint `p̃(t, d, w)` from the last M-step.
    joint: Array3<f64>,
    kl_divergences: Vec<f64>,
    model: M,
    rng: StdRng,
    context: ResultContext,
}

impl<M: Maximize> Plsa<M> {
    /// Build an engine for `corpus` as described by `config`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTopicCount`] unless `2 <= n_topics < min(n_docs, n_words)`.
    /// - [`Error::InvalidParameter`] if the (weighted) corpus carries no mass.
    pub fn new(corpus: &Corpus, config: &EngineConfig) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random::<u64>);
        Self::with_rng(
            corpus,
            config.n_topics,
            config.weighting,
            StdRng::seed_from_u64(seed),
        )
    }

    /// Build an engine that draws its random initialization from `rng`.
    pub fn with_rng(
        corpus: &Corpus,
        n_topics: usize,
        weighting: Weighting,
        rng: StdRng,
    ) -> Result<Self> {
        let (n_docs, n_words) = (corpus.n_docs(), corpus.n_words());
        if n_topics < 2 || n_docs <= n_topics || n_words <= n_topics {
            return Err(Error::InvalidTopicCount {
                requested: n_topics,
                n_docs,
                n_words,
            });
        }

        let doc_word = corpus.doc_word(weighting);
        if doc_word.sum() < EPS {
            return Err(Error::InvalidParameter {
                name: "corpus",
                message: "document-word matrix carries no mass under this weighting",
            });
        }
        let negative_entropy: f64 = doc_word
            .iter()
            .filter(|&&p| p > 0.0)
            .map(|&p| p * p.ln())
            .sum();

        let shape = (n_topics, n_docs, n_words);
        let mut engine = Self {
            n_topics,
            model: M::new(&doc_word, n_topics),
            doc_word,
            negative_entropy,
            conditional: Array3::zeros(shape),
            joint: Array3::zeros(shape),
            kl_divergences: Vec::new(),
            rng,
            context: ResultContext {
                vocabulary: corpus.vocabulary().clone(),
                pipeline: corpus.pipeline().clone(),
                weighting,
                idf: corpus.idf().clone(),
            },
        };
        engine.randomize();
        debug!(
            model = M::NAME,
            n_topics, n_docs, n_words, "initialized EM engine"
        );
        Ok(engine)
    }

    /// Number of topics.
    pub fn n_topics(&self) -> usize {
        self.n_topics
    }

    /// Number of documents.
    pub fn n_docs(&self) -> usize {
        self.doc_word.nrows()
    }

    /// Number of words.
    pub fn n_words(&self) -> usize {
        self.doc_word.ncols()
    }

    /// Weighting of the document-word matrix.
    pub fn weighting(&self) -> Weighting {
        self.context.weighting
    }

    /// Empirical joint `P(d, w)` being fitted.
    pub fn doc_word(&self) -> &Array2<f64> {
        &self.doc_word
    }

    /// Current responsibilities `q(t|d, w)`.
    pub fn conditional(&self) -> &Array3<f64> {
        &self.conditional
    }

    /// Joint `p̃(t, d, w)` from the last M-step.
    pub fn joint(&self) -> &Array3<f64> {
        &self.joint
    }

    /// Divergences recorded so far.
    pub fn kl_divergences(&self) -> &[f64] {
        &self.kl_divergences
    }

    /// Variant factors.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Restart from fresh random responsibilities and an empty history.
    ///
    /// Data, topic count and weighting are kept.
    pub fn randomize(&mut self) {
        let rng = &mut self.rng;
        let raw = Array3::from_shape_simple_fn(self.conditional.raw_dim(), || rng.random::<f64>());
        self.conditional = normalize(raw, Axis(0)).0;
        self.kl_divergences.clear();
    }

    /// Run EM until convergence or until `config.max_iter` iterations have run.
    pub fn fit(&mut self, config: &FitConfig) -> Result<PlsaResult> {
        config.validate()?;

        for iteration in 1..=config.max_iter {
            let kl = self.step();
            if iteration <= config.warmup {
                debug!(iteration, kl, "warm-up iteration");
                continue;
            }
            let change = self.relative_change(kl);
            debug!(iteration, kl, change, "EM iteration");
            if change < config.tol {
                debug!(iteration, change, "converged");
                break;
            }
            self.kl_divergences.push(kl);
        }

        info!(
            model = M::NAME,
            n_topics = self.n_topics,
            recorded = self.kl_divergences.len(),
            kl = self.kl_divergences.last().copied(),
            "fit finished"
        );
        Ok(self.result())
    }

    /// Fit once, then `n_runs` more times from fresh random starts, and keep
    /// the result with the lowest final divergence.
    ///
    /// This performs `n_runs + 1` fits in total: the first one continues from
    /// the engine's current state and serves as the baseline.
    pub fn best_of(&mut self, n_runs: usize, config: &FitConfig) -> Result<PlsaResult> {
        let mut best = self.fit(config)?;
        for run in 1..=n_runs {
            self.randomize();
            let candidate = self.fit(config)?;
            debug!(
                run,
                kl = candidate.kl_divergence(),
                best = best.kl_divergence(),
                "restart finished"
            );
            if candidate.kl_divergence() < best.kl_divergence() {
                best = candidate;
            }
        }
        info!(
            model = M::NAME,
            fits = n_runs + 1,
            kl = best.kl_divergence(),
            "best-of finished"
        );
        Ok(best)
    }

    /// Package the current state without running further iterations.
    pub fn result(&self) -> PlsaResult {
        PlsaResult::new(
            self.model.factors(),
            self.kl_divergences.clone(),
            &self.context,
        )
    }

    /// One M-step + E-step; returns the divergence of the updated model.
    fn step(&mut self) -> f64 {
        self.joint = self.model.maximize(&self.doc_word, &self.conditional);
        let (conditional, marginal) = normalize(self.joint.clone(), Axis(0));
        self.conditional = conditional;

        let likelihood = Zip::from(&self.doc_word)
            .and(&marginal)
            .fold(0.0, |acc, &p, &m| if p > 0.0 { acc + p * m.ln() } else { acc });
        self.negative_entropy - likelihood
    }

    fn relative_change(&self, kl: f64) -> f64 {
        match self.kl_divergences.last() {
            None => f64::INFINITY,
            Some(&old) if old == kl => 0.0,
            Some(&old) => ((kl - old) / kl).abs(),
        }
    }
}

impl<M: Maximize> fmt::Debug for Plsa<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plsa")
            .field("model", &M::NAME)
            .field("n_topics", &self.n_topics)
            .field("n_docs", &self.n_docs())
            .field("n_words", &self.n_words())
            .field("iterations", &self.kl_divergences.len())
            .finish_non_exhaustive()
    }
}

impl<M: Maximize> fmt::Display for Plsa<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", M::NAME)?;
        writeln!(f, "{}", "=".repeat(M::NAME.len() + 1))?;
        writeln!(f, "Number of topics:     {}", self.n_topics)?;
        writeln!(f, "Number of documents:  {}", self.n_docs())?;
        writeln!(f, "Number of words:      {}", self.n_words())?;
        write!(f, "Number of iterations: {}", self.kl_divergences.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use crate::model::{Conditional, Symmetric};

    fn corpus() -> Corpus {
        Corpus::from_documents(
            [
                "rust cargo crate borrow",
                "cargo crate compiler rust",
                "soup bread oven flour",
                "bread flour yeast oven",
                "compiler borrow rust lifetime",
            ],
            Pipeline::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_topic_count_validation() {
        let c = corpus();
        assert!(matches!(
            Plsa::<Symmetric>::new(&c, &EngineConfig::new(1)),
            Err(Error::InvalidTopicCount { requested: 1, .. })
        ));
        // 5 documents: 5 topics is too many.
        assert!(matches!(
            Plsa::<Conditional>::new(&c, &EngineConfig::new(5)),
            Err(Error::InvalidTopicCount { n_docs: 5, .. })
        ));
        assert!(Plsa::<Symmetric>::new(&c, &EngineConfig::new(4)).is_ok());
    }

    #[test]
    fn test_initial_responsibilities_are_normalized() {
        let engine = Plsa::<Symmetric>::new(&corpus(), &EngineConfig::new(3).with_seed(7)).unwrap();
        let sums = engine.conditional().sum_axis(Axis(0));
        assert!(sums.iter().all(|s| (s - 1.0).abs() < 1e-12));
        assert!(engine.kl_divergences().is_empty());
    }

    #[test]
    fn test_history_respects_limits() {
        let c = corpus();
        let mut engine = Plsa::<Symmetric>::new(&c, &EngineConfig::new(2).with_seed(1)).unwrap();
        let r = engine
            .fit(&FitConfig::new().with_tol(0.0).with_max_iter(12).with_warmup(2))
            .unwrap();
        assert!(r.convergence().len() <= 12);
        assert_eq!(r.convergence().len(), 10);

        let mut engine = Plsa::<Symmetric>::new(&c, &EngineConfig::new(2).with_seed(1)).unwrap();
        let r = engine
            .fit(&FitConfig::new().with_max_iter(5).with_warmup(5))
            .unwrap();
        assert!(r.convergence().is_empty());
    }

    #[test]
    fn test_kl_is_non_negative() {
        let mut engine =
            Plsa::<Conditional>::new(&corpus(), &EngineConfig::new(2).with_seed(3)).unwrap();
        let r = engine.fit(&FitConfig::default()).unwrap();
        assert!(!r.convergence().is_empty());
        assert!(r.convergence().iter().all(|&kl| kl > -1e-12));
    }

    #[test]
    fn test_fit_continues_from_current_state() {
        let mut engine =
            Plsa::<Symmetric>::new(&corpus(), &EngineConfig::new(2).with_seed(5)).unwrap();
        let config = FitConfig::new().with_tol(0.0).with_max_iter(4).with_warmup(0);
        engine.fit(&config).unwrap();
        assert_eq!(engine.kl_divergences().len(), 4);
        engine.fit(&config).unwrap();
        assert_eq!(engine.kl_divergences().len(), 8);

        engine.randomize();
        assert!(engine.kl_divergences().is_empty());
    }

    #[test]
    fn test_invalid_tolerance_rejected() {
        let mut engine =
            Plsa::<Symmetric>::new(&corpus(), &EngineConfig::new(2).with_seed(5)).unwrap();
        assert!(engine.fit(&FitConfig::new().with_tol(f64::NAN)).is_err());
        assert!(engine.fit(&FitConfig::new().with_tol(-1.0)).is_err());
    }

    #[test]
    fn test_display_summary() {
        let engine = Plsa::<Conditional>::new(&corpus(), &EngineConfig::new(2).with_seed(5)).unwrap();
        let s = engine.to_string();
        assert!(s.starts_with("ConditionalPLSA:"));
        assert!(s.contains("Number of topics:     2"));
        assert!(s.contains("Number of documents:  5"));
    }
}
