//! # plsa
//!
//! Topic models over document-word statistics, fitted by Expectation-Maximization.
//!
//! A [`Corpus`] turns documents into a document-word joint `P(d, w)`; an EM
//! engine ([`SymmetricPlsa`] or [`ConditionalPlsa`]) factorizes it through a
//! handful of latent topics; the [`PlsaResult`] orders the topics, labels their
//! words and, for the conditional model, projects unseen documents.
//!
//! Fitting is single-threaded and deterministic for a given seed. Independent
//! engines share no state, so grid searches can run them on separate threads.

pub mod corpus;
/// Error types used across `plsa`.
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod model;
pub mod vocabulary;


pub use corpus::{Corpus, Weighting};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, Preprocess};
pub use model::{
    Conditional, ConditionalPlsa, EngineConfig, Factors, FitConfig, Maximize, Plsa, PlsaResult,
    Prediction, Symmetric, SymmetricPlsa,
};
pub use vocabulary::Vocabulary;
