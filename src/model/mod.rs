//! Probabilistic latent semantic analysis fitted by EM.
//!
//! PLSA explains the document-word joint `P(d, w)` through a small number of
//! latent topics. Two factorizations share one EM loop ([`Plsa`]) and differ
//! only in their M-step ([`Maximize`]):
//!
//! | Variant | Factorization | `predict` |
//! |---------|---------------|-----------|
//! | [`Symmetric`] | `P(d, w) ≈ Σₜ p̃(d|t) p̃(w|t) p̃(t)` | no |
//! | [`Conditional`] | `P(d|w) ≈ Σₜ p̃(d|t) p̃(t|w)` | yes |
//!
//! ## Usage
//!
//! ```rust
//! use plsa::{ConditionalPlsa, Corpus, EngineConfig, FitConfig, Pipeline};
//!
//! let corpus = Corpus::from_documents(
//!     [
//!         "rust cargo borrow checker",
//!         "cargo crate rust compiler",
//!         "bread flour oven yeast",
//!         "oven bread flour dough",
//!     ],
//!     Pipeline::new(),
//! )
//! .unwrap();
//!
//! let mut engine = ConditionalPlsa::new(&corpus, &EngineConfig::new(2).with_seed(42)).unwrap();
//! let result = engine.fit(&FitConfig::default()).unwrap();
//!
//! assert_eq!(result.n_topics(), 2);
//! assert!(result.topic()[0] >= result.topic()[1]);
//! let prediction = result.predict("rust compiler pizza").unwrap();
//! assert_eq!(prediction.n_unknown_words, 1);
//! ```

mod conditional;
mod engine;
mod result;
mod symmetric;
mod traits;

pub use conditional::Conditional;
pub use engine::{EngineConfig, FitConfig, Plsa};
pub use result::{PlsaResult, Prediction};
pub use symmetric::Symmetric;
pub use traits::{Factors, Maximize};

/// EM engine for the symmetric factorization.
pub type SymmetricPlsa = Plsa<Symmetric>;

/// EM engine for the conditional factorization.
pub type ConditionalPlsa = Plsa<Conditional>;
