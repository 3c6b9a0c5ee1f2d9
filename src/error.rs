use core::fmt;

/// Result alias for `plsa`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by corpus construction, model fitting and prediction.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input was empty.
    EmptyInput,

    /// Matrix dimension mismatch.
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Topic count is incompatible with the corpus.
    ///
    /// Requires `2 <= requested < min(n_docs, n_words)`.
    InvalidTopicCount {
        /// Requested number of topics.
        requested: usize,
        /// Number of documents in the corpus.
        n_docs: usize,
        /// Number of distinct words in the corpus.
        n_words: usize,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// `predict` was called on a result that carries no `p(t|w)`.
    PredictionUnsupported,

    /// Generic error with message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::InvalidTopicCount {
                requested,
                n_docs,
                n_words,
            } => write!(
                f,
                "cannot fit {requested} topics: need at least 2 topics and fewer topics \
                 than documents ({n_docs}) and words ({n_words})"
            ),
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
            Error::PredictionUnsupported => write!(
                f,
                "prediction requires the topic-given-word conditional, \
                 which only the conditional model provides"
            ),
            Error::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}
