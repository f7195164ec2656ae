//! Error types.
//!
//! [`DfcError`] is what every public entry point returns.  Estimator failures
//! are kept in their own type so the assembler can tell a bad cell (left NaN,
//! run continues) from a bad configuration (nothing computed).
use thiserror::Error;

/// Failure of a single pairwise metric evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    /// The (possibly delay-shifted) segment is too short for the estimator.
    #[error("insufficient samples: need at least {needed}, got {got}")]
    InsufficientSamples { needed: usize, got: usize },

    /// One of the inputs is constant, so the correlation is undefined.
    #[error("zero variance in input segment")]
    ZeroVariance,

    /// NaN or ±inf in an input segment.
    #[error("non-finite sample in input segment")]
    NonFinite,

    /// `n_symbols^symbolic_length` distinct words do not fit in a `usize` key.
    #[error("word alphabet too large: {n_symbols}^{symbolic_length} overflows")]
    WordOverflow { n_symbols: usize, symbolic_length: usize },

    /// The two segments differ in length.
    #[error("segment length mismatch: {0} vs {1}")]
    LengthMismatch(usize, usize),
}

/// Errors surfaced by the connectivity engine and its collaborators.
#[derive(Debug, Error)]
pub enum DfcError {
    /// Rejected before any computation starts.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("estimator failure: {0}")]
    Estimator(#[from] EstimatorError),

    /// The band-pass filter collaborator failed.
    #[error("filter failure: {0}")]
    Filter(String),

    /// Frame or video generation failed.  The connectome itself is unaffected.
    #[error("render failure: {0}")]
    Render(String),

    #[error("computation cancelled")]
    Cancelled,
}

impl DfcError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        DfcError::InvalidConfiguration(msg.into())
    }
}

pub type Result<T, E = DfcError> = std::result::Result<T, E>;
