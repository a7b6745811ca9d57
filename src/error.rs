//! Error types raised by the search pipeline.
//!
//! Public operations return `anyhow::Result`; every error the crate raises itself is a
//! [`SearchError`] so callers can recover it with `downcast_ref::<SearchError>()`.

use thiserror::Error;

/// Errors raised while configuring or running a search
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// Word size exceeds what the 2-bit packed perfect hash can address
    #[error("word size {word_size} exceeds the maximum of {max}")]
    WordSizeTooLarge { word_size: usize, max: usize },

    #[error("word size must be at least 1")]
    InvalidWordSize,

    /// Sequence ids are stored as 16-bit integers
    #[error("database holds {count} sequences, at most {max} are supported")]
    TooManySequences { count: usize, max: usize },

    /// Dynamic programming was handed a zero-length sequence
    #[error("zero-length {which} sequence passed to dynamic programming")]
    EmptySequence { which: &'static str },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("invalid scoring matrix: {message}")]
    InvalidMatrix { message: String },

    /// Traceback could not reproduce the forward recurrence
    #[error("unrecognized traceback state {state} at cell ({row}, {col})")]
    TracebackInvariant {
        row: usize,
        col: usize,
        state: &'static str,
    },

    #[error("seed clustering invariant violated: {message}")]
    ClusterInvariant { message: String },
}

impl SearchError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn matrix(message: impl Into<String>) -> Self {
        Self::InvalidMatrix {
            message: message.into(),
        }
    }

    pub fn cluster(message: impl Into<String>) -> Self {
        Self::ClusterInvariant {
            message: message.into(),
        }
    }

    /// True for errors caused by caller-supplied parameters
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::WordSizeTooLarge { .. }
                | Self::InvalidWordSize
                | Self::TooManySequences { .. }
                | Self::EmptySequence { .. }
                | Self::InvalidConfig { .. }
                | Self::InvalidMatrix { .. }
        )
    }
}
