//! # Generation Error Types

use thiserror::Error;

/// Errors that can occur while generating decoration geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProceduralError {
    /// Rejection sampling ran out of attempts before filling the request.
    #[error("shell sampling exhausted: placed {placed} of {requested} points in {attempts} attempts")]
    SamplingExhausted {
        /// Points requested.
        requested: usize,
        /// Points accepted before the budget ran out.
        placed: usize,
        /// Attempts made.
        attempts: u64,
    },

    /// A generator parameter is outside the range it can work with.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type for generation.
pub type ProceduralResult<T> = Result<T, ProceduralError>;
