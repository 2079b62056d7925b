//! Error types for weight painting.

use thiserror::Error;

/// Result type for weight painting.
pub type WeightResult<T> = Result<T, WeightError>;

/// Errors that can occur during weight painting.
#[derive(Debug, Error)]
pub enum WeightError {
    /// The skeleton has no bones to weight against.
    #[error("skeleton has no bones")]
    NoBones,

    /// The distance offset must be positive and finite.
    #[error("invalid epsilon {value}: must be positive and finite")]
    InvalidEpsilon {
        /// Offending value.
        value: f64,
    },
}
