//! Error types for smoothing.

use thiserror::Error;

/// Result type for smoothing operations.
///
/// Named apart from [`SmoothResult`](crate::SmoothResult), which is the
/// output of a successful run.
pub type SmoothingResult<T> = Result<T, SmoothError>;

/// Errors that can occur during smoothing.
#[derive(Debug, Error)]
pub enum SmoothError {
    /// A smoothing factor is out of range.
    #[error("invalid smoothing parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
        /// The constraint it breaks.
        reason: &'static str,
    },
}
