//! Error types for retopology.

use mesh_repair::RepairError;
use thiserror::Error;

/// Result type for retopology operations.
///
/// Named apart from [`RetopoResult`](crate::RetopoResult), which is the
/// output of a successful run.
pub type RetopologyResult<T> = Result<T, RetopoError>;

/// Errors that can occur during retopology.
#[derive(Debug, Error)]
pub enum RetopoError {
    /// Mesh has no faces.
    #[error("mesh is empty")]
    EmptyMesh,

    /// Parameters are out of range.
    #[error("invalid retopology parameter {name}: {reason}")]
    InvalidParams {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A face references a missing vertex.
    #[error(transparent)]
    Repair(#[from] RepairError),
}
