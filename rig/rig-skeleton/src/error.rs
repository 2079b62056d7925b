//! Error types for skeleton inference.

use thiserror::Error;

/// Result type for skeleton operations.
///
/// Named apart from [`SkeletonResult`](crate::SkeletonResult), which is the
/// output of a successful inference.
pub type InferenceResult<T> = Result<T, SkeletonError>;

/// Errors that can occur while building a skeleton.
#[derive(Debug, Error)]
pub enum SkeletonError {
    /// Mesh has no vertices to measure.
    #[error("mesh is empty")]
    EmptyMesh,

    /// A skeleton needs room for at least its root.
    #[error("bone limit must be at least 1")]
    InvalidBoneLimit,

    /// A custom body plan is malformed.
    #[error("invalid bone template: {reason}")]
    InvalidTemplate {
        /// What is wrong with it.
        reason: String,
    },

    /// A bone list breaks the hierarchy rules.
    #[error("invalid hierarchy at bone {index}: {reason}")]
    InvalidHierarchy {
        /// Offending bone.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },
}
