//! Error types for mesh repair operations.

use thiserror::Error;

/// Result type for repair operations.
pub type RepairResult<T> = Result<T, RepairError>;

/// Errors that can occur during mesh repair.
#[derive(Debug, Error)]
pub enum RepairError {
    /// Mesh is empty (no vertices or faces).
    #[error("mesh is empty")]
    EmptyMesh,

    /// A face references a vertex that does not exist.
    #[error("invalid vertex index {index} in face {face} (mesh has {vertex_count} vertices)")]
    InvalidIndex {
        /// Face holding the bad index.
        face: usize,
        /// The invalid index.
        index: u32,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A boundary could not be traced into closed loops.
    #[error("failed to seal boundary: {reason}")]
    SealFailed {
        /// Reason for failure.
        reason: String,
    },
}
