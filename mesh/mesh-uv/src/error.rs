//! Error types for UV parameterization.

use mesh_repair::RepairError;
use thiserror::Error;

/// Result type for UV operations.
pub type UvResult<T> = Result<T, UvError>;

/// Errors that can occur during UV parameterization.
#[derive(Debug, Error)]
pub enum UvError {
    /// The atlas backend cannot run. Recovered by the spherical fallback.
    #[error("chart atlas '{backend}' unavailable: {reason}")]
    Unavailable {
        /// Backend name.
        backend: String,
        /// Why it could not run.
        reason: String,
    },

    /// Mesh has no vertices.
    #[error("mesh is empty")]
    EmptyMesh,

    /// Parameters are out of range.
    #[error("invalid atlas parameter {name}: {reason}")]
    InvalidParams {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// An atlas backend returned vertices without UVs.
    #[error("atlas output has {missing} vertices without UVs")]
    IncompleteAtlas {
        /// Vertices missing a UV.
        missing: usize,
    },

    /// A face references a missing vertex.
    #[error(transparent)]
    Repair(#[from] RepairError),
}
