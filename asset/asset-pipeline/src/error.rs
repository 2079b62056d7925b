//! Pipeline error types.

use mesh_retopo::RetopoError;
use mesh_smooth::SmoothError;
use mesh_uv::UvError;
use mesh_voxel::VoxelError;
use rig_skeleton::SkeletonError;
use rig_weights::WeightError;
use thiserror::Error;

use crate::stage::Stage;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// The underlying failure of a stage.
#[derive(Debug, Error)]
pub enum StageError {
    /// Voxel resampling failed.
    #[error(transparent)]
    Voxel(#[from] VoxelError),

    /// Retopology failed.
    #[error(transparent)]
    Retopo(#[from] RetopoError),

    /// Smoothing failed.
    #[error(transparent)]
    Smooth(#[from] SmoothError),

    /// Parameterization failed.
    #[error(transparent)]
    Uv(#[from] UvError),

    /// Skeleton inference failed.
    #[error(transparent)]
    Skeleton(#[from] SkeletonError),

    /// Weight painting failed.
    #[error(transparent)]
    Weights(#[from] WeightError),

    /// A post-processing step was handed a mesh with no faces.
    #[error("mesh has no faces")]
    EmptyMesh,
}

/// Errors that abort a pipeline run.
///
/// No partial mesh is returned with any of these.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage could not process its input mesh.
    #[error("{stage} failed on a mesh with {vertex_count} vertices and {face_count} faces: {reason}")]
    Geometry {
        /// Failing stage.
        stage: Stage,
        /// Vertices in the stage's input.
        vertex_count: usize,
        /// Faces in the stage's input.
        face_count: usize,
        /// What went wrong.
        #[source]
        reason: StageError,
    },

    /// The cancel token was set.
    #[error("cancelled before {before}")]
    Cancelled {
        /// First stage that did not run.
        before: Stage,
    },

    /// A stage's parameters are out of range.
    #[error("invalid {stage} configuration: {reason}")]
    InvalidConfig {
        /// Stage the parameters belong to.
        stage: Stage,
        /// What is wrong with them.
        reason: String,
    },
}

impl PipelineError {
    /// Stage the error is attributed to.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Geometry { stage, .. } | Self::InvalidConfig { stage, .. } => *stage,
            Self::Cancelled { before } => *before,
        }
    }

    pub(crate) fn geometry(
        stage: Stage,
        mesh: &mesh_types::IndexedMesh,
        reason: impl Into<StageError>,
    ) -> Self {
        Self::Geometry {
            stage,
            vertex_count: mesh.vertices.len(),
            face_count: mesh.faces.len(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config(stage: Stage, reason: &impl std::fmt::Display) -> Self {
        Self::InvalidConfig {
            stage,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::unit_cube;

    #[test]
    fn geometry_error_names_stage_and_size() {
        let err = PipelineError::geometry(Stage::Resample, &unit_cube(), VoxelError::EmptyMesh);
        assert_eq!(err.stage(), Stage::Resample);
        assert_eq!(
            err.to_string(),
            "resample failed on a mesh with 8 vertices and 12 faces: mesh is empty"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn cancelled_display() {
        let err = PipelineError::Cancelled {
            before: Stage::Smoothing,
        };
        assert_eq!(err.to_string(), "cancelled before smoothing");
    }
}
