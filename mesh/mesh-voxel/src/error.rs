//! Error types for voxel resampling.

use mesh_repair::RepairError;
use thiserror::Error;

/// Result type for voxel resampling.
pub type VoxelResult<T> = Result<T, VoxelError>;

/// Errors that can occur while resampling a mesh through a voxel grid.
#[derive(Debug, Error)]
pub enum VoxelError {
    /// Mesh has no faces.
    #[error("mesh is empty")]
    EmptyMesh,

    /// Bounding box has zero (or non-finite) volume.
    #[error("mesh bounding box has zero volume (extent {width} x {depth} x {height})")]
    ZeroVolume {
        /// Extent along X.
        width: f64,
        /// Extent along Y.
        depth: f64,
        /// Extent along Z.
        height: f64,
    },

    /// Parameters are out of range.
    #[error("invalid voxel parameter {name}: {reason}")]
    InvalidParams {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The requested pitch would allocate too many cells.
    #[error("voxel grid of {cells} cells exceeds the limit of {limit}")]
    GridTooLarge {
        /// Cells the grid would need.
        cells: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// Occupancy came out empty.
    #[error("no solid voxels after scan conversion")]
    NoSolidVoxels,

    /// Extraction left open boundary edges.
    #[error("resampled surface is not watertight ({boundary_edges} boundary edges)")]
    NotWatertight {
        /// Remaining boundary edges.
        boundary_edges: usize,
    },

    /// Input indices or boundary sealing failed.
    #[error(transparent)]
    Repair(#[from] RepairError),
}
