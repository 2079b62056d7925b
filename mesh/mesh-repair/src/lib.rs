//! Mesh repair operations shared by the resampling and retopology stages.
//!
//! This crate provides:
//! - Edge/vertex adjacency and manifold checks
//! - Mesh validation reports
//! - Vertex welding, degenerate/duplicate face removal, unreferenced vertex removal
//! - Boundary loop detection and fan sealing
//! - Per-component winding repair and outward orientation
//!
//! # Example
//!
//! ```
//! use mesh_repair::{RepairParams, repair_mesh, validate_mesh};
//! use mesh_types::unit_cube;
//!
//! let mut mesh = unit_cube();
//! mesh.faces.push([0, 2, 1]); // duplicate
//!
//! let summary = repair_mesh(&mut mesh, &RepairParams::default());
//! assert_eq!(summary.duplicates_removed, 1);
//!
//! let report = validate_mesh(&mesh);
//! assert!(report.is_watertight);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod adjacency;
mod error;
pub mod holes;
mod repair;
mod validate;
pub mod winding;

pub use adjacency::{MeshAdjacency, normalize_edge};
pub use error::{RepairError, RepairResult};
pub use holes::{BoundaryLoop, SealSummary, detect_holes, seal_boundary_loops};
pub use repair::{
    RepairParams, RepairSummary, remove_degenerate_triangles, remove_duplicate_faces,
    remove_unreferenced_vertices, repair_mesh, weld_vertices,
};
pub use validate::{MeshReport, check_indices, validate_mesh};
pub use winding::{
    WindingSummary, count_inconsistent_edges, fix_winding_order, has_consistent_winding,
};
