//! Voxel resampling of arbitrary triangle soups.
//!
//! Raw reconstruction output is often open, self-intersecting or
//! non-manifold. This crate rebuilds such a mesh as the boundary of a solid
//! occupancy region, which is always a closed two-manifold.
//!
//! # Algorithm
//!
//! 1. Scan convert: three-axis ray parity marks interior samples; the
//!    surface is rasterized on top so open shells still produce occupancy
//! 2. Morphological closing bridges gaps up to `closing_radius` samples
//! 3. Empty samples not reachable from the grid border are filled
//! 4. Marching tetrahedra extracts the solid boundary with one vertex per
//!    crossed grid edge
//! 5. Leftover boundary loops, if any, are fan sealed and the result is
//!    checked for watertightness
//!
//! # Example
//!
//! ```
//! use mesh_types::icosphere;
//! use mesh_voxel::{VoxelParams, resample_to_watertight};
//!
//! let sphere = icosphere(2);
//! let result = resample_to_watertight(&sphere, &VoxelParams::preview()).unwrap();
//! println!("{result}");
//! assert!(result.mesh.signed_volume() > 0.0);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod error;
mod grid;
mod marching_tets;
mod morphology;
mod params;
mod resample;
mod result;
mod voxelize;

pub use error::{VoxelError, VoxelResult};
pub use grid::OccupancyGrid;
pub use marching_tets::extract_surface;
pub use params::VoxelParams;
pub use resample::resample_to_watertight;
pub use result::ResampleResult;
