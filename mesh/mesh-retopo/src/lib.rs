//! Face-budget retopology.
//!
//! Takes a watertight mesh to a target face count and leaves it with clean,
//! consistently oriented topology:
//!
//! - **Subdivision**: meshes short of the budget are split 1-to-4 at edge
//!   midpoints
//! - **Decimation**: meshes over the budget are reduced by quadric error
//!   metric edge collapse, always taking the globally cheapest valid edge
//! - **Clean-up**: welding, degenerate and duplicate face removal, winding
//!   repair and vertex normals
//!
//! # Example
//!
//! ```
//! use mesh_retopo::{RetopoParams, retopologize};
//! use mesh_types::icosphere;
//!
//! let sphere = icosphere(1);
//! let result = retopologize(&sphere, &RetopoParams::for_target(20)).unwrap();
//! assert!(result.final_faces <= 21);
//! assert!(result.warning.is_none());
//! ```
//!
//! # Collapse validity
//!
//! An edge collapse is skipped when the endpoints share a neighbor that is
//! not opposite the edge (link condition), when an opposite vertex has
//! valence 3, or when a neighboring face would flip or vanish at every
//! candidate placement (quadric optimum, midpoint, either endpoint).

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod decimate;
mod error;
mod params;
mod quadric;
mod result;
mod retopo;
mod subdivide;

pub use decimate::{Decimation, decimate_to};
pub use error::{RetopoError, RetopologyResult};
pub use params::RetopoParams;
pub use quadric::Quadric;
pub use result::{RetopoResult, ToleranceWarning};
pub use retopo::retopologize;
pub use subdivide::subdivide_midpoint;
