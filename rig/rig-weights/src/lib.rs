//! Skinning weights for inferred skeletons.
//!
//! Each vertex is weighted against every bone by inverse distance and the
//! row is normalized to sum to 1. The distance is measured either to the
//! bone's rest position or to the segment from its parent, and can be
//! restricted to the strongest few bones for GPU skinning.
//!
//! # Example
//!
//! ```
//! use mesh_types::icosphere;
//! use rig_skeleton::{SkeletonParams, infer_skeleton};
//! use rig_weights::{WeightParams, paint_weights};
//!
//! let mesh = icosphere(2);
//! let skeleton = infer_skeleton(&mesh, &SkeletonParams::default()).unwrap().skeleton;
//! let weights = paint_weights(&mesh, &skeleton, &WeightParams::game_ready()).unwrap();
//! assert!(weights.influences(0).len() <= 4);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod error;
mod matrix;
mod paint;
mod params;

pub use error::{WeightError, WeightResult};
pub use matrix::{BoneWeight, WeightMatrix};
pub use paint::paint_weights;
pub use params::{InfluenceMetric, WeightParams};
