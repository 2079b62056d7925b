//! Mesh clean-up and auto-rigging for generated game assets.
//!
//! Raw scans and generated meshes arrive with holes, self-intersections and
//! wildly uneven triangle counts. Clean-up runs four stages in order:
//!
//! 1. Voxel resampling to a closed, manifold surface
//! 2. Retopology to a face budget
//! 3. Taubin smoothing
//! 4. UV parameterization, through the built-in planar chart atlas or a
//!    spherical projection when no atlas is available
//!
//! Characters are then rigged: a humanoid skeleton is fitted to the mesh
//! bounds and every vertex is skinned by inverse distance.
//!
//! [`lod`], [`collision`] and [`platform`] derive game-ready variants from a
//! refined mesh.
//!
//! # Example
//!
//! ```
//! use asset_pipeline::{AssetPipeline, PipelineConfig, rig_character};
//! use mesh_types::icosphere;
//!
//! let refined = AssetPipeline::new(PipelineConfig::preview().with_target_faces(400))
//!     .cleanup(&icosphere(2))
//!     .unwrap();
//! let rig = rig_character(&refined, 19).unwrap();
//!
//! assert_eq!(rig.skeleton.num_bones(), 19);
//! assert_eq!(rig.weights.vertex_count(), refined.mesh.vertices.len());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

pub mod collision;
mod config;
mod error;
mod hull;
pub mod lod;
mod pipeline;
pub mod platform;
mod stage;

pub use config::{AssetClass, PipelineConfig};
pub use error::{PipelineError, PipelineResult, StageError};
pub use pipeline::{AssetPipeline, ProcessedAsset, RefinedMesh, Rig, cleanup_mesh, rig_character};
pub use stage::{CancelToken, Stage, StageEvent};
