//! Skeleton inference for character meshes.
//!
//! A [`BodyPlan`] lists bone templates, each anchored to fractions of the
//! mesh bounding box. [`infer_skeleton`] resolves the anchors against a
//! mesh and returns a [`Skeleton`] capped at a bone limit.
//!
//! The built-in humanoid has 19 bones in this order: root, three spine
//! bones, head, the left then right arm (shoulder, upper arm, lower arm,
//! hand), and the left then right leg (upper leg, lower leg, foot). A bone
//! limit below 19 drops bones from the end of that list, so the legs go
//! first and the torso last.
//!
//! # Example
//!
//! ```
//! use mesh_types::icosphere;
//! use rig_skeleton::{SkeletonParams, infer_skeleton};
//!
//! let result = infer_skeleton(&icosphere(2), &SkeletonParams::with_bone_limit(12)).unwrap();
//! assert_eq!(result.skeleton.num_bones(), 12);
//! println!("{result}");
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod error;
mod infer;
mod params;
mod result;
mod skeleton;
mod template;

pub use error::{InferenceResult, SkeletonError};
pub use infer::infer_skeleton;
pub use params::SkeletonParams;
pub use result::SkeletonResult;
pub use skeleton::{Bone, Skeleton};
pub use template::{BodyPlan, BoneAnchor, BoneTemplate, VerticalAnchor};
