//! Skeleton inference parameters.

use crate::error::{InferenceResult, SkeletonError};
use crate::template::BodyPlan;

/// Configuration for [`infer_skeleton`](crate::infer_skeleton).
///
/// # Example
///
/// ```
/// use rig_skeleton::SkeletonParams;
///
/// let params = SkeletonParams::with_bone_limit(12);
/// assert!(params.validate().is_ok());
/// assert!(SkeletonParams::with_bone_limit(0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkeletonParams {
    /// Most bones the skeleton may have. Bones past the limit are dropped
    /// from the end of the plan.
    /// Default: 30
    pub bone_limit: usize,

    /// Anatomy to fit.
    /// Default: [`BodyPlan::Humanoid`]
    pub body_plan: BodyPlan,
}

impl Default for SkeletonParams {
    fn default() -> Self {
        Self {
            bone_limit: 30,
            body_plan: BodyPlan::Humanoid,
        }
    }
}

impl SkeletonParams {
    /// Humanoid plan with the given bone limit.
    #[must_use]
    pub fn with_bone_limit(bone_limit: usize) -> Self {
        Self {
            bone_limit,
            ..Self::default()
        }
    }

    /// Set the body plan.
    #[must_use]
    pub fn with_body_plan(mut self, body_plan: BodyPlan) -> Self {
        self.body_plan = body_plan;
        self
    }

    /// Check the bone limit and the body plan.
    ///
    /// # Errors
    ///
    /// - [`SkeletonError::InvalidBoneLimit`] if the limit is 0
    /// - [`SkeletonError::InvalidTemplate`] if a custom plan is malformed
    pub fn validate(&self) -> InferenceResult<()> {
        if self.bone_limit == 0 {
            return Err(SkeletonError::InvalidBoneLimit);
        }
        self.body_plan.validate()
    }
}
