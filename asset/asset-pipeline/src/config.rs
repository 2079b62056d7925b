//! Pipeline configuration.

use mesh_retopo::RetopoParams;
use mesh_smooth::SmoothParams;
use mesh_uv::AtlasParams;
use mesh_voxel::VoxelParams;
use rig_skeleton::SkeletonParams;
use rig_weights::WeightParams;

use crate::error::{PipelineError, PipelineResult};
use crate::stage::Stage;

/// What kind of asset is being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AssetClass {
    /// Rigged: clean-up, then skeleton and weights.
    Character,
    /// Static: clean-up only.
    #[default]
    Prop,
}

impl AssetClass {
    /// True if this class gets a skeleton.
    #[must_use]
    pub const fn is_rigged(self) -> bool {
        matches!(self, Self::Character)
    }
}

/// Parameters for every stage.
///
/// # Example
///
/// ```
/// use asset_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::preview().with_target_faces(500).with_bone_limit(12);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.retopo.target_faces, 500);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineConfig {
    /// Voxel resampling.
    pub voxel: VoxelParams,
    /// Retopology.
    pub retopo: RetopoParams,
    /// Smoothing.
    pub smooth: SmoothParams,
    /// Built-in chart atlas.
    pub uv: AtlasParams,
    /// Skeleton inference.
    pub skeleton: SkeletonParams,
    /// Weight painting.
    pub weights: WeightParams,
}

impl PipelineConfig {
    /// Coarse grid and a small face budget for fast iteration.
    #[must_use]
    pub fn preview() -> Self {
        Self {
            voxel: VoxelParams::preview(),
            retopo: RetopoParams::for_target(1000),
            smooth: SmoothParams::gentle(),
            uv: AtlasParams::preview(),
            ..Self::default()
        }
    }

    /// Fine grid, stronger smoothing and GPU-friendly weights.
    #[must_use]
    pub fn high_quality() -> Self {
        Self {
            voxel: VoxelParams::high_quality(),
            retopo: RetopoParams::for_target(20_000),
            smooth: SmoothParams::default(),
            uv: AtlasParams::high_quality(),
            skeleton: SkeletonParams::default(),
            weights: WeightParams::game_ready(),
        }
    }

    /// Set the retopology face budget.
    #[must_use]
    pub fn with_target_faces(mut self, target_faces: usize) -> Self {
        self.retopo.target_faces = target_faces;
        self
    }

    /// Set the skeleton bone limit.
    #[must_use]
    pub fn with_bone_limit(mut self, bone_limit: usize) -> Self {
        self.skeleton.bone_limit = bone_limit;
        self
    }

    /// Validate the clean-up stage parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for the first stage whose
    /// parameters are out of range.
    pub fn validate_cleanup(&self) -> PipelineResult<()> {
        self.voxel
            .validate()
            .map_err(|e| PipelineError::config(Stage::Resample, &e))?;
        self.retopo
            .validate()
            .map_err(|e| PipelineError::config(Stage::Retopology, &e))?;
        self.smooth
            .validate()
            .map_err(|e| PipelineError::config(Stage::Smoothing, &e))?;
        self.uv
            .validate()
            .map_err(|e| PipelineError::config(Stage::Parameterization, &e))
    }

    /// Validate the rigging stage parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for the first stage whose
    /// parameters are out of range.
    pub fn validate_rig(&self) -> PipelineResult<()> {
        self.skeleton
            .validate()
            .map_err(|e| PipelineError::config(Stage::Skeleton, &e))?;
        self.weights
            .validate()
            .map_err(|e| PipelineError::config(Stage::Weights, &e))
    }

    /// Validate every stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for the first stage whose
    /// parameters are out of range.
    pub fn validate(&self) -> PipelineResult<()> {
        self.validate_cleanup()?;
        self.validate_rig()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
        assert!(PipelineConfig::preview().validate().is_ok());
        assert!(PipelineConfig::high_quality().validate().is_ok());
        assert_eq!(PipelineConfig::default().retopo.target_faces, 8000);
        assert_eq!(PipelineConfig::default().skeleton.bone_limit, 30);
    }

    #[test]
    fn bad_stage_is_named() {
        let err = PipelineConfig::default().with_target_faces(2).validate().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidConfig {
                stage: Stage::Retopology,
                ..
            }
        ));

        let err = PipelineConfig::default().with_bone_limit(0).validate().unwrap_err();
        assert_eq!(err.stage(), Stage::Skeleton);

        let mut config = PipelineConfig::default();
        config.uv = config.uv.with_gutter(0.5);
        assert_eq!(config.validate_cleanup().unwrap_err().stage(), Stage::Parameterization);
    }

    #[test]
    fn only_characters_are_rigged() {
        assert!(AssetClass::Character.is_rigged());
        assert!(!AssetClass::Prop.is_rigged());
    }
}
