//! Stage orchestration.

use std::fmt;

use mesh_repair::{MeshReport, validate_mesh};
use mesh_retopo::{ToleranceWarning, retopologize};
use mesh_smooth::smooth_taubin;
use mesh_types::IndexedMesh;
use mesh_uv::{ChartAtlas, PlanarChartAtlas, UvMethod, parameterize};
use mesh_voxel::resample_to_watertight;
use rig_skeleton::{Skeleton, infer_skeleton};
use rig_weights::{WeightMatrix, paint_weights};
use tracing::{debug, info};

use crate::config::{AssetClass, PipelineConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::stage::{CancelToken, Stage, StageEvent};

/// A cleaned, budgeted, UV-mapped mesh.
#[derive(Debug, Clone)]
pub struct RefinedMesh {
    /// The final mesh. Vertices on atlas seams are duplicated.
    pub mesh: IndexedMesh,
    /// How the UVs were produced.
    pub uv_method: UvMethod,
    /// Non-fatal budget misses.
    pub warnings: Vec<ToleranceWarning>,
    /// Validation of the smoothed surface, before seams were cut.
    pub stats: MeshReport,
}

impl fmt::Display for RefinedMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Refined mesh: {} vertices, {} faces, UVs from {}",
            self.mesh.vertices.len(),
            self.mesh.faces.len(),
            self.uv_method
        )?;
        for warning in &self.warnings {
            write!(f, "; warning: {warning}")?;
        }
        Ok(())
    }
}

/// A skeleton and its skinning weights.
#[derive(Debug, Clone)]
pub struct Rig {
    /// The fitted skeleton.
    pub skeleton: Skeleton,
    /// One row per vertex of the rigged mesh, one column per bone.
    pub weights: WeightMatrix,
    /// Plan bones cut by the bone limit.
    pub dropped_bones: Vec<String>,
}

/// Output of [`AssetPipeline::process`].
#[derive(Debug, Clone)]
pub struct ProcessedAsset {
    /// The cleaned mesh.
    pub refined: RefinedMesh,
    /// Present for characters.
    pub rig: Option<Rig>,
}

/// Progress hooks shared by every stage.
#[derive(Default)]
struct Hooks<'a> {
    progress: Option<Box<dyn FnMut(StageEvent) + 'a>>,
    cancel: Option<CancelToken>,
}

impl Hooks<'_> {
    fn emit(&mut self, event: StageEvent) {
        if let Some(progress) = self.progress.as_mut() {
            progress(event);
        }
    }

    /// Run one stage between progress events, honoring cancellation.
    fn run<T>(
        &mut self,
        stage: Stage,
        body: impl FnOnce() -> PipelineResult<T>,
    ) -> PipelineResult<T> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            info!(%stage, "Pipeline cancelled");
            return Err(PipelineError::Cancelled { before: stage });
        }
        self.emit(StageEvent::Started(stage));
        let output = body()?;
        self.emit(StageEvent::Finished(stage));
        Ok(output)
    }
}

/// Where UVs come from.
#[derive(Clone, Copy)]
enum AtlasBackend<'a> {
    /// [`PlanarChartAtlas`] built from [`PipelineConfig::uv`].
    BuiltIn,
    /// Caller-supplied backend.
    Caller(&'a dyn ChartAtlas),
    /// Spherical projection only.
    Disabled,
}

/// Configurable pipeline with an atlas backend, progress sink and cancel
/// token.
///
/// UVs come from the built-in [`PlanarChartAtlas`] unless another backend
/// is supplied or the atlas is disabled. A backend that reports itself
/// unavailable falls back to spherical projection.
///
/// Stages run strictly in sequence. The first failure aborts the run and
/// no partial output is returned.
///
/// # Example
///
/// ```
/// use asset_pipeline::{AssetClass, AssetPipeline, PipelineConfig, StageEvent};
/// use mesh_types::icosphere;
/// use mesh_uv::{AtlasParams, PlanarChartAtlas};
///
/// let atlas = PlanarChartAtlas::new(AtlasParams::high_quality());
/// let mut events = Vec::new();
/// let asset = AssetPipeline::new(PipelineConfig::preview().with_target_faces(300))
///     .with_atlas(&atlas)
///     .on_progress(|e| events.push(e))
///     .process(&icosphere(2), AssetClass::Character)
///     .unwrap();
///
/// assert!(asset.rig.is_some());
/// ```
pub struct AssetPipeline<'a> {
    config: PipelineConfig,
    atlas: AtlasBackend<'a>,
    hooks: Hooks<'a>,
}

impl<'a> AssetPipeline<'a> {
    /// Pipeline with the built-in atlas and no progress sink or cancel
    /// token.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            atlas: AtlasBackend::BuiltIn,
            hooks: Hooks::default(),
        }
    }

    /// Use another chart atlas backend for UVs.
    #[must_use]
    pub fn with_atlas(mut self, atlas: &'a dyn ChartAtlas) -> Self {
        self.atlas = AtlasBackend::Caller(atlas);
        self
    }

    /// Skip chart generation and always use spherical projection.
    #[must_use]
    pub fn without_atlas(mut self) -> Self {
        self.atlas = AtlasBackend::Disabled;
        self
    }

    /// Receive an event before and after each stage.
    #[must_use]
    pub fn on_progress(mut self, progress: impl FnMut(StageEvent) + 'a) -> Self {
        self.hooks.progress = Some(Box::new(progress));
        self
    }

    /// Stop before the next stage once the token is cancelled.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.hooks.cancel = Some(cancel);
        self
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Resample, retopologize, smooth and parameterize a raw mesh.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InvalidConfig`] if a clean-up stage's parameters
    ///   are out of range
    /// - [`PipelineError::Geometry`] if a stage rejects its input
    /// - [`PipelineError::Cancelled`] if the token was set
    pub fn cleanup(&mut self, raw: &IndexedMesh) -> PipelineResult<RefinedMesh> {
        self.config.validate_cleanup()?;
        let config = &self.config;
        let built_in = PlanarChartAtlas::new(config.uv);
        let atlas: Option<&dyn ChartAtlas> = match self.atlas {
            AtlasBackend::BuiltIn => Some(&built_in),
            AtlasBackend::Caller(atlas) => Some(atlas),
            AtlasBackend::Disabled => None,
        };
        let hooks = &mut self.hooks;

        info!(
            vertices = raw.vertices.len(),
            faces = raw.faces.len(),
            target_faces = config.retopo.target_faces,
            "Starting mesh clean-up"
        );

        let resampled = hooks.run(Stage::Resample, || {
            resample_to_watertight(raw, &config.voxel)
                .map_err(|e| PipelineError::geometry(Stage::Resample, raw, e))
        })?;
        debug!("{resampled}");

        let retopo = hooks.run(Stage::Retopology, || {
            retopologize(&resampled.mesh, &config.retopo)
                .map_err(|e| PipelineError::geometry(Stage::Retopology, &resampled.mesh, e))
        })?;
        debug!("{retopo}");
        let warnings: Vec<ToleranceWarning> = retopo.warning.into_iter().collect();

        let smoothed = hooks.run(Stage::Smoothing, || {
            smooth_taubin(&retopo.mesh, &config.smooth)
                .map_err(|e| PipelineError::geometry(Stage::Smoothing, &retopo.mesh, e))
        })?;
        debug!("{smoothed}");
        let stats = validate_mesh(&smoothed.mesh);

        let uv = hooks.run(Stage::Parameterization, || {
            parameterize(&smoothed.mesh, atlas)
                .map_err(|e| PipelineError::geometry(Stage::Parameterization, &smoothed.mesh, e))
        })?;

        let refined = RefinedMesh {
            mesh: uv.mesh,
            uv_method: uv.method,
            warnings,
            stats,
        };
        info!(
            vertices = refined.mesh.vertices.len(),
            faces = refined.mesh.faces.len(),
            uv = %refined.uv_method,
            warnings = refined.warnings.len(),
            "Mesh clean-up complete"
        );
        Ok(refined)
    }

    /// Infer a skeleton for a refined mesh and paint its weights.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InvalidConfig`] if a rigging stage's parameters
    ///   are out of range
    /// - [`PipelineError::Geometry`] if a stage rejects its input
    /// - [`PipelineError::Cancelled`] if the token was set
    pub fn rig(&mut self, refined: &RefinedMesh) -> PipelineResult<Rig> {
        self.config.validate_rig()?;
        let config = &self.config;
        let hooks = &mut self.hooks;
        let mesh = &refined.mesh;

        info!(
            vertices = mesh.vertices.len(),
            bone_limit = config.skeleton.bone_limit,
            "Starting rigging"
        );

        let inferred = hooks.run(Stage::Skeleton, || {
            infer_skeleton(mesh, &config.skeleton)
                .map_err(|e| PipelineError::geometry(Stage::Skeleton, mesh, e))
        })?;
        debug!("{inferred}");

        let weights = hooks.run(Stage::Weights, || {
            paint_weights(mesh, &inferred.skeleton, &config.weights)
                .map_err(|e| PipelineError::geometry(Stage::Weights, mesh, e))
        })?;

        info!(
            bones = inferred.skeleton.num_bones(),
            dropped = inferred.dropped.len(),
            "Rigging complete"
        );
        Ok(Rig {
            skeleton: inferred.skeleton,
            weights,
            dropped_bones: inferred.dropped,
        })
    }

    /// Clean up a raw mesh and, for characters, rig it.
    ///
    /// # Errors
    ///
    /// Any error from [`cleanup`](Self::cleanup) or [`rig`](Self::rig).
    pub fn process(&mut self, raw: &IndexedMesh, class: AssetClass) -> PipelineResult<ProcessedAsset> {
        if class.is_rigged() {
            self.config.validate_rig()?;
        }
        let refined = self.cleanup(raw)?;
        let rig = if class.is_rigged() {
            Some(self.rig(&refined)?)
        } else {
            None
        };
        Ok(ProcessedAsset { refined, rig })
    }
}

/// Clean up a raw mesh with default settings and the built-in atlas.
///
/// # Errors
///
/// See [`AssetPipeline::cleanup`].
///
/// # Example
///
/// ```no_run
/// use asset_pipeline::cleanup_mesh;
/// use mesh_types::icosphere;
///
/// let refined = cleanup_mesh(&icosphere(5), 8000).unwrap();
/// println!("{refined}");
/// ```
pub fn cleanup_mesh(raw: &IndexedMesh, target_faces: usize) -> PipelineResult<RefinedMesh> {
    AssetPipeline::new(PipelineConfig::default().with_target_faces(target_faces)).cleanup(raw)
}

/// Rig a refined mesh with the humanoid plan and default weights.
///
/// # Errors
///
/// See [`AssetPipeline::rig`].
pub fn rig_character(refined: &RefinedMesh, bone_limit: usize) -> PipelineResult<Rig> {
    AssetPipeline::new(PipelineConfig::default().with_bone_limit(bone_limit)).rig(refined)
}
