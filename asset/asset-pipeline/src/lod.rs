//! Level-of-detail chains.

use std::fmt;

use mesh_retopo::decimate_to;
use mesh_types::IndexedMesh;
use rayon::prelude::*;
use tracing::info;

use crate::error::{PipelineError, PipelineResult, StageError};
use crate::stage::Stage;

/// Face counts used when the caller has no preference.
pub const DEFAULT_LOD_LEVELS: [usize; 4] = [8000, 4000, 1000, 100];

/// One level of a LOD chain.
#[derive(Debug, Clone)]
pub struct LodLevel {
    /// `LOD0`, `LOD1`, ...
    pub name: String,
    /// The mesh at this level.
    pub mesh: IndexedMesh,
    /// Faces in `mesh`.
    pub faces: usize,
    /// Vertices in `mesh`.
    pub vertices: usize,
    /// Face reduction against the source, in percent.
    pub reduction_percent: f64,
}

impl fmt::Display for LodLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} faces, {} vertices ({:.1}% reduction)",
            self.name, self.faces, self.vertices, self.reduction_percent
        )
    }
}

/// Decimate a copy of `mesh` to each requested face count.
///
/// Levels are returned in request order. A level at or above the source's
/// face count reuses the source unchanged. Levels are built in parallel.
///
/// # Errors
///
/// [`PipelineError::Geometry`] with [`StageError::EmptyMesh`] if the mesh
/// has no faces.
///
/// # Example
///
/// ```
/// use asset_pipeline::lod::generate_lod_chain;
/// use mesh_types::icosphere;
///
/// let chain = generate_lod_chain(&icosphere(3), &[2000, 500, 100]).unwrap();
/// assert_eq!(chain[0].faces, 1280);
/// assert!(chain[2].faces <= 100);
/// ```
pub fn generate_lod_chain(mesh: &IndexedMesh, levels: &[usize]) -> PipelineResult<Vec<LodLevel>> {
    let source_faces = mesh.faces.len();
    if source_faces == 0 {
        return Err(PipelineError::geometry(Stage::Lod, mesh, StageError::EmptyMesh));
    }
    info!(source_faces, levels = levels.len(), "Generating LOD chain");

    let chain: Vec<LodLevel> = levels
        .par_iter()
        .enumerate()
        .map(|(i, &target)| {
            let lod = decimate_to(mesh, target).mesh;
            #[allow(clippy::cast_precision_loss)]
            // Precision: face counts are far below 2^52
            let reduction_percent = (1.0 - lod.faces.len() as f64 / source_faces as f64) * 100.0;
            LodLevel {
                name: format!("LOD{i}"),
                faces: lod.faces.len(),
                vertices: lod.vertices.len(),
                mesh: lod,
                reduction_percent,
            }
        })
        .collect();

    info!(
        finest = chain.first().map(|l| l.faces),
        coarsest = chain.last().map(|l| l.faces),
        "LOD chain complete"
    );
    Ok(chain)
}
