//! Per-platform budgets.

use std::fmt;

use mesh_retopo::decimate_to;
use mesh_types::IndexedMesh;
use tracing::info;

use crate::error::{PipelineError, PipelineResult, StageError};
use crate::stage::Stage;

/// Deployment target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Platform {
    /// Phones and tablets.
    Mobile,
    /// Desktop.
    Pc,
    /// Standalone headsets.
    Vr,
    /// Browser (WebGL/WebGPU).
    Web,
}

impl Platform {
    /// Every platform.
    pub const ALL: [Self; 4] = [Self::Mobile, Self::Pc, Self::Vr, Self::Web];

    /// Limits an asset must fit on this platform.
    #[must_use]
    pub const fn budget(self) -> PlatformBudget {
        match self {
            Self::Mobile => PlatformBudget::new(2000, 1024, 1),
            Self::Pc => PlatformBudget::new(10_000, 4096, 4),
            Self::Vr => PlatformBudget::new(5000, 2048, 2),
            Self::Web => PlatformBudget::new(3000, 1024, 1),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mobile => "mobile",
            Self::Pc => "pc",
            Self::Vr => "vr",
            Self::Web => "web",
        })
    }
}

/// Limits for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlatformBudget {
    /// Triangle limit.
    pub max_faces: usize,
    /// Largest texture edge, in pixels.
    pub texture_resolution: u32,
    /// Materials per asset.
    pub max_materials: u32,
}

impl PlatformBudget {
    const fn new(max_faces: usize, texture_resolution: u32, max_materials: u32) -> Self {
        Self {
            max_faces,
            texture_resolution,
            max_materials,
        }
    }
}

/// A mesh decimated for one platform.
#[derive(Debug, Clone)]
pub struct PlatformAsset {
    /// The mesh, within `budget.max_faces` where decimation allowed.
    pub mesh: IndexedMesh,
    /// Target platform.
    pub platform: Platform,
    /// Budget that was applied.
    pub budget: PlatformBudget,
}

/// Decimate `mesh` to the platform's face budget.
///
/// A mesh already within budget is returned unchanged.
///
/// # Errors
///
/// [`PipelineError::Geometry`] with [`StageError::EmptyMesh`] if the mesh
/// has no faces.
///
/// # Example
///
/// ```
/// use asset_pipeline::platform::{Platform, optimize_for_platform};
/// use mesh_types::icosphere;
///
/// let asset = optimize_for_platform(&icosphere(4), Platform::Mobile).unwrap();
/// assert!(asset.mesh.faces.len() <= 2000);
/// assert_eq!(asset.budget.texture_resolution, 1024);
/// ```
pub fn optimize_for_platform(mesh: &IndexedMesh, platform: Platform) -> PipelineResult<PlatformAsset> {
    if mesh.faces.is_empty() {
        return Err(PipelineError::geometry(Stage::Lod, mesh, StageError::EmptyMesh));
    }
    let budget = platform.budget();
    info!(%platform, faces = mesh.faces.len(), max_faces = budget.max_faces, "Optimizing for platform");

    let decimated = decimate_to(mesh, budget.max_faces).mesh;

    info!(%platform, faces = decimated.faces.len(), "Platform optimization complete");
    Ok(PlatformAsset {
        mesh: decimated,
        platform,
        budget,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::icosphere;

    #[test]
    fn budgets() {
        assert_eq!(Platform::Mobile.budget(), PlatformBudget::new(2000, 1024, 1));
        assert_eq!(Platform::Pc.budget().max_faces, 10_000);
        assert_eq!(Platform::Vr.budget().max_materials, 2);
        assert_eq!(Platform::Web.budget().texture_resolution, 1024);
        // Desktop is the most generous on every axis.
        for p in Platform::ALL {
            let b = p.budget();
            let pc = Platform::Pc.budget();
            assert!(b.max_faces <= pc.max_faces);
            assert!(b.texture_resolution <= pc.texture_resolution);
            assert!(b.max_materials <= pc.max_materials);
        }
    }

    #[test]
    fn within_budget_is_unchanged() {
        let sphere = icosphere(3);
        let asset = optimize_for_platform(&sphere, Platform::Web).unwrap();
        assert_eq!(asset.mesh, sphere);
        assert_eq!(asset.platform, Platform::Web);
    }

    #[test]
    fn over_budget_is_decimated() {
        // 5120 faces.
        let asset = optimize_for_platform(&icosphere(4), Platform::Vr).unwrap();
        assert!(asset.mesh.faces.len() <= 5000);
        assert!(asset.mesh.faces.len() > 4000);
    }

    #[test]
    fn empty_mesh_rejected() {
        assert!(optimize_for_platform(&IndexedMesh::new(), Platform::Pc).is_err());
    }
}
