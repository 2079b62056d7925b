//! Parameterization entry point.

use std::fmt;

use mesh_types::IndexedMesh;
use tracing::{info, warn};

use crate::atlas::ChartAtlas;
use crate::error::{UvError, UvResult};
use crate::spherical::spherical_projection;

/// How the UVs were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UvMethod {
    /// A chart atlas backend succeeded.
    Atlas {
        /// Number of charts.
        charts: usize,
    },
    /// No backend was available; UVs come from spherical projection.
    SphericalFallback,
}

impl fmt::Display for UvMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atlas { charts } => write!(f, "atlas ({charts} charts)"),
            Self::SphericalFallback => write!(f, "spherical fallback"),
        }
    }
}

/// Output of [`parameterize`].
#[derive(Debug, Clone)]
pub struct Parameterization {
    /// Mesh with a UV on every vertex.
    pub mesh: IndexedMesh,
    /// Which path produced the UVs.
    pub method: UvMethod,
}

/// Give every vertex a UV in `[0, 1]²`.
///
/// Uses `atlas` when one is supplied. When it is `None`, or the backend
/// reports [`UvError::Unavailable`], the mesh is projected spherically
/// instead; that path never fails.
///
/// # Errors
///
/// - [`UvError::EmptyMesh`] if the mesh has no vertices
/// - [`UvError::IncompleteAtlas`] if the backend left vertices without UVs
/// - any other error the backend returns
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_uv::{PlanarChartAtlas, UvMethod, parameterize};
///
/// let atlas = PlanarChartAtlas::default();
/// let result = parameterize(&unit_cube(), Some(&atlas)).unwrap();
/// assert_eq!(result.method, UvMethod::Atlas { charts: 6 });
///
/// let result = parameterize(&unit_cube(), None).unwrap();
/// assert_eq!(result.method, UvMethod::SphericalFallback);
/// ```
pub fn parameterize(
    mesh: &IndexedMesh,
    atlas: Option<&dyn ChartAtlas>,
) -> UvResult<Parameterization> {
    if mesh.vertices.is_empty() {
        return Err(UvError::EmptyMesh);
    }

    info!(
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        backend = atlas.map_or("none", |a| a.name()),
        "Starting parameterization"
    );

    if let Some(atlas) = atlas {
        match atlas.generate(mesh) {
            Ok(charted) => {
                let missing = charted
                    .mesh
                    .vertices
                    .iter()
                    .filter(|v| v.uv().is_none())
                    .count();
                if missing > 0 {
                    return Err(UvError::IncompleteAtlas { missing });
                }
                info!(charts = charted.charts, "Parameterization complete");
                return Ok(Parameterization {
                    mesh: charted.mesh,
                    method: UvMethod::Atlas {
                        charts: charted.charts,
                    },
                });
            }
            Err(UvError::Unavailable { backend, reason }) => {
                warn!(%backend, %reason, "Chart atlas unavailable, using spherical projection");
            }
            Err(e) => return Err(e),
        }
    }

    let mesh = spherical_projection(mesh);
    info!(method = "spherical", "Parameterization complete");
    Ok(Parameterization {
        mesh,
        method: UvMethod::SphericalFallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{ChartedMesh, PlanarChartAtlas};
    use mesh_types::{icosphere, unit_cube};

    struct Offline;

    impl ChartAtlas for Offline {
        fn name(&self) -> &str {
            "offline"
        }

        fn generate(&self, _mesh: &IndexedMesh) -> UvResult<ChartedMesh> {
            Err(UvError::Unavailable {
                backend: self.name().to_string(),
                reason: "library not loaded".to_string(),
            })
        }
    }

    struct Broken;

    impl ChartAtlas for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn generate(&self, _mesh: &IndexedMesh) -> UvResult<ChartedMesh> {
            Err(UvError::InvalidParams {
                name: "resolution",
                reason: "zero".to_string(),
            })
        }
    }

    struct Lazy;

    impl ChartAtlas for Lazy {
        fn name(&self) -> &str {
            "lazy"
        }

        fn generate(&self, mesh: &IndexedMesh) -> UvResult<ChartedMesh> {
            Ok(ChartedMesh {
                mesh: mesh.clone(),
                charts: 1,
            })
        }
    }

    #[test]
    fn atlas_used_when_available() {
        let atlas = PlanarChartAtlas::default();
        let result = parameterize(&icosphere(1), Some(&atlas)).unwrap();
        assert!(matches!(result.method, UvMethod::Atlas { charts } if charts > 1));
        assert!(result.mesh.has_uvs());
    }

    #[test]
    fn unavailable_backend_falls_back() {
        let sphere = icosphere(1);
        let result = parameterize(&sphere, Some(&Offline)).unwrap();
        assert_eq!(result.method, UvMethod::SphericalFallback);
        assert_eq!(result.mesh.vertices.len(), sphere.vertices.len());
        assert_eq!(result.mesh.faces, sphere.faces);
        assert!(result.mesh.has_uvs());
    }

    #[test]
    fn other_backend_errors_surface() {
        assert!(matches!(
            parameterize(&unit_cube(), Some(&Broken)),
            Err(UvError::InvalidParams { name: "resolution", .. })
        ));
    }

    #[test]
    fn backend_must_cover_every_vertex() {
        assert!(matches!(
            parameterize(&unit_cube(), Some(&Lazy)),
            Err(UvError::IncompleteAtlas { missing: 8 })
        ));
    }

    #[test]
    fn empty_mesh_rejected() {
        assert!(matches!(
            parameterize(&IndexedMesh::new(), None),
            Err(UvError::EmptyMesh)
        ));
    }

    #[test]
    fn method_display() {
        assert_eq!(UvMethod::Atlas { charts: 3 }.to_string(), "atlas (3 charts)");
        assert_eq!(UvMethod::SphericalFallback.to_string(), "spherical fallback");
    }
}
