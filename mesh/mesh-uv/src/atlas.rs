//! Chart atlas backends.
//!
//! A chart atlas cuts the surface into charts, flattens each one and packs
//! them into the unit square. Vertices on a cut between two charts are
//! duplicated so that each copy carries its own UV.

use std::collections::VecDeque;

use hashbrown::HashMap;
use mesh_repair::{MeshAdjacency, check_indices};
use mesh_types::{IndexedMesh, MeshTopology, Point2, Vector3};
use nalgebra::Vector2;
use tracing::debug;

use crate::error::{UvError, UvResult};
use crate::pack::pack_shelves;
use crate::params::AtlasParams;

/// A mesh carrying atlas UVs.
#[derive(Debug, Clone)]
pub struct ChartedMesh {
    /// Mesh with a UV on every vertex. Face `i` covers the same triangle as
    /// face `i` of the input.
    pub mesh: IndexedMesh,
    /// Number of charts in the atlas.
    pub charts: usize,
}

/// A UV atlas backend.
///
/// Backends are constructed by the caller and handed to
/// [`parameterize`](crate::parameterize). A backend that cannot run (a
/// missing native library, an exhausted license, a disabled GPU) reports
/// [`UvError::Unavailable`] and the caller falls back to spherical
/// projection.
pub trait ChartAtlas: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Generate per-vertex UVs in `[0, 1]²`.
    ///
    /// # Errors
    ///
    /// [`UvError::Unavailable`] if the backend cannot run; any other error
    /// is a real failure.
    fn generate(&self, mesh: &IndexedMesh) -> UvResult<ChartedMesh>;
}

/// Built-in atlas: normal-cone charts, planar projection, shelf packing.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_uv::{ChartAtlas, PlanarChartAtlas};
///
/// let charted = PlanarChartAtlas::default().generate(&unit_cube()).unwrap();
/// assert_eq!(charted.charts, 6);
/// assert_eq!(charted.mesh.vertices.len(), 24);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlanarChartAtlas {
    params: AtlasParams,
}

impl PlanarChartAtlas {
    /// Atlas with the given parameters.
    #[must_use]
    pub const fn new(params: AtlasParams) -> Self {
        Self { params }
    }

    /// Parameters in use.
    #[must_use]
    pub const fn params(&self) -> &AtlasParams {
        &self.params
    }
}

impl ChartAtlas for PlanarChartAtlas {
    fn name(&self) -> &str {
        "planar"
    }

    #[allow(clippy::cast_possible_truncation)]
    // Truncation: vertex counts stay far below u32::MAX
    fn generate(&self, mesh: &IndexedMesh) -> UvResult<ChartedMesh> {
        self.params.validate()?;
        if mesh.faces.is_empty() {
            return Err(UvError::EmptyMesh);
        }
        check_indices(mesh)?;

        let weighted: Vec<Vector3<f64>> = mesh
            .triangles()
            .map(|t| t.normal_unnormalized())
            .collect();
        let adjacency = MeshAdjacency::build(&mesh.faces);
        let charts = grow_charts(&mesh.faces, &adjacency, &weighted, self.params.cone_angle.cos());
        let layouts: Vec<ChartLayout> = charts
            .into_iter()
            .map(|faces| ChartLayout::project(mesh, faces, &weighted))
            .collect();

        let sizes: Vec<Vector2<f64>> = layouts.iter().map(|l| l.size).collect();
        let packing = pack_shelves(&sizes, self.params.gutter);
        let side = packing.side.max(f64::MIN_POSITIVE);
        debug!(charts = layouts.len(), side, "Charts packed");

        let vertex_count = layouts.iter().map(|l| l.vertices.len()).sum();
        let mut out = IndexedMesh::with_capacity(vertex_count, mesh.faces.len());
        out.faces = vec![[0; 3]; mesh.faces.len()];
        for (layout, offset) in layouts.iter().zip(&packing.offsets) {
            let base = out.vertices.len() as u32;
            for (&original, local) in layout.vertices.iter().zip(&layout.local) {
                let uv = (offset + local) / side;
                let uv = Point2::new(uv.x.clamp(0.0, 1.0), uv.y.clamp(0.0, 1.0));
                out.vertices.push(mesh.vertices[original as usize].with_uv(uv));
            }
            for (&face, &corners) in layout.faces.iter().zip(&layout.corners) {
                out.faces[face] = corners.map(|c| base + c);
            }
        }

        Ok(ChartedMesh {
            mesh: out,
            charts: layouts.len(),
        })
    }
}

/// Partition faces into charts by breadth-first growth from the lowest
/// unassigned face.
///
/// A face joins the chart when it shares an edge with a member and its
/// normal lies within the cone around the seed's normal. Degenerate faces
/// join any chart that reaches them.
fn grow_charts(
    faces: &[[u32; 3]],
    adjacency: &MeshAdjacency,
    weighted_normals: &[Vector3<f64>],
    min_cos: f64,
) -> Vec<Vec<usize>> {
    let unit: Vec<Option<Vector3<f64>>> = weighted_normals
        .iter()
        .map(|n| n.try_normalize(f64::EPSILON))
        .collect();
    let mut assigned = vec![false; faces.len()];
    let mut charts = Vec::new();
    let mut queue = VecDeque::new();

    for seed in 0..faces.len() {
        if assigned[seed] {
            continue;
        }
        let seed_normal = unit[seed];
        assigned[seed] = true;
        queue.push_back(seed);
        let mut members = vec![seed];

        while let Some(face) = queue.pop_front() {
            let [a, b, c] = faces[face];
            for (u, v) in [(a, b), (b, c), (c, a)] {
                let Some(neighbors) = adjacency.faces_for_edge(u, v) else {
                    continue;
                };
                for &n in neighbors {
                    let within = match (seed_normal, unit[n]) {
                        (_, None) => true,
                        (Some(s), Some(f)) => s.dot(&f) >= min_cos,
                        (None, Some(_)) => false,
                    };
                    if assigned[n] || !within {
                        continue;
                    }
                    assigned[n] = true;
                    members.push(n);
                    queue.push_back(n);
                }
            }
        }
        charts.push(members);
    }
    charts
}

/// One chart flattened onto its own plane, origin at the lower-left corner.
#[derive(Debug)]
struct ChartLayout {
    /// Input face indices.
    faces: Vec<usize>,
    /// Chart-local corner indices, parallel to `faces`.
    corners: Vec<[u32; 3]>,
    /// Input vertex per chart-local vertex.
    vertices: Vec<u32>,
    /// Projected coordinate per chart-local vertex.
    local: Vec<Vector2<f64>>,
    size: Vector2<f64>,
}

impl ChartLayout {
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: vertex counts stay far below u32::MAX
    fn project(mesh: &IndexedMesh, faces: Vec<usize>, weighted_normals: &[Vector3<f64>]) -> Self {
        let axis = faces
            .iter()
            .map(|&f| weighted_normals[f])
            .sum::<Vector3<f64>>()
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::z);
        let (u_axis, v_axis) = plane_basis(&axis);

        let mut index: HashMap<u32, u32> = HashMap::with_capacity(faces.len());
        let mut vertices = Vec::new();
        let mut local = Vec::new();
        let corners = faces
            .iter()
            .map(|&f| {
                mesh.faces[f].map(|v| {
                    *index.entry(v).or_insert_with(|| {
                        let p = mesh.vertices[v as usize].position.coords;
                        vertices.push(v);
                        local.push(Vector2::new(p.dot(&u_axis), p.dot(&v_axis)));
                        (vertices.len() - 1) as u32
                    })
                })
            })
            .collect();

        let min = local
            .iter()
            .fold(Vector2::repeat(f64::INFINITY), |m, p| m.inf(p));
        let max = local
            .iter()
            .fold(Vector2::repeat(f64::NEG_INFINITY), |m, p| m.sup(p));
        for p in &mut local {
            *p -= min;
        }

        Self {
            faces,
            corners,
            vertices,
            local,
            size: max - min,
        }
    }
}

/// Orthonormal tangent pair for a unit normal.
fn plane_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let helper = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = normal.cross(&helper).normalize();
    let v = normal.cross(&u);
    (u, v)
}
