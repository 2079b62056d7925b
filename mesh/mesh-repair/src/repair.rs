//! Core mesh cleanup operations.
//!
//! Welding, degenerate and duplicate face removal, and vertex compaction.
//! Each operation edits the mesh in place and returns how much it changed.

use hashbrown::{HashMap, HashSet};
use mesh_types::IndexedMesh;
use nalgebra::Point3;
use tracing::debug;

/// Thresholds for [`repair_mesh`].
///
/// All distances are in mesh units.
///
/// # Example
///
/// ```
/// use mesh_repair::RepairParams;
///
/// let params = RepairParams::default().with_weld_epsilon(1e-4);
/// assert!(params.remove_unreferenced);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepairParams {
    /// Vertices closer than this are merged.
    /// Default: `1e-6`
    pub weld_epsilon: f64,

    /// Triangles with area below this are removed.
    /// Default: `1e-12`
    pub degenerate_area_threshold: f64,

    /// Compact the vertex array after face removal.
    /// Default: `true`
    pub remove_unreferenced: bool,
}

impl Default for RepairParams {
    fn default() -> Self {
        Self {
            weld_epsilon: 1e-6,
            degenerate_area_threshold: 1e-12,
            remove_unreferenced: true,
        }
    }
}

impl RepairParams {
    /// Thresholds scaled to a mesh of the given bounding-box diagonal.
    ///
    /// Welding uses `diagonal * 1e-6`, degenerate area `(diagonal * 1e-6)²`.
    #[must_use]
    pub fn for_scale(diagonal: f64) -> Self {
        let eps = (diagonal * 1e-6).max(f64::EPSILON);
        Self {
            weld_epsilon: eps,
            degenerate_area_threshold: eps * eps,
            ..Self::default()
        }
    }

    /// Set the vertex welding distance threshold.
    #[must_use]
    pub const fn with_weld_epsilon(mut self, epsilon: f64) -> Self {
        self.weld_epsilon = epsilon;
        self
    }

    /// Set the minimum triangle area threshold.
    #[must_use]
    pub const fn with_degenerate_area_threshold(mut self, threshold: f64) -> Self {
        self.degenerate_area_threshold = threshold;
        self
    }

    /// Set whether to remove unreferenced vertices after repair.
    #[must_use]
    pub const fn with_remove_unreferenced(mut self, remove: bool) -> Self {
        self.remove_unreferenced = remove;
        self
    }
}

/// Remove triangles with repeated indices or area below `area_threshold`.
///
/// Returns the number of triangles removed.
///
/// # Example
///
/// ```
/// use mesh_repair::remove_degenerate_triangles;
/// use mesh_types::{IndexedMesh, Vertex};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(10.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(5.0, 0.0, 0.0)); // collinear
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(remove_degenerate_triangles(&mut mesh, 1e-9), 1);
/// ```
pub fn remove_degenerate_triangles(mesh: &mut IndexedMesh, area_threshold: f64) -> usize {
    let original_count = mesh.faces.len();

    mesh.faces.retain(|&[i0, i1, i2]| {
        if i0 == i1 || i1 == i2 || i0 == i2 {
            return false;
        }
        let v0 = mesh.vertices[i0 as usize].position;
        let v1 = mesh.vertices[i1 as usize].position;
        let v2 = mesh.vertices[i2 as usize].position;

        let area = (v1 - v0).cross(&(v2 - v0)).norm() * 0.5;
        area >= area_threshold
    });

    original_count - mesh.faces.len()
}

/// Merge vertices closer than `epsilon`.
///
/// Uses a spatial hash with cell size `2 * epsilon`. Faces are remapped onto
/// the surviving vertex and faces that collapse to a repeated index are
/// dropped. Merged vertices stay in the array until
/// [`remove_unreferenced_vertices`] runs.
///
/// Returns the number of vertices merged.
///
/// # Example
///
/// ```
/// use mesh_repair::weld_vertices;
/// use mesh_types::{IndexedMesh, Vertex};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0001, 0.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
/// mesh.faces.push([0, 3, 2]);
///
/// assert_eq!(weld_vertices(&mut mesh, 0.001), 1);
/// assert_eq!(mesh.faces[1], [0, 1, 2]);
/// ```
#[allow(clippy::cast_possible_truncation)]
// Truncation: mesh indices are u32
pub fn weld_vertices(mesh: &mut IndexedMesh, epsilon: f64) -> usize {
    if mesh.vertices.is_empty() || epsilon <= 0.0 {
        return 0;
    }

    let cell_size = epsilon * 2.0;

    let mut spatial_hash: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        spatial_hash
            .entry(pos_to_cell(&vertex.position, cell_size))
            .or_default()
            .push(idx as u32);
    }

    let mut remap: Vec<u32> = (0..mesh.vertices.len() as u32).collect();
    let mut merged_count = 0;

    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        let idx = idx as u32;
        if remap[idx as usize] != idx {
            continue;
        }

        let cell = pos_to_cell(&vertex.position, cell_size);

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) = spatial_hash.get(&(cell.0 + dx, cell.1 + dy, cell.2 + dz))
                    else {
                        continue;
                    };
                    for &other in candidates {
                        if other <= idx || remap[other as usize] != other {
                            continue;
                        }
                        let dist = (vertex.position - mesh.vertices[other as usize].position).norm();
                        if dist < epsilon {
                            remap[other as usize] = idx;
                            merged_count += 1;
                        }
                    }
                }
            }
        }
    }

    if merged_count == 0 {
        return 0;
    }

    for face in &mut mesh.faces {
        for i in face.iter_mut() {
            *i = remap[*i as usize];
        }
    }

    mesh.faces
        .retain(|&[i0, i1, i2]| i0 != i1 && i1 != i2 && i0 != i2);

    merged_count
}

#[allow(clippy::cast_possible_truncation)]
// Truncation: cell coordinates of finite meshes fit in i64
fn pos_to_cell(pos: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (pos.x / cell_size).floor() as i64,
        (pos.y / cell_size).floor() as i64,
        (pos.z / cell_size).floor() as i64,
    )
}

/// Drop vertices no face references and compact the vertex array.
///
/// Returns the number of vertices removed.
///
/// # Example
///
/// ```
/// use mesh_repair::remove_unreferenced_vertices;
/// use mesh_types::{IndexedMesh, Vertex};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(100.0, 100.0, 100.0)); // unused
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([1, 2, 3]);
///
/// assert_eq!(remove_unreferenced_vertices(&mut mesh), 1);
/// assert_eq!(mesh.faces[0], [0, 1, 2]);
/// ```
#[allow(clippy::cast_possible_truncation)]
pub fn remove_unreferenced_vertices(mesh: &mut IndexedMesh) -> usize {
    let original_count = mesh.vertices.len();

    let mut referenced = vec![false; original_count];
    for face in &mesh.faces {
        for &i in face {
            referenced[i as usize] = true;
        }
    }

    if referenced.iter().all(|&r| r) {
        return 0;
    }

    let mut remap = vec![u32::MAX; original_count];
    let mut new_vertices = Vec::with_capacity(original_count);
    for (old_idx, vertex) in mesh.vertices.iter().enumerate() {
        if referenced[old_idx] {
            remap[old_idx] = new_vertices.len() as u32;
            new_vertices.push(vertex.clone());
        }
    }

    for face in &mut mesh.faces {
        for i in face.iter_mut() {
            *i = remap[*i as usize];
        }
    }

    let removed = original_count - new_vertices.len();
    mesh.vertices = new_vertices;
    removed
}

/// Remove faces that repeat an earlier face's vertex set.
///
/// Winding and starting vertex are ignored: `[0, 1, 2]`, `[1, 2, 0]` and
/// `[0, 2, 1]` are all the same face. The first occurrence is kept.
///
/// Returns the number of faces removed.
pub fn remove_duplicate_faces(mesh: &mut IndexedMesh) -> usize {
    let original_count = mesh.faces.len();

    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(original_count);
    mesh.faces.retain(|face| seen.insert(sorted_face(*face)));

    original_count - mesh.faces.len()
}

/// Vertex set of a face, independent of winding.
#[inline]
pub(crate) fn sorted_face(mut face: [u32; 3]) -> [u32; 3] {
    face.sort_unstable();
    face
}

/// Run the cleanup chain on a mesh.
///
/// 1. Weld nearby vertices
/// 2. Remove degenerate triangles
/// 3. Remove duplicate faces
/// 4. Remove unreferenced vertices
///
/// # Example
///
/// ```
/// use mesh_repair::{RepairParams, repair_mesh};
/// use mesh_types::unit_cube;
///
/// let mut cube = unit_cube();
/// let summary = repair_mesh(&mut cube, &RepairParams::default());
/// assert!(!summary.changed());
/// ```
#[must_use]
pub fn repair_mesh(mesh: &mut IndexedMesh, params: &RepairParams) -> RepairSummary {
    let initial_vertices = mesh.vertices.len();
    let initial_faces = mesh.faces.len();

    let vertices_welded = weld_vertices(mesh, params.weld_epsilon);
    let degenerates_removed = remove_degenerate_triangles(mesh, params.degenerate_area_threshold);
    let duplicates_removed = remove_duplicate_faces(mesh);
    let unreferenced_removed = if params.remove_unreferenced {
        remove_unreferenced_vertices(mesh)
    } else {
        0
    };

    let summary = RepairSummary {
        initial_vertices,
        initial_faces,
        final_vertices: mesh.vertices.len(),
        final_faces: mesh.faces.len(),
        vertices_welded,
        degenerates_removed,
        duplicates_removed,
        unreferenced_removed,
    };
    debug!(
        welded = vertices_welded,
        degenerates = degenerates_removed,
        duplicates = duplicates_removed,
        unreferenced = unreferenced_removed,
        "Mesh repair pass"
    );
    summary
}

/// What [`repair_mesh`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepairSummary {
    /// Number of vertices before repair.
    pub initial_vertices: usize,
    /// Number of faces before repair.
    pub initial_faces: usize,
    /// Number of vertices after repair.
    pub final_vertices: usize,
    /// Number of faces after repair.
    pub final_faces: usize,
    /// Vertices merged into a neighbor.
    pub vertices_welded: usize,
    /// Zero-area or repeated-index faces dropped.
    pub degenerates_removed: usize,
    /// Duplicate faces dropped.
    pub duplicates_removed: usize,
    /// Vertices dropped during compaction.
    pub unreferenced_removed: usize,
}

impl RepairSummary {
    /// True if any operation modified the mesh.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.vertices_welded > 0
            || self.degenerates_removed > 0
            || self.duplicates_removed > 0
            || self.unreferenced_removed > 0
    }
}

impl std::fmt::Display for RepairSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Repair: {} -> {} vertices, {} -> {} faces (welded {}, degenerate {}, duplicate {}, unreferenced {})",
            self.initial_vertices,
            self.final_vertices,
            self.initial_faces,
            self.final_faces,
            self.vertices_welded,
            self.degenerates_removed,
            self.duplicates_removed,
            self.unreferenced_removed,
        )
    }
}
