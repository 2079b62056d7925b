//! Mesh validation and health reporting.

use hashbrown::HashSet;
use mesh_types::IndexedMesh;

use crate::adjacency::MeshAdjacency;
use crate::error::{RepairError, RepairResult};
use crate::repair::sorted_face;
use crate::winding::count_inconsistent_edges;

/// Area below which a face counts as degenerate in a report.
const DEGENERATE_AREA: f64 = 1e-12;

/// Report of mesh validation results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshReport {
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Total number of faces.
    pub face_count: usize,
    /// Total number of undirected edges.
    pub edge_count: usize,

    /// Edges with only one adjacent face.
    pub boundary_edge_count: usize,
    /// Edges with more than two adjacent faces.
    pub non_manifold_edge_count: usize,
    /// Manifold edges whose faces traverse them in the same direction.
    pub inconsistent_edge_count: usize,
    /// Faces with (near) zero area or a repeated index.
    pub degenerate_face_count: usize,
    /// Faces repeating an earlier face's vertex set.
    pub duplicate_face_count: usize,

    /// Every edge has exactly two adjacent faces.
    pub is_watertight: bool,
    /// No edge has more than two adjacent faces.
    pub is_manifold: bool,
    /// Signed volume is negative.
    pub is_inside_out: bool,
}

impl MeshReport {
    /// Watertight, manifold, consistently wound and outward facing.
    #[must_use]
    pub const fn is_sealed(&self) -> bool {
        self.is_watertight
            && self.is_manifold
            && self.inconsistent_edge_count == 0
            && !self.is_inside_out
    }

    /// True if any defect was counted.
    #[must_use]
    pub const fn has_issues(&self) -> bool {
        self.issue_count() > 0
    }

    /// Sum of all defect counts.
    #[must_use]
    pub const fn issue_count(&self) -> usize {
        self.boundary_edge_count
            + self.non_manifold_edge_count
            + self.inconsistent_edge_count
            + self.degenerate_face_count
            + self.duplicate_face_count
    }
}

impl std::fmt::Display for MeshReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Mesh Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Faces: {}", self.face_count)?;
        writeln!(f, "  Edges: {}", self.edge_count)?;
        writeln!(
            f,
            "  Watertight: {}",
            if self.is_watertight { "Yes" } else { "No" }
        )?;
        writeln!(f, "  Manifold: {}", if self.is_manifold { "Yes" } else { "No" })?;
        writeln!(
            f,
            "  Winding: {}",
            if self.is_inside_out {
                "Inside-out"
            } else {
                "Outward"
            }
        )?;

        if self.has_issues() {
            writeln!(f, "  Issues:")?;
            for (label, count) in [
                ("Boundary edges", self.boundary_edge_count),
                ("Non-manifold edges", self.non_manifold_edge_count),
                ("Inconsistent edges", self.inconsistent_edge_count),
                ("Degenerate faces", self.degenerate_face_count),
                ("Duplicate faces", self.duplicate_face_count),
            ] {
                if count > 0 {
                    writeln!(f, "    {label}: {count}")?;
                }
            }
        }

        Ok(())
    }
}

/// Validate a mesh and return a report of any issues.
///
/// The mesh must have valid indices; see [`check_indices`].
///
/// # Example
///
/// ```
/// use mesh_repair::validate_mesh;
/// use mesh_types::{IndexedMesh, Vertex};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// let report = validate_mesh(&mesh);
/// assert_eq!(report.face_count, 1);
/// assert_eq!(report.boundary_edge_count, 3);
/// ```
#[must_use]
pub fn validate_mesh(mesh: &IndexedMesh) -> MeshReport {
    let adjacency = MeshAdjacency::build(&mesh.faces);

    MeshReport {
        vertex_count: mesh.vertices.len(),
        face_count: mesh.faces.len(),
        edge_count: adjacency.edge_count(),
        boundary_edge_count: adjacency.boundary_edge_count(),
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
        inconsistent_edge_count: count_inconsistent_edges(&mesh.faces),
        degenerate_face_count: count_degenerate_faces(mesh),
        duplicate_face_count: count_duplicate_faces(&mesh.faces),
        is_watertight: adjacency.is_watertight(),
        is_manifold: adjacency.is_manifold(),
        is_inside_out: !mesh.faces.is_empty() && mesh.signed_volume() < 0.0,
    }
}

/// Reject faces that reference missing vertices.
///
/// # Errors
///
/// Returns [`RepairError::InvalidIndex`] for the first bad index found.
pub fn check_indices(mesh: &IndexedMesh) -> RepairResult<()> {
    let vertex_count = mesh.vertices.len();
    for (face, indices) in mesh.faces.iter().enumerate() {
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(RepairError::InvalidIndex {
                face,
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}

fn count_degenerate_faces(mesh: &IndexedMesh) -> usize {
    mesh.faces
        .iter()
        .filter(|&&[i0, i1, i2]| {
            if i0 == i1 || i1 == i2 || i0 == i2 {
                return true;
            }
            let v0 = mesh.vertices[i0 as usize].position;
            let v1 = mesh.vertices[i1 as usize].position;
            let v2 = mesh.vertices[i2 as usize].position;
            (v1 - v0).cross(&(v2 - v0)).norm() * 0.5 < DEGENERATE_AREA
        })
        .count()
}

fn count_duplicate_faces(faces: &[[u32; 3]]) -> usize {
    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(faces.len());
    faces.iter().filter(|f| !seen.insert(sorted_face(**f))).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{icosphere, unit_cube};

    #[test]
    fn cube_is_sealed() {
        let report = validate_mesh(&unit_cube());
        assert_eq!(report.edge_count, 18);
        assert!(report.is_sealed());
        assert!(!report.has_issues());
    }

    #[test]
    fn inside_out_sphere_reported() {
        let mut sphere = icosphere(1);
        sphere.flip_normals();
        let report = validate_mesh(&sphere);
        assert!(report.is_watertight);
        assert!(report.is_inside_out);
        assert!(!report.is_sealed());
    }

    #[test]
    fn defects_counted() {
        let mut cube = unit_cube();
        cube.faces.push([0, 2, 1]); // duplicate, and edges now non-manifold
        cube.faces.push([1, 1, 2]); // degenerate
        let report = validate_mesh(&cube);
        assert_eq!(report.duplicate_face_count, 1);
        assert_eq!(report.degenerate_face_count, 1);
        assert!(!report.is_manifold);
        assert!(report.to_string().contains("Duplicate faces: 1"));
    }

    #[test]
    fn bad_index_rejected() {
        let mut cube = unit_cube();
        assert!(check_indices(&cube).is_ok());
        cube.faces.push([0, 1, 42]);
        let err = check_indices(&cube).unwrap_err();
        assert!(matches!(err, RepairError::InvalidIndex { face: 12, index: 42, .. }));
    }
}
