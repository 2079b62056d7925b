//! Boundary loop detection and sealing.
//!
//! A boundary edge belongs to exactly one face. Walking boundary edges in
//! the direction their face traverses them yields closed loops; each loop is
//! closed with a triangle fan wound opposite to the loop so the new faces
//! agree with the existing winding.

use hashbrown::HashMap;
use mesh_types::IndexedMesh;
use tracing::{debug, warn};

use crate::adjacency::MeshAdjacency;
use crate::error::{RepairError, RepairResult};

/// A closed chain of boundary vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    /// Vertex indices in the direction the adjacent faces traverse them.
    pub vertices: Vec<u32>,
}

impl BoundaryLoop {
    /// Number of vertices (and edges) in the loop.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True for a loop with no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Fan triangles that close this loop.
    ///
    /// Produces `len - 2` faces, all anchored at the first vertex.
    #[must_use]
    pub fn fan(&self) -> Vec<[u32; 3]> {
        let v = &self.vertices;
        if v.len() < 3 {
            return Vec::new();
        }
        (1..v.len() - 1).map(|i| [v[0], v[i + 1], v[i]]).collect()
    }
}

/// Counts from [`seal_boundary_loops`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SealSummary {
    /// Loops found and closed.
    pub loops_sealed: usize,
    /// Triangles added.
    pub faces_added: usize,
}

/// Trace every boundary loop of the mesh.
///
/// # Errors
///
/// Returns [`RepairError::SealFailed`] if a boundary chain dead-ends, which
/// happens when adjacent faces disagree on winding along the boundary.
///
/// # Example
///
/// ```
/// use mesh_repair::detect_holes;
/// use mesh_types::unit_cube;
///
/// let mut cube = unit_cube();
/// cube.faces.truncate(10); // drop the +X side
///
/// let loops = detect_holes(&cube).unwrap();
/// assert_eq!(loops.len(), 1);
/// assert_eq!(loops[0].len(), 4);
/// ```
pub fn detect_holes(mesh: &IndexedMesh) -> RepairResult<Vec<BoundaryLoop>> {
    let adjacency = MeshAdjacency::build(&mesh.faces);

    // Directed boundary half-edges, keyed by start vertex.
    let mut outgoing: HashMap<u32, Vec<u32>> = HashMap::new();
    let mut remaining = 0usize;
    for (a, b) in adjacency.boundary_edges() {
        let Some(&[face_idx]) = adjacency.faces_for_edge(a, b) else {
            continue;
        };
        let (from, to) = directed_in_face(mesh.faces[face_idx], a, b);
        outgoing.entry(from).or_default().push(to);
        remaining += 1;
    }

    // Deterministic start order.
    let mut starts: Vec<u32> = outgoing.keys().copied().collect();
    starts.sort_unstable();

    let mut loops = Vec::new();
    for start in starts {
        while let Some(first) = outgoing.get_mut(&start).and_then(Vec::pop) {
            remaining -= 1;
            let mut chain = vec![start];
            let mut current = first;

            while current != start {
                chain.push(current);
                let Some(next) = outgoing.get_mut(&current).and_then(Vec::pop) else {
                    return Err(RepairError::SealFailed {
                        reason: format!("boundary chain dead-ends at vertex {current}"),
                    });
                };
                remaining -= 1;
                current = next;
            }

            loops.push(BoundaryLoop { vertices: chain });
        }
    }

    debug_assert_eq!(remaining, 0);
    Ok(loops)
}

/// Orientation of edge `{a, b}` as face `face` traverses it.
fn directed_in_face(face: [u32; 3], a: u32, b: u32) -> (u32, u32) {
    for i in 0..3 {
        if face[i] == a && face[(i + 1) % 3] == b {
            return (a, b);
        }
    }
    (b, a)
}

/// Close every boundary loop with a minimal triangle fan.
///
/// A mesh without boundary edges is left untouched.
///
/// # Errors
///
/// Propagates [`detect_holes`] failures; the mesh is not modified in that case.
///
/// # Example
///
/// ```
/// use mesh_repair::{seal_boundary_loops, validate_mesh};
/// use mesh_types::unit_cube;
///
/// let mut cube = unit_cube();
/// cube.faces.truncate(10);
///
/// let summary = seal_boundary_loops(&mut cube).unwrap();
/// assert_eq!(summary.faces_added, 2);
/// assert!(validate_mesh(&cube).is_watertight);
/// ```
pub fn seal_boundary_loops(mesh: &mut IndexedMesh) -> RepairResult<SealSummary> {
    let loops = detect_holes(mesh)?;
    if loops.is_empty() {
        return Ok(SealSummary::default());
    }

    let mut summary = SealSummary::default();
    for boundary in &loops {
        let fan = boundary.fan();
        if fan.is_empty() {
            warn!(len = boundary.len(), "Skipping boundary loop too short to fan");
            continue;
        }
        summary.faces_added += fan.len();
        summary.loops_sealed += 1;
        mesh.faces.extend(fan);
    }

    debug!(
        loops = summary.loops_sealed,
        faces = summary.faces_added,
        "Sealed boundary loops"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::winding::count_inconsistent_edges;
    use mesh_types::{IndexedMesh, Vertex, unit_cube};

    #[test]
    fn closed_mesh_has_no_holes() {
        let cube = unit_cube();
        assert!(detect_holes(&cube).unwrap().is_empty());
    }

    #[test]
    fn loop_follows_face_direction() {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);

        let loops = detect_holes(&mesh).unwrap();
        assert_eq!(loops, vec![BoundaryLoop { vertices: vec![0, 1, 2] }]);
        assert_eq!(loops[0].fan(), vec![[0, 2, 1]]);
    }

    #[test]
    fn sealed_cube_keeps_orientation() {
        let mut cube = unit_cube();
        // Remove top and right sides: one loop of six vertices.
        cube.faces.remove(11);
        cube.faces.remove(10);
        cube.faces.remove(3);
        cube.faces.remove(2);

        let summary = seal_boundary_loops(&mut cube).unwrap();
        assert_eq!(summary.loops_sealed, 1);
        assert_eq!(summary.faces_added, 4);
        assert_eq!(count_inconsistent_edges(&cube.faces), 0);
        assert!(cube.signed_volume() > 0.0);
    }

    #[test]
    fn two_holes_two_loops() {
        let mut cube = unit_cube();
        // Remove bottom and top.
        cube.faces.drain(0..4);

        let loops = detect_holes(&cube).unwrap();
        assert_eq!(loops.len(), 2);
        assert!(loops.iter().all(|l| l.len() == 4));
    }

    #[test]
    fn inconsistent_boundary_fails() {
        let mut mesh = IndexedMesh::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
            mesh.vertices.push(Vertex::from_coords(x, y, 0.0));
        }
        // Both faces traverse the shared edge 1->2 in the same direction.
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([1, 2, 3]);

        assert!(detect_holes(&mesh).is_err());
    }
}
