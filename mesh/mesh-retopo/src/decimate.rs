//! Edge-collapse decimation with quadric error metrics.
//!
//! All candidate collapses live in one binary heap ordered by cost. A
//! collapse changes the quadric of the surviving vertex, so every vertex
//! carries a version stamp; heap entries remember the stamps they were
//! computed with and are discarded on pop when either endpoint has moved on.
//!
//! Vertices on open or non-manifold edges are pinned: they never move and
//! never disappear. UV seams are open edges with duplicated vertices on
//! either side, so pinning keeps both sides identical and the surface can
//! still be welded shut after decimation.

// Mesh indices and counts don't overflow in practice
#![allow(clippy::cast_possible_truncation)]

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::{HashMap, HashSet};
use mesh_repair::normalize_edge;
use mesh_types::{IndexedMesh, MeshTopology, Point3, Triangle, Vertex};
use tracing::{debug, info};

use crate::quadric::Quadric;

/// Faces whose normal turns by more than this (as a cosine) reject the collapse.
const MIN_NORMAL_COS: f64 = 0.0;

/// Result of [`decimate_to`].
#[derive(Debug, Clone)]
pub struct Decimation {
    /// The decimated mesh, compacted.
    pub mesh: IndexedMesh,
    /// Edge collapses applied.
    pub collapses_performed: usize,
    /// Popped candidates that failed a topology or geometry check.
    pub collapses_rejected: usize,
}

/// A candidate collapse of `keep <- remove`.
#[derive(Debug, Clone)]
struct Candidate {
    cost: f64,
    keep: u32,
    remove: u32,
    stamps: (u32, u32),
    target: Point3<f64>,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; ties broken by index so runs are repeatable.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.keep.cmp(&self.keep))
            .then_with(|| other.remove.cmp(&self.remove))
    }
}

/// Mutable working state of one decimation run.
struct Collapser {
    positions: Vec<Point3<f64>>,
    quadrics: Vec<Quadric>,
    stamps: Vec<u32>,
    alive: Vec<bool>,
    /// Boundary and non-manifold vertices.
    pinned: Vec<bool>,
    faces: Vec<[u32; 3]>,
    face_alive: Vec<bool>,
    /// Faces incident to each vertex. May list dead faces; filter on use.
    vertex_faces: Vec<Vec<usize>>,
    active_faces: usize,
}

impl Collapser {
    fn new(mesh: &IndexedMesh) -> Self {
        let mut quadrics = vec![Quadric::default(); mesh.vertices.len()];
        let mut vertex_faces = vec![Vec::new(); mesh.vertices.len()];
        let mut edge_faces: HashMap<(u32, u32), u32> = HashMap::new();
        for (face_idx, (face, tri)) in mesh.faces.iter().zip(mesh.triangles()).enumerate() {
            let q = Quadric::from_triangle(&tri);
            for (i, &v) in face.iter().enumerate() {
                quadrics[v as usize] += q;
                vertex_faces[v as usize].push(face_idx);
                *edge_faces.entry(normalize_edge(v, face[(i + 1) % 3])).or_insert(0) += 1;
            }
        }

        let mut pinned = vec![false; mesh.vertices.len()];
        for (&(a, b), _) in edge_faces.iter().filter(|&(_, &count)| count != 2) {
            pinned[a as usize] = true;
            pinned[b as usize] = true;
        }

        Self {
            positions: mesh.vertices.iter().map(|v| v.position).collect(),
            quadrics,
            stamps: vec![0; mesh.vertices.len()],
            alive: vec![true; mesh.vertices.len()],
            pinned,
            faces: mesh.faces.clone(),
            face_alive: vec![true; mesh.faces.len()],
            vertex_faces,
            active_faces: mesh.faces.len(),
        }
    }

    fn live_faces(&self, v: u32) -> impl Iterator<Item = usize> + '_ {
        self.vertex_faces[v as usize]
            .iter()
            .copied()
            .filter(|&f| self.face_alive[f])
    }

    fn neighbors(&self, v: u32) -> HashSet<u32> {
        self.live_faces(v)
            .flat_map(|f| self.faces[f])
            .filter(|&u| u != v)
            .collect()
    }

    /// Collapse candidate for the edge `(a, b)`, or `None` if both ends are
    /// pinned. A pinned end is always the one kept, at its own position.
    fn candidate(&self, a: u32, b: u32) -> Option<Candidate> {
        let (keep, remove) = match normalize_edge(a, b) {
            (x, y) if self.pinned[x as usize] && self.pinned[y as usize] => return None,
            (x, y) if self.pinned[y as usize] => (y, x),
            edge => edge,
        };
        let q = self.quadrics[keep as usize] + self.quadrics[remove as usize];
        let (pk, pr) = (self.positions[keep as usize], self.positions[remove as usize]);

        let target = if self.pinned[keep as usize] {
            pk
        } else {
            q.optimal_point().unwrap_or_else(|| {
                [pk, pr, nalgebra::center(&pk, &pr)]
                    .into_iter()
                    .min_by(|x, y| q.evaluate(x).total_cmp(&q.evaluate(y)))
                    .unwrap_or(pk)
            })
        };

        Some(Candidate {
            cost: q.evaluate(&target),
            keep,
            remove,
            stamps: (self.stamps[keep as usize], self.stamps[remove as usize]),
            target,
        })
    }

    fn is_current(&self, c: &Candidate) -> bool {
        self.alive[c.keep as usize]
            && self.alive[c.remove as usize]
            && self.stamps[c.keep as usize] == c.stamps.0
            && self.stamps[c.remove as usize] == c.stamps.1
    }

    /// Topology checks for collapsing the edge `(a, b)`.
    fn topology_allows(&self, a: u32, b: u32) -> bool {
        let opposite: HashSet<u32> = self
            .live_faces(a)
            .filter(|&f| self.faces[f].contains(&b))
            .flat_map(|f| self.faces[f])
            .filter(|&u| u != a && u != b)
            .collect();
        if opposite.is_empty() {
            return false;
        }

        // Link condition: the only shared neighbors are the edge's opposite
        // vertices, otherwise the collapse pinches the surface.
        let na = self.neighbors(a);
        let nb = self.neighbors(b);
        if na.intersection(&nb).any(|u| !opposite.contains(u)) {
            return false;
        }

        // Each opposite vertex loses one neighbor; valence 3 would fold.
        opposite.iter().all(|&u| self.neighbors(u).len() > 3)
    }

    /// True if moving `a` and `b` to `target` keeps every surviving face's
    /// orientation and area.
    fn geometry_allows(&self, a: u32, b: u32, target: &Point3<f64>) -> bool {
        [a, b].iter().all(|&v| {
            self.live_faces(v)
                .filter(|&f| !(self.faces[f].contains(&a) && self.faces[f].contains(&b)))
                .all(|f| {
                    let before = self.triangle(self.faces[f], None);
                    let after = self.triangle(self.faces[f], Some((v, target)));
                    match (before.normal(), after.normal()) {
                        (Some(n0), Some(n1)) => n0.dot(&n1) > MIN_NORMAL_COS,
                        (None, Some(_)) => true,
                        _ => false,
                    }
                })
        })
    }

    fn triangle(&self, face: [u32; 3], moved: Option<(u32, &Point3<f64>)>) -> Triangle {
        let p = |v: u32| match moved {
            Some((m, target)) if m == v => *target,
            _ => self.positions[v as usize],
        };
        Triangle::new(p(face[0]), p(face[1]), p(face[2]))
    }

    /// Pick a placement that passes the geometry check, cheapest first.
    fn placement(&self, c: &Candidate) -> Option<Point3<f64>> {
        let (pk, pr) = (self.positions[c.keep as usize], self.positions[c.remove as usize]);
        if self.pinned[c.keep as usize] {
            return self.geometry_allows(c.keep, c.remove, &pk).then_some(pk);
        }
        [c.target, nalgebra::center(&pk, &pr), pk, pr]
            .into_iter()
            .find(|p| self.geometry_allows(c.keep, c.remove, p))
    }

    fn collapse(&mut self, keep: u32, remove: u32, target: Point3<f64>) {
        self.positions[keep as usize] = target;
        let q = self.quadrics[remove as usize];
        self.quadrics[keep as usize] += q;
        self.alive[remove as usize] = false;
        self.stamps[keep as usize] += 1;

        let moved = std::mem::take(&mut self.vertex_faces[remove as usize]);
        for f in moved {
            if !self.face_alive[f] {
                continue;
            }
            if self.faces[f].contains(&keep) {
                self.face_alive[f] = false;
                self.active_faces -= 1;
            } else {
                for idx in &mut self.faces[f] {
                    if *idx == remove {
                        *idx = keep;
                    }
                }
                self.vertex_faces[keep as usize].push(f);
            }
        }
        let face_alive = &self.face_alive;
        self.vertex_faces[keep as usize].retain(|&f| face_alive[f]);
    }

    fn finish(self, attributes: &[Vertex]) -> IndexedMesh {
        let mut remap = vec![u32::MAX; self.positions.len()];
        let mut mesh = IndexedMesh::with_capacity(self.positions.len(), self.active_faces);

        for (face, _) in self
            .faces
            .iter()
            .zip(&self.face_alive)
            .filter(|&(_, &alive)| alive)
        {
            let mapped = face.map(|v| {
                let slot = &mut remap[v as usize];
                if *slot == u32::MAX {
                    *slot = mesh.vertices.len() as u32;
                    let mut vertex = attributes[v as usize].clone();
                    vertex.position = self.positions[v as usize];
                    mesh.vertices.push(vertex);
                }
                *slot
            });
            mesh.faces.push(mapped);
        }
        mesh
    }
}

/// Collapse edges, cheapest first, until at most `target` faces remain.
///
/// Collapses are rejected when they would pinch the surface (link
/// condition), leave a valence-3 vertex next to the edge, or flip a
/// neighboring face. Vertices on open edges never move, so boundaries and
/// UV seams keep their exact shape. If every remaining candidate is
/// rejected the mesh stops short of `target`. Surviving vertices keep their
/// attributes.
///
/// # Example
///
/// ```
/// use mesh_retopo::decimate_to;
/// use mesh_types::icosphere;
///
/// let sphere = icosphere(2);
/// let result = decimate_to(&sphere, 100);
/// assert!(result.mesh.faces.len() <= 100);
/// ```
#[must_use]
pub fn decimate_to(mesh: &IndexedMesh, target: usize) -> Decimation {
    let original = mesh.faces.len();
    if original <= target {
        return Decimation {
            mesh: mesh.clone(),
            collapses_performed: 0,
            collapses_rejected: 0,
        };
    }

    info!(original, target, "Starting QEM decimation");

    let mut state = Collapser::new(mesh);
    let mut heap = BinaryHeap::new();
    let mut seen = HashSet::new();
    for face in &mesh.faces {
        for i in 0..3 {
            let edge = normalize_edge(face[i], face[(i + 1) % 3]);
            if edge.0 != edge.1 && seen.insert(edge) {
                heap.extend(state.candidate(edge.0, edge.1));
            }
        }
    }
    drop(seen);

    let mut collapses_performed = 0;
    let mut collapses_rejected = 0;

    while state.active_faces > target {
        let Some(candidate) = heap.pop() else {
            break;
        };
        if !state.is_current(&candidate) {
            continue;
        }
        if !state.topology_allows(candidate.keep, candidate.remove) {
            collapses_rejected += 1;
            continue;
        }
        let Some(target_pos) = state.placement(&candidate) else {
            collapses_rejected += 1;
            continue;
        };

        state.collapse(candidate.keep, candidate.remove, target_pos);
        collapses_performed += 1;

        for n in state.neighbors(candidate.keep) {
            heap.extend(state.candidate(candidate.keep, n));
        }
    }

    debug!(
        remaining_candidates = heap.len(),
        rejected = collapses_rejected,
        "Decimation loop finished"
    );

    let result = state.finish(&mesh.vertices);
    info!(
        final_faces = result.faces.len(),
        collapses = collapses_performed,
        "Decimation complete"
    );

    Decimation {
        mesh: result,
        collapses_performed,
        collapses_rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_repair::{MeshAdjacency, count_inconsistent_edges, validate_mesh};
    use mesh_repair::{remove_unreferenced_vertices, weld_vertices};
    use mesh_types::{icosphere, unit_cube};

    /// Icosphere with the lower hemisphere's faces moved onto duplicated
    /// vertices, leaving an open seam around the equator band.
    fn seamed_sphere(subdivisions: u32) -> IndexedMesh {
        let sphere = icosphere(subdivisions);
        let mut mesh = sphere.clone();
        let base = sphere.vertices.len() as u32;
        mesh.vertices.extend(sphere.vertices.iter().cloned());
        for face in &mut mesh.faces {
            let z = face
                .iter()
                .map(|&v| sphere.vertices[v as usize].position.z)
                .sum::<f64>();
            if z < 0.0 {
                *face = face.map(|v| v + base);
            }
        }
        remove_unreferenced_vertices(&mut mesh);
        mesh
    }

    #[test]
    fn at_or_below_target_is_unchanged() {
        let cube = unit_cube();
        let result = decimate_to(&cube, 12);
        assert_eq!(result.mesh, cube);
        assert_eq!(result.collapses_performed, 0);
    }

    #[test]
    fn icosphere_reaches_target() {
        let sphere = icosphere(1);
        let result = decimate_to(&sphere, 20);

        assert!(result.mesh.faces.len() <= 21, "{}", result.mesh.faces.len());
        let report = validate_mesh(&result.mesh);
        assert_eq!(report.degenerate_face_count, 0);
        assert_eq!(report.duplicate_face_count, 0);
        assert!(report.is_watertight);
        assert!(report.is_manifold);
    }

    #[test]
    fn closed_mesh_loses_two_faces_per_collapse() {
        let sphere = icosphere(2);
        let result = decimate_to(&sphere, 200);
        assert_eq!(
            result.mesh.faces.len(),
            sphere.faces.len() - 2 * result.collapses_performed
        );
        assert!(result.mesh.faces.len() <= 200);
        assert!(result.mesh.faces.len() >= 199);
    }

    #[test]
    fn winding_is_preserved() {
        let sphere = icosphere(3);
        let result = decimate_to(&sphere, 300);
        assert_eq!(count_inconsistent_edges(&result.mesh.faces), 0);
        assert!(result.mesh.signed_volume() > 0.0);
        assert!(MeshAdjacency::build(&result.mesh.faces).is_watertight());
    }

    #[test]
    fn tetrahedron_cannot_collapse() {
        let mesh = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0),
                Vertex::from_coords(1.0, 0.0, 0.0),
                Vertex::from_coords(0.0, 1.0, 0.0),
                Vertex::from_coords(0.0, 0.0, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]],
        );
        let result = decimate_to(&mesh, 2);
        assert_eq!(result.mesh.faces.len(), 4);
        assert_eq!(result.collapses_performed, 0);
        assert!(result.collapses_rejected > 0);
    }

    #[test]
    fn seams_survive_and_weld_shut() {
        let seamed = seamed_sphere(3);
        let before = validate_mesh(&seamed);
        assert!(before.boundary_edge_count > 0);

        let result = decimate_to(&seamed, 300);
        assert!(result.collapses_performed > 0);
        assert!(result.mesh.faces.len() < seamed.faces.len());

        let after = validate_mesh(&result.mesh);
        assert_eq!(after.boundary_edge_count, before.boundary_edge_count);

        let mut welded = result.mesh;
        weld_vertices(&mut welded, 1e-9);
        let report = validate_mesh(&welded);
        assert_eq!(report.boundary_edge_count, 0, "{report}");
        assert!(report.is_manifold, "{report}");
    }

    #[test]
    fn open_edge_vertices_do_not_move() {
        let seamed = seamed_sphere(2);
        let adjacency = MeshAdjacency::build(&seamed.faces);
        let boundary: Vec<Point3<f64>> = adjacency
            .boundary_edges()
            .flat_map(|(a, b)| [a, b])
            .map(|v| seamed.vertices[v as usize].position)
            .collect();

        let result = decimate_to(&seamed, 100);
        for p in &boundary {
            assert!(
                result.mesh.vertices.iter().any(|v| v.position == *p),
                "boundary vertex {p} moved"
            );
        }
    }

    #[test]
    fn decimation_is_deterministic() {
        let sphere = icosphere(2);
        let a = decimate_to(&sphere, 120);
        let b = decimate_to(&sphere, 120);
        assert_eq!(a.mesh, b.mesh);
    }
}
