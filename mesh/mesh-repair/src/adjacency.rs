//! Mesh adjacency data structures.
//!
//! Provides lookups for edge-to-face and vertex-to-face relationships.

use hashbrown::HashMap;

/// Adjacency information for a face list.
///
/// Provides lookups for:
/// - Faces adjacent to an edge
/// - Faces adjacent to a vertex
/// - Boundary edges (edges with only one adjacent face)
/// - Non-manifold edges (edges with more than two adjacent faces)
#[derive(Debug, Clone)]
pub struct MeshAdjacency {
    /// Maps edge (v0, v1) with v0 < v1 to the faces using it.
    edge_to_faces: HashMap<(u32, u32), Vec<usize>>,
    /// Maps vertex index to the faces using it.
    vertex_to_faces: HashMap<u32, Vec<usize>>,
}

impl MeshAdjacency {
    /// Build adjacency information from a list of faces.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_repair::MeshAdjacency;
    ///
    /// let faces = vec![[0, 1, 2], [1, 3, 2]];
    /// let adj = MeshAdjacency::build(&faces);
    ///
    /// assert_eq!(adj.boundary_edge_count(), 4);
    /// ```
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_to_faces: HashMap<(u32, u32), Vec<usize>> =
            HashMap::with_capacity(faces.len() * 3 / 2);
        let mut vertex_to_faces: HashMap<u32, Vec<usize>> = HashMap::with_capacity(faces.len() / 2);

        for (face_idx, face) in faces.iter().enumerate() {
            for &v in face {
                vertex_to_faces.entry(v).or_default().push(face_idx);
            }

            for i in 0..3 {
                let edge = normalize_edge(face[i], face[(i + 1) % 3]);
                edge_to_faces.entry(edge).or_default().push(face_idx);
            }
        }

        Self {
            edge_to_faces,
            vertex_to_faces,
        }
    }

    /// Faces adjacent to an edge, in either direction.
    ///
    /// Returns `None` if the edge doesn't exist in the mesh.
    #[must_use]
    pub fn faces_for_edge(&self, v0: u32, v1: u32) -> Option<&[usize]> {
        self.edge_to_faces
            .get(&normalize_edge(v0, v1))
            .map(Vec::as_slice)
    }

    /// Faces adjacent to a vertex. Empty if the vertex is unused.
    #[must_use]
    pub fn faces_for_vertex(&self, v: u32) -> &[usize] {
        self.vertex_to_faces.get(&v).map_or(&[], Vec::as_slice)
    }

    /// Every undirected edge with its adjacent faces.
    pub fn edges(&self) -> impl Iterator<Item = ((u32, u32), &[usize])> + '_ {
        self.edge_to_faces
            .iter()
            .map(|(&edge, faces)| (edge, faces.as_slice()))
    }

    /// Edges with exactly one adjacent face.
    pub fn boundary_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(&edge, _)| edge)
    }

    /// Number of boundary edges.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_to_faces
            .values()
            .filter(|faces| faces.len() == 1)
            .count()
    }

    /// Number of edges with more than two adjacent faces.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_to_faces
            .values()
            .filter(|faces| faces.len() > 2)
            .count()
    }

    /// True if every edge has at most two adjacent faces.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() <= 2)
    }

    /// True if every edge has exactly two adjacent faces.
    ///
    /// An empty face list is not watertight.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        !self.edge_to_faces.is_empty() && self.edge_to_faces.values().all(|faces| faces.len() == 2)
    }

    /// Total number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_to_faces.len()
    }

    /// Number of vertices referenced by at least one face.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_to_faces.len()
    }
}

/// Order an edge so the smaller index comes first.
#[inline]
#[must_use]
pub fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 { (v0, v1) } else { (v1, v0) }
}
