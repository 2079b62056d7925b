//! Closed reference shapes used by tests, benches and collision proxies.

use crate::{IndexedMesh, Vertex};
use nalgebra::Point3;
use std::collections::HashMap;

/// Create a unit cube from (0,0,0) to (1,1,1) with outward-facing normals.
///
/// # Example
///
/// ```
/// use mesh_types::{MeshTopology, unit_cube};
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.face_count(), 12);
/// ```
#[must_use]
pub fn unit_cube() -> IndexedMesh {
    let vertices = [
        (0.0, 0.0, 0.0),
        (1.0, 0.0, 0.0),
        (1.0, 1.0, 0.0),
        (0.0, 1.0, 0.0),
        (0.0, 0.0, 1.0),
        (1.0, 0.0, 1.0),
        (1.0, 1.0, 1.0),
        (0.0, 1.0, 1.0),
    ]
    .into_iter()
    .map(|(x, y, z)| Vertex::from_coords(x, y, z))
    .collect();

    let faces = vec![
        // Bottom (-Z)
        [0, 2, 1],
        [0, 3, 2],
        // Top (+Z)
        [4, 5, 6],
        [4, 6, 7],
        // Front (-Y)
        [0, 1, 5],
        [0, 5, 4],
        // Back (+Y)
        [3, 7, 6],
        [3, 6, 2],
        // Left (-X)
        [0, 4, 7],
        [0, 7, 3],
        // Right (+X)
        [1, 2, 6],
        [1, 6, 5],
    ];

    IndexedMesh::from_parts(vertices, faces)
}

/// Unit-radius icosphere centered at the origin, wound outward.
///
/// `subdivisions = 0` is the 20-face icosahedron; each level multiplies the
/// face count by four (80, 320, 1280, ...). New vertices are projected back
/// onto the sphere.
///
/// ```
/// use mesh_types::{MeshTopology, icosphere};
///
/// let sphere = icosphere(1);
/// assert_eq!(sphere.face_count(), 80);
/// assert!(sphere.signed_volume() > 0.0);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
// Truncation: vertex counts stay far below u32::MAX for any practical level
pub fn icosphere(subdivisions: u32) -> IndexedMesh {
    let phi = f64::midpoint(1.0, 5.0_f64.sqrt());
    let a = 1.0;
    let b = 1.0 / phi;

    let ico_verts = [
        [0.0, b, -a],
        [b, a, 0.0],
        [-b, a, 0.0],
        [0.0, b, a],
        [0.0, -b, a],
        [-a, 0.0, b],
        [0.0, -b, -a],
        [a, 0.0, -b],
        [a, 0.0, b],
        [-a, 0.0, -b],
        [b, -a, 0.0],
        [-b, -a, 0.0],
    ];

    let ico_faces: [[u32; 3]; 20] = [
        [0, 1, 2],
        [3, 2, 1],
        [3, 4, 5],
        [3, 8, 4],
        [0, 6, 7],
        [0, 9, 6],
        [4, 10, 11],
        [6, 11, 10],
        [2, 5, 9],
        [11, 9, 5],
        [1, 7, 8],
        [10, 8, 7],
        [3, 5, 2],
        [3, 1, 8],
        [0, 2, 9],
        [0, 7, 1],
        [6, 9, 11],
        [6, 10, 7],
        [4, 11, 5],
        [4, 8, 10],
    ];

    let mut mesh = IndexedMesh::with_capacity(12, 20);
    for v in &ico_verts {
        let p = Point3::new(v[0], v[1], v[2]);
        mesh.vertices
            .push(Vertex::new(Point3::from(p.coords.normalize())));
    }
    mesh.faces.extend_from_slice(&ico_faces);

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut faces = Vec::with_capacity(mesh.faces.len() * 4);

        for &[v0, v1, v2] in &mesh.faces {
            let m01 = sphere_midpoint(v0, v1, &mut mesh.vertices, &mut midpoints);
            let m12 = sphere_midpoint(v1, v2, &mut mesh.vertices, &mut midpoints);
            let m20 = sphere_midpoint(v2, v0, &mut mesh.vertices, &mut midpoints);

            faces.push([v0, m01, m20]);
            faces.push([v1, m12, m01]);
            faces.push([v2, m20, m12]);
            faces.push([m01, m12, m20]);
        }

        mesh.faces = faces;
    }

    if mesh.signed_volume() < 0.0 {
        mesh.flip_normals();
    }

    mesh
}

#[allow(clippy::cast_possible_truncation)]
fn sphere_midpoint(
    a: u32,
    b: u32,
    vertices: &mut Vec<Vertex>,
    midpoints: &mut HashMap<(u32, u32), u32>,
) -> u32 {
    let key = if a < b { (a, b) } else { (b, a) };
    if let Some(&idx) = midpoints.get(&key) {
        return idx;
    }

    let pa = vertices[a as usize].position;
    let pb = vertices[b as usize].position;
    let mid = nalgebra::center(&pa, &pb);

    let idx = vertices.len() as u32;
    vertices.push(Vertex::new(Point3::from(mid.coords.normalize())));
    midpoints.insert(key, idx);
    idx
}
