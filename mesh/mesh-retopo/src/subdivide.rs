//! Midpoint subdivision.

use hashbrown::HashMap;
use mesh_repair::normalize_edge;
use mesh_types::{IndexedMesh, Vertex, VertexAttributes};

/// Split every triangle into four by inserting edge midpoints.
///
/// Midpoints are shared between the two faces of an edge, so a closed mesh
/// stays closed. Positions are not smoothed. Normals and UVs present on both
/// ends of an edge are interpolated onto its midpoint.
///
/// # Example
///
/// ```
/// use mesh_retopo::subdivide_midpoint;
/// use mesh_types::unit_cube;
///
/// let cube = subdivide_midpoint(&unit_cube());
/// assert_eq!(cube.faces.len(), 48);
/// assert_eq!(cube.vertices.len(), 8 + 18);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
// Truncation: vertex counts stay far below u32::MAX
pub fn subdivide_midpoint(mesh: &IndexedMesh) -> IndexedMesh {
    let mut vertices = mesh.vertices.clone();
    let mut faces = Vec::with_capacity(mesh.faces.len() * 4);
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::with_capacity(mesh.faces.len() * 3 / 2);

    let mut midpoint = |a: u32, b: u32, vertices: &mut Vec<Vertex>| -> u32 {
        *midpoints.entry(normalize_edge(a, b)).or_insert_with(|| {
            let index = vertices.len() as u32;
            let vertex = interpolate(&vertices[a as usize], &vertices[b as usize]);
            vertices.push(vertex);
            index
        })
    };

    for &[v0, v1, v2] in &mesh.faces {
        let m01 = midpoint(v0, v1, &mut vertices);
        let m12 = midpoint(v1, v2, &mut vertices);
        let m20 = midpoint(v2, v0, &mut vertices);

        faces.push([v0, m01, m20]);
        faces.push([v1, m12, m01]);
        faces.push([v2, m20, m12]);
        faces.push([m01, m12, m20]);
    }

    IndexedMesh::from_parts(vertices, faces)
}

fn interpolate(a: &Vertex, b: &Vertex) -> Vertex {
    let normal = a
        .normal()
        .zip(b.normal())
        .and_then(|(na, nb)| (na + nb).try_normalize(f64::EPSILON));
    let uv = a
        .uv()
        .zip(b.uv())
        .map(|(ua, ub)| nalgebra::center(&ua, &ub));

    Vertex {
        position: nalgebra::center(&a.position, &b.position),
        attributes: VertexAttributes { normal, uv },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_repair::{count_inconsistent_edges, validate_mesh};
    use mesh_types::{Point2, icosphere};

    #[test]
    fn closed_mesh_stays_closed() {
        let sphere = icosphere(1);
        let fine = subdivide_midpoint(&sphere);

        assert_eq!(fine.faces.len(), 320);
        // V' = V + E = 42 + 120
        assert_eq!(fine.vertices.len(), 162);
        let report = validate_mesh(&fine);
        assert!(report.is_watertight);
        assert_eq!(count_inconsistent_edges(&fine.faces), 0);
        // Flat subdivision keeps the enclosed volume.
        assert_relative_eq!(fine.volume(), sphere.volume(), epsilon = 1e-9);
    }

    #[test]
    fn attributes_are_interpolated() {
        let mut mesh = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0).with_uv(Point2::new(0.0, 0.0)),
                Vertex::from_coords(2.0, 0.0, 0.0).with_uv(Point2::new(1.0, 0.0)),
                Vertex::from_coords(0.0, 2.0, 0.0).with_uv(Point2::new(0.0, 1.0)),
            ],
            vec![[0, 1, 2]],
        );
        mesh.compute_vertex_normals();

        let fine = subdivide_midpoint(&mesh);
        let m01 = &fine.vertices[3];
        assert_relative_eq!(m01.position.x, 1.0);
        assert_eq!(m01.uv(), Some(Point2::new(0.5, 0.0)));
        assert!(m01.normal().is_some_and(|n| (n.z - 1.0).abs() < 1e-12));
    }
}
