//! Collision proxies.

use mesh_repair::{remove_unreferenced_vertices, weld_vertices};
use mesh_retopo::decimate_to;
use mesh_types::{IndexedMesh, MeshBounds, MeshTopology, Point3, icosphere, unit_cube};
use tracing::{debug, info, warn};

use crate::error::{PipelineError, PipelineResult, StageError};
use crate::hull::convex_hull;
use crate::stage::Stage;

/// Smallest closed triangle mesh.
const MIN_TRIANGLES: usize = 4;

/// Hull coplanarity and seam welding tolerance, relative to the
/// bounding-box diagonal.
const RELATIVE_TOLERANCE: f64 = 1e-9;

/// Shape of a collision proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollisionShape {
    /// The convex hull of the mesh's vertices. Flat meshes fall back to
    /// [`BoundingBox`](Self::BoundingBox).
    #[default]
    ConvexHull,
    /// The mesh's axis-aligned bounding box, 12 triangles.
    BoundingBox,
    /// An 80-triangle sphere around the bounds center. Its facets, not just
    /// its corners, enclose every vertex.
    BoundingSphere,
    /// The mesh itself with UV seams welded shut, decimated to the
    /// triangle cap.
    Simplified,
}

/// Build a collision proxy for `mesh` with at most `max_triangles` faces.
///
/// The cap is applied to every shape by edge-collapse decimation, so a
/// bounding box capped below 12 triangles loses its exact extents and a
/// capped hull or sphere may no longer enclose every vertex.
///
/// # Errors
///
/// - [`PipelineError::InvalidConfig`] if `max_triangles` is below 4
/// - [`PipelineError::Geometry`] with [`StageError::EmptyMesh`] if the mesh
///   has no faces
///
/// # Example
///
/// ```
/// use asset_pipeline::collision::{CollisionShape, generate_collision_mesh};
/// use mesh_types::icosphere;
///
/// let proxy = generate_collision_mesh(&icosphere(3), CollisionShape::Simplified, 64).unwrap();
/// assert!(proxy.faces.len() <= 64);
/// ```
pub fn generate_collision_mesh(
    mesh: &IndexedMesh,
    shape: CollisionShape,
    max_triangles: usize,
) -> PipelineResult<IndexedMesh> {
    if max_triangles < MIN_TRIANGLES {
        return Err(PipelineError::config(
            Stage::Collision,
            &format!("max_triangles must be at least {MIN_TRIANGLES}, got {max_triangles}"),
        ));
    }
    if mesh.faces.is_empty() {
        return Err(PipelineError::geometry(Stage::Collision, mesh, StageError::EmptyMesh));
    }
    info!(?shape, max_triangles, faces = mesh.faces.len(), "Generating collision proxy");

    let proxy = match shape {
        CollisionShape::ConvexHull => hull(mesh),
        CollisionShape::BoundingBox => bounding_box(mesh),
        CollisionShape::BoundingSphere => bounding_sphere(mesh),
        CollisionShape::Simplified => welded(mesh),
    };

    let mut proxy = if proxy.faces.len() > max_triangles {
        debug!(faces = proxy.faces.len(), max_triangles, "Capping collision proxy");
        decimate_to(&proxy, max_triangles).mesh
    } else {
        proxy
    };
    proxy.compute_vertex_normals();

    info!(faces = proxy.faces.len(), "Collision proxy complete");
    Ok(proxy)
}

/// Seam vertices carry distinct UVs that a collision proxy has no use for.
/// Welding them lets decimation collapse across the seam.
fn welded(mesh: &IndexedMesh) -> IndexedMesh {
    let mut welded = mesh.clone();
    let merged = weld_vertices(&mut welded, mesh.bounds().diagonal() * RELATIVE_TOLERANCE);
    if merged > 0 {
        remove_unreferenced_vertices(&mut welded);
        debug!(merged, "Welded seams before simplifying");
    }
    welded
}

fn bounding_box(mesh: &IndexedMesh) -> IndexedMesh {
    let bounds = mesh.bounds();
    let size = bounds.size();
    let mut cube = unit_cube();
    for v in &mut cube.vertices {
        v.position = bounds.min + v.position.coords.component_mul(&size);
    }
    cube
}

fn hull(mesh: &IndexedMesh) -> IndexedMesh {
    let points: Vec<Point3<f64>> = mesh.vertices.iter().map(|v| v.position).collect();
    let tolerance = mesh.bounds().diagonal() * RELATIVE_TOLERANCE;
    convex_hull(&points, tolerance).unwrap_or_else(|| {
        warn!("Mesh is flat, using its bounding box as the collision hull");
        bounding_box(mesh)
    })
}

fn bounding_sphere(mesh: &IndexedMesh) -> IndexedMesh {
    let center = mesh.bounds().center();
    let radius = mesh
        .vertices
        .iter()
        .map(|v| (v.position - center).norm())
        .fold(0.0_f64, f64::max);

    let mut sphere = icosphere(1);
    for v in &mut sphere.vertices {
        v.position = Point3::from(v.position.coords.normalize());
    }
    // Distance from the center to the nearest facet plane of the unit sphere.
    let inradius = sphere
        .triangles()
        .filter_map(|t| t.normal().map(|n| n.dot(&t.v0.coords)))
        .fold(1.0_f64, f64::min);
    let scale = radius / inradius;
    for v in &mut sphere.vertices {
        v.position = Point3::from(center.coords + v.position.coords * scale);
    }
    sphere
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{Vector3, Vertex};

    fn offset_box() -> IndexedMesh {
        let mut mesh = unit_cube();
        for v in &mut mesh.vertices {
            v.position.x *= 4.0;
            v.position.y *= 2.0;
        }
        mesh.translate(Vector3::new(1.0, -3.0, 5.0));
        mesh
    }

    #[test]
    fn box_matches_bounds() {
        let mesh = offset_box();
        let proxy = generate_collision_mesh(&mesh, CollisionShape::BoundingBox, 500).unwrap();
        assert_eq!(proxy.faces.len(), 12);
        let bounds = proxy.bounds();
        assert_relative_eq!(bounds.min, Point3::new(1.0, -3.0, 5.0), epsilon = 1e-12);
        assert_relative_eq!(bounds.max, Point3::new(5.0, -1.0, 6.0), epsilon = 1e-12);
        assert_relative_eq!(proxy.volume(), 8.0, epsilon = 1e-9);
    }

    /// True if `p` is on the inner side of every face plane of `proxy`.
    fn inside_every_facet(proxy: &IndexedMesh, p: &Point3<f64>) -> bool {
        proxy.triangles().all(|t| {
            t.normal()
                .is_none_or(|n| n.dot(&(p - t.v0)) <= 1e-9)
        })
    }

    #[test]
    fn sphere_facets_enclose_every_vertex() {
        let mesh = offset_box();
        let proxy = generate_collision_mesh(&mesh, CollisionShape::BoundingSphere, 500).unwrap();
        assert_eq!(proxy.faces.len(), 80);

        let center = mesh.bounds().center();
        let radius = (proxy.vertices[0].position - center).norm();
        // Corners sit outside half the box diagonal, sqrt(4^2 + 2^2 + 1^2) / 2.
        assert!(radius > 21.0_f64.sqrt() / 2.0);
        for v in &proxy.vertices {
            assert_relative_eq!((v.position - center).norm(), radius, epsilon = 1e-9);
        }
        assert!(mesh.vertices.iter().all(|v| inside_every_facet(&proxy, &v.position)));
        assert!(proxy.signed_volume() > 0.0);
    }

    #[test]
    fn nearest_sphere_facet_is_at_the_enclosing_radius() {
        let sphere = icosphere(3);
        let proxy =
            generate_collision_mesh(&sphere, CollisionShape::BoundingSphere, 500).unwrap();
        let center = sphere.bounds().center();
        let nearest_facet = proxy
            .triangles()
            .filter_map(|t| t.normal().map(|n| n.dot(&(t.v0 - center))))
            .fold(f64::INFINITY, f64::min);
        let farthest_vertex = sphere
            .vertices
            .iter()
            .map(|v| (v.position - center).norm())
            .fold(0.0_f64, f64::max);
        assert_relative_eq!(nearest_facet, farthest_vertex, epsilon = 1e-9);
    }

    #[test]
    fn hull_is_the_default_shape() {
        assert_eq!(CollisionShape::default(), CollisionShape::ConvexHull);
    }

    #[test]
    fn hull_of_box_is_the_box() {
        let mesh = offset_box();
        let proxy = generate_collision_mesh(&mesh, CollisionShape::ConvexHull, 500).unwrap();
        assert_eq!(proxy.faces.len(), 12);
        assert_relative_eq!(proxy.volume(), 8.0, epsilon = 1e-9);
        assert_eq!(proxy.bounds(), mesh.bounds());
        assert!(proxy.signed_volume() > 0.0);
    }

    #[test]
    fn hull_wraps_concave_mesh() {
        // Two boxes sharing one edge: the hull fills the notches beside it.
        let mut mesh = unit_cube();
        let mut other = unit_cube();
        other.translate(Vector3::new(1.0, 1.0, 0.0));
        mesh.merge(&other);

        let proxy = generate_collision_mesh(&mesh, CollisionShape::ConvexHull, 500).unwrap();
        assert_eq!(proxy.bounds(), mesh.bounds());
        assert!(proxy.volume() > mesh.volume());
        assert!(mesh.vertices.iter().all(|v| inside_every_facet(&proxy, &v.position)));
        assert!(proxy.vertices.iter().all(|v| v.normal().is_some()));
    }

    #[test]
    fn hull_respects_cap() {
        let proxy =
            generate_collision_mesh(&icosphere(2), CollisionShape::ConvexHull, 100).unwrap();
        assert!(proxy.faces.len() <= 100);
        assert!(proxy.signed_volume() > 0.0);
    }

    #[test]
    fn flat_mesh_hull_falls_back_to_box() {
        let quad = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0),
                Vertex::from_coords(2.0, 0.0, 0.0),
                Vertex::from_coords(2.0, 1.0, 0.0),
                Vertex::from_coords(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        let proxy = generate_collision_mesh(&quad, CollisionShape::ConvexHull, 500).unwrap();
        assert_eq!(proxy.faces.len(), 12);
        assert_eq!(proxy.bounds(), quad.bounds());
    }

    #[test]
    fn simplified_respects_cap() {
        let proxy =
            generate_collision_mesh(&icosphere(3), CollisionShape::Simplified, 100).unwrap();
        assert!(proxy.faces.len() <= 100);
        assert!(proxy.vertices.iter().all(|v| v.normal().is_some()));
    }

    #[test]
    fn simplified_welds_seams_before_capping() {
        // Every face on its own three vertices: all edges are open.
        let sphere = icosphere(2);
        let mut split = IndexedMesh::new();
        for tri in sphere.triangles() {
            let base = u32::try_from(split.vertices.len()).unwrap();
            split.vertices.extend([tri.v0, tri.v1, tri.v2].map(Vertex::new));
            split.faces.push([base, base + 1, base + 2]);
        }

        let proxy = generate_collision_mesh(&split, CollisionShape::Simplified, 100).unwrap();
        assert!(proxy.faces.len() <= 100);
        assert!(mesh_repair::validate_mesh(&proxy).is_watertight);
    }

    #[test]
    fn cap_applies_to_sphere() {
        let proxy = generate_collision_mesh(&icosphere(2), CollisionShape::BoundingSphere, 40)
            .unwrap();
        assert!(proxy.faces.len() <= 40);
    }

    #[test]
    fn small_cap_rejected() {
        let err = generate_collision_mesh(&unit_cube(), CollisionShape::BoundingBox, 3).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidConfig {
                stage: Stage::Collision,
                ..
            }
        ));
    }

    #[test]
    fn empty_mesh_rejected() {
        let err = generate_collision_mesh(&IndexedMesh::new(), CollisionShape::Simplified, 100)
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Geometry {
                reason: StageError::EmptyMesh,
                ..
            }
        ));
    }
}
