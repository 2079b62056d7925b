//! Spherical projection.

use std::f64::consts::{PI, TAU};

use mesh_types::{IndexedMesh, Point2, Vector3};

/// Horizontal extent, relative to the radius, below which a vertex counts
/// as lying on the polar axis.
const AXIS_TOLERANCE: f64 = 1e-12;

/// Assign UVs by projecting every vertex onto a sphere around the vertex
/// mean.
///
/// `v` is the polar angle from +Z over pi, `u` the azimuth measured from -X
/// over 2 pi. Vertices on the polar axis get `u = 0.5` and `v` of exactly 0
/// (north) or 1 (south), at any mesh scale. Connectivity is
/// unchanged and no seam vertices are added, so triangles crossing the
/// `u = 0` meridian interpolate across the whole texture.
///
/// # Example
///
/// ```
/// use mesh_types::icosphere;
/// use mesh_uv::spherical_projection;
///
/// let mapped = spherical_projection(&icosphere(1));
/// assert!(mapped.has_uvs());
/// ```
#[must_use]
pub fn spherical_projection(mesh: &IndexedMesh) -> IndexedMesh {
    let mut out = mesh.clone();
    if mesh.vertices.is_empty() {
        return out;
    }

    #[allow(clippy::cast_precision_loss)]
    // Precision: vertex counts stay far below 2^52
    let count = mesh.vertices.len() as f64;
    let centroid = mesh
        .vertices
        .iter()
        .map(|v| v.position.coords)
        .sum::<Vector3<f64>>()
        / count;

    for vertex in &mut out.vertices {
        vertex.attributes.uv = Some(spherical_uv(&(vertex.position.coords - centroid)));
    }
    out
}

/// UV of a direction from the projection center.
fn spherical_uv(d: &Vector3<f64>) -> Point2<f64> {
    let r = d.norm();
    if r <= 0.0 || r.is_nan() {
        return Point2::new(0.5, 0.5);
    }
    if d.x.hypot(d.y) <= AXIS_TOLERANCE * r {
        return Point2::new(0.5, if d.z > 0.0 { 0.0 } else { 1.0 });
    }
    let v = (d.z / r).clamp(-1.0, 1.0).acos() / PI;
    let u = (d.y.atan2(d.x) + PI).rem_euclid(TAU) / TAU;
    Point2::new(u, v)
}
