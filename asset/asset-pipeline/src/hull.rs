//! Incremental convex hull of a point set.
//!
//! Points are added one at a time. Each point outside the current hull
//! removes the faces it can see and is joined to their horizon, so the hull
//! stays closed and outward-wound after every step.

use hashbrown::HashSet;
use mesh_types::{IndexedMesh, Point3, Vertex};

/// Hull of `points`, wound outward, with only its own corners as vertices.
///
/// Points within `tolerance` of a face's plane count as lying on it.
/// Returns `None` when every point lies within `tolerance` of one plane.
pub fn convex_hull(points: &[Point3<f64>], tolerance: f64) -> Option<IndexedMesh> {
    let seed = initial_simplex(points, tolerance)?;
    let [a, b, c, d] = seed;
    let mut faces: Vec<[usize; 3]> = [([a, b, c], d), ([a, d, b], c), ([a, c, d], b), ([b, d, c], a)]
        .into_iter()
        .map(|(face, opposite)| {
            if plane_distance(points, face, &points[opposite]) > 0.0 {
                [face[0], face[2], face[1]]
            } else {
                face
            }
        })
        .collect();

    for (p, point) in points.iter().enumerate() {
        if seed.contains(&p) {
            continue;
        }
        let (visible, kept): (Vec<[usize; 3]>, Vec<[usize; 3]>) = std::mem::take(&mut faces)
            .into_iter()
            .partition(|&f| plane_distance(points, f, point) > tolerance);
        faces = kept;
        if visible.is_empty() {
            continue;
        }

        // Horizon edges are the visible edges whose twin is not visible.
        let edges = |f: &[usize; 3]| [(f[0], f[1]), (f[1], f[2]), (f[2], f[0])];
        let seen: HashSet<(usize, usize)> = visible.iter().flat_map(edges).collect();
        faces.extend(
            visible
                .iter()
                .flat_map(edges)
                .filter(|&(u, v)| !seen.contains(&(v, u)))
                .map(|(u, v)| [u, v, p]),
        );
    }

    Some(compact(points, &faces))
}

/// Four affinely independent points, or `None` for flat input.
fn initial_simplex(points: &[Point3<f64>], tolerance: f64) -> Option<[usize; 4]> {
    let first = points.first()?;
    let (a, _) = farthest(points, |p| (p - first).norm())?;
    let (b, ab) = farthest(points, |p| (p - points[a]).norm())?;
    if ab <= tolerance {
        return None;
    }
    let axis = (points[b] - points[a]) / ab;
    let (c, line) = farthest(points, |p| axis.cross(&(p - points[a])).norm())?;
    if line <= tolerance {
        return None;
    }
    let (d, plane) = farthest(points, |p| plane_distance(points, [a, b, c], p).abs())?;
    if plane <= tolerance {
        return None;
    }
    Some([a, b, c, d])
}

fn farthest(
    points: &[Point3<f64>],
    distance: impl Fn(&Point3<f64>) -> f64,
) -> Option<(usize, f64)> {
    points
        .iter()
        .map(distance)
        .enumerate()
        .max_by(|x, y| x.1.total_cmp(&y.1))
}

/// Signed distance from the plane of `face`, positive on its outer side.
fn plane_distance(points: &[Point3<f64>], face: [usize; 3], p: &Point3<f64>) -> f64 {
    let [a, b, c] = face.map(|i| points[i]);
    let normal = (b - a).cross(&(c - a));
    let length = normal.norm();
    if length <= 0.0 {
        return 0.0;
    }
    normal.dot(&(p - a)) / length
}

#[allow(clippy::cast_possible_truncation)]
// Truncation: hull corners are a subset of a u32-indexed mesh
fn compact(points: &[Point3<f64>], faces: &[[usize; 3]]) -> IndexedMesh {
    let mut remap = vec![u32::MAX; points.len()];
    let mut mesh = IndexedMesh::new();
    for face in faces {
        let mapped = face.map(|i| {
            if remap[i] == u32::MAX {
                remap[i] = mesh.vertices.len() as u32;
                mesh.vertices.push(Vertex::new(points[i]));
            }
            remap[i]
        });
        mesh.faces.push(mapped);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_repair::validate_mesh;
    use mesh_types::{icosphere, unit_cube};

    fn positions(mesh: &IndexedMesh) -> Vec<Point3<f64>> {
        mesh.vertices.iter().map(|v| v.position).collect()
    }

    #[test]
    fn cube_hull_is_the_cube() {
        let hull = convex_hull(&positions(&unit_cube()), 1e-9).unwrap();
        assert_eq!(hull.vertices.len(), 8);
        assert_eq!(hull.faces.len(), 12);
        assert_relative_eq!(hull.signed_volume(), 1.0, epsilon = 1e-12);
        assert!(validate_mesh(&hull).is_watertight);
    }

    #[test]
    fn interior_points_are_dropped() {
        let mut points = positions(&icosphere(1));
        points.extend((0..20).map(|i| {
            let t = f64::from(i) / 40.0;
            Point3::new(t, -t, t * 0.5)
        }));
        let hull = convex_hull(&points, 1e-9).unwrap();
        assert_eq!(hull.vertices.len(), 42);
        assert_eq!(hull.faces.len(), 80);
        assert!(hull.signed_volume() > 0.0);
    }

    #[test]
    fn every_point_is_inside_every_face() {
        let mut points = positions(&icosphere(2));
        let radii = [1.0, 1.1, 1.2, 0.9, 1.3, 1.05, 0.95];
        for (i, p) in points.iter_mut().enumerate() {
            p.coords *= radii[i % radii.len()];
        }
        let hull = convex_hull(&points, 1e-9).unwrap();
        let report = validate_mesh(&hull);
        assert!(report.is_watertight, "{report}");
        assert!(report.is_manifold, "{report}");

        let corners = positions(&hull);
        for face in &hull.faces {
            let face = face.map(|i| i as usize);
            for p in &points {
                assert!(plane_distance(&corners, face, p) <= 1e-9);
            }
        }
    }

    #[test]
    fn flat_points_have_no_hull() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.5, 0.5, 0.0),
        ];
        assert!(convex_hull(&points, 1e-9).is_none());
        assert!(convex_hull(&points[..1], 1e-9).is_none());
        assert!(convex_hull(&[], 1e-9).is_none());
    }
}
