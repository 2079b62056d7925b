//! Scan conversion of a triangle soup into occupancy.
//!
//! Interior samples are found by ray parity: for each grid column along an
//! axis, the crossings of a ray with the triangles binned to that column are
//! sorted, and a sample is inside when an odd number of crossings lie before
//! it. Three axes vote and the majority wins, which keeps a single ray that
//! slips through a crack from streaking a whole row. The surface itself is
//! then rasterized so open sheets and thin shells still produce occupancy.

use mesh_types::{IndexedMesh, MeshTopology, Triangle};
use nalgebra::Point3;
use rayon::prelude::*;

use crate::grid::OccupancyGrid;

/// Fraction of a pitch the rays are nudged by so they do not run exactly
/// through grid-aligned vertices and edges.
const RAY_JITTER: [f64; 2] = [1.234_567e-4, 2.718_281e-4];

/// Mark samples inside the mesh by three-axis ray parity majority.
pub fn scan_parity(grid: &mut OccupancyGrid, mesh: &IndexedMesh) {
    let mut votes = vec![0u8; grid.len()];

    for axis in 0..3 {
        for (index, inside) in parity_along(grid, mesh, axis) {
            if inside {
                votes[index] += 1;
            }
        }
    }

    let cells = votes
        .iter()
        .zip(grid.cells())
        .map(|(&v, &solid)| solid || v >= 2)
        .collect();
    grid.replace_cells(cells);
}

/// Parity result for every sample, scanning along `axis`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn parity_along(grid: &OccupancyGrid, mesh: &IndexedMesh, axis: usize) -> Vec<(usize, bool)> {
    let (b, c) = ((axis + 1) % 3, (axis + 2) % 3);
    let dims = [grid.dimensions().0, grid.dimensions().1, grid.dimensions().2];
    let (na, nb, nc) = (dims[axis], dims[b], dims[c]);
    let origin = grid.origin();
    let pitch = grid.pitch();

    // Bin triangles by the columns their projection may cover.
    let mut columns: Vec<Vec<u32>> = vec![Vec::new(); nb * nc];
    let index_range = |lo: f64, hi: f64, o: f64, n: usize| {
        let first = ((lo - o) / pitch).floor().max(0.0) as usize;
        let last = (((hi - o) / pitch).ceil().max(0.0) as usize).min(n - 1);
        first..=last
    };
    for (face_idx, tri) in mesh.triangles().enumerate() {
        let pts = [tri.v0, tri.v1, tri.v2];
        let (bmin, bmax) = min_max(pts.iter().map(|p| p[b]));
        let (cmin, cmax) = min_max(pts.iter().map(|p| p[c]));
        for jc in index_range(cmin, cmax, origin[c], nc) {
            for jb in index_range(bmin, bmax, origin[b], nb) {
                columns[jb + jc * nb].push(face_idx as u32);
            }
        }
    }

    columns
        .par_iter()
        .enumerate()
        .flat_map_iter(|(column, faces)| {
            let (jb, jc) = (column % nb, column / nb);
            let rb = (jb as f64 + RAY_JITTER[0]).mul_add(pitch, origin[b]);
            let rc = (jc as f64 + RAY_JITTER[1]).mul_add(pitch, origin[c]);

            let mut crossings: Vec<f64> = faces
                .iter()
                .filter_map(|&f| {
                    let [i0, i1, i2] = mesh.faces[f as usize];
                    ray_crossing(
                        [
                            mesh.vertices[i0 as usize].position,
                            mesh.vertices[i1 as usize].position,
                            mesh.vertices[i2 as usize].position,
                        ],
                        axis,
                        (b, c),
                        (rb, rc),
                    )
                })
                .collect();
            crossings.sort_by(f64::total_cmp);

            let mut next = 0;
            (0..na).map(move |ia| {
                let a = (ia as f64).mul_add(pitch, origin[axis]);
                while next < crossings.len() && crossings[next] < a {
                    next += 1;
                }
                let mut coords = [0usize; 3];
                coords[axis] = ia;
                coords[b] = jb;
                coords[c] = jc;
                (grid.index(coords[0], coords[1], coords[2]), next % 2 == 1)
            })
        })
        .collect()
}

/// Coordinate along `axis` where the ray through `(rb, rc)` crosses the
/// triangle, if it does.
fn ray_crossing(
    pts: [Point3<f64>; 3],
    axis: usize,
    (b, c): (usize, usize),
    (rb, rc): (f64, f64),
) -> Option<f64> {
    let (p0, p1, p2) = (pts[0], pts[1], pts[2]);
    let e1 = (p1[b] - p0[b], p1[c] - p0[c]);
    let e2 = (p2[b] - p0[b], p2[c] - p0[c]);
    let denom = e1.0.mul_add(e2.1, -(e1.1 * e2.0));
    if denom.abs() < f64::EPSILON * (e1.0.abs() + e1.1.abs()) * (e2.0.abs() + e2.1.abs()) {
        return None;
    }

    let q = (rb - p0[b], rc - p0[c]);
    let w1 = q.0.mul_add(e2.1, -(q.1 * e2.0)) / denom;
    let w2 = e1.0.mul_add(q.1, -(e1.1 * q.0)) / denom;
    let w0 = 1.0 - w1 - w2;
    if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
        return None;
    }

    Some(w2.mul_add(p2[axis], w0.mul_add(p0[axis], w1 * p1[axis])))
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Mark the sample nearest to every point of the surface.
///
/// Each triangle is sampled on a barycentric lattice no coarser than half a
/// pitch, so no surface point is farther than a pitch from a marked sample.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn rasterize_surface(grid: &mut OccupancyGrid, mesh: &IndexedMesh) {
    let sampler: &OccupancyGrid = grid;
    let step = sampler.pitch() * 0.5;
    let triangles: Vec<Triangle> = mesh.triangles().collect();

    let marked: Vec<usize> = triangles
        .par_iter()
        .flat_map_iter(|tri| {
            let n = (tri.max_edge_length() / step).ceil().max(1.0) as usize;
            let inv = 1.0 / n as f64;
            (0..=n)
                .flat_map(move |i| (0..=n - i).map(move |j| (i, j)))
                .filter_map(move |(i, j)| {
                    let p = tri.point_at(i as f64 * inv, j as f64 * inv);
                    sampler
                        .nearest(&p)
                        .map(|(x, y, z)| sampler.index(x, y, z))
                })
        })
        .collect();

    let mut cells = grid.cells().to_vec();
    for index in marked {
        cells[index] = true;
    }
    grid.replace_cells(cells);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{Aabb, MeshBounds, icosphere, unit_cube};

    fn grid_for(mesh: &IndexedMesh, pitch: f64) -> OccupancyGrid {
        let bounds: Aabb = mesh.bounds();
        OccupancyGrid::from_bounds(&bounds, pitch, 2)
    }

    #[test]
    fn parity_fills_cube_interior() {
        let cube = unit_cube();
        let mut grid = grid_for(&cube, 0.1);
        scan_parity(&mut grid, &cube);

        // Origin is at -0.2, so sample 7 is at x = 0.5.
        assert!(grid.get(7, 7, 7));
        assert!(!grid.get(0, 0, 0));
        assert!(!grid.get(7, 7, 0));
        // Samples at 0.1..0.9 on each axis are strictly inside: 9^3, plus the
        // ones sitting exactly on the faces at 0.0 or 1.0 which may go either way.
        let solid = grid.solid_count();
        assert!((729..=1331).contains(&solid), "solid = {solid}");
    }

    #[test]
    fn parity_ignores_inside_out_winding() {
        let mut sphere = icosphere(2);
        let mut grid_a = grid_for(&sphere, 0.1);
        scan_parity(&mut grid_a, &sphere);

        sphere.flip_normals();
        let mut grid_b = grid_for(&sphere, 0.1);
        scan_parity(&mut grid_b, &sphere);

        assert_eq!(grid_a.cells(), grid_b.cells());
    }

    #[test]
    fn open_mesh_still_gets_surface_shell() {
        let mut cube = unit_cube();
        cube.faces.truncate(2); // only the bottom square remains
        cube.vertices.iter_mut().for_each(|v| v.position.z *= 0.5);

        let mut grid = grid_for(&cube, 0.1);
        rasterize_surface(&mut grid, &cube);
        let solid = grid.solid_count();
        // The bottom square covers 11 x 11 samples.
        assert!(solid >= 121, "solid = {solid}");
    }

    #[test]
    fn crossing_interpolates_height() {
        let tri = [
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(0.0, 2.0, 3.0),
        ];
        // Ray along z through (0.5, 0.5).
        let hit = ray_crossing(tri, 2, (0, 1), (0.5, 0.5));
        assert!(hit.is_some_and(|z| (z - 1.5).abs() < 1e-12));
        assert!(ray_crossing(tri, 2, (0, 1), (3.0, 3.0)).is_none());
    }
}
