//! Surface extraction by marching tetrahedra.
//!
//! Each grid cube is split into six tetrahedra sharing the main diagonal
//! (corner 0 to corner 7). Corner bit 1 is +X, bit 2 is +Y and bit 4 is +Z.
//! Surface vertices sit at the midpoint of every grid edge whose ends
//! disagree, so vertices are shared exactly between neighboring cubes and
//! the result is a closed two-manifold whenever no solid sample touches the
//! grid border.

use hashbrown::HashMap;
use mesh_types::{IndexedMesh, Vertex};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::grid::OccupancyGrid;

/// Grid edge between two linear sample indices, smaller index first.
type EdgeKey = (usize, usize);

/// The six tetrahedra of a cube, as corner numbers.
const CUBE_TETS: [[usize; 4]; 6] = [
    [0, 1, 3, 7],
    [0, 1, 5, 7],
    [0, 2, 3, 7],
    [0, 2, 6, 7],
    [0, 4, 5, 7],
    [0, 4, 6, 7],
];

/// Extract the boundary between solid and empty samples as a triangle mesh.
///
/// Faces are wound so their normals point from solid toward empty samples.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
// Truncation: vertex count is bounded by the grid edge count, which the
// cell limit keeps far below u32::MAX
pub fn extract_surface(grid: &OccupancyGrid) -> IndexedMesh {
    let (nx, ny, nz) = grid.dimensions();
    if nx < 2 || ny < 2 || nz < 2 {
        return IndexedMesh::new();
    }

    let keyed: Vec<[EdgeKey; 3]> = (0..nz - 1)
        .into_par_iter()
        .flat_map_iter(|z| {
            let mut slab = Vec::new();
            for y in 0..ny - 1 {
                for x in 0..nx - 1 {
                    march_cube(grid, (x, y, z), &mut slab);
                }
            }
            slab
        })
        .collect();

    let mut mesh = IndexedMesh::with_capacity(keyed.len() / 2, keyed.len());
    let mut vertex_for: HashMap<EdgeKey, u32> = HashMap::with_capacity(keyed.len() / 2);
    for tri in keyed {
        let face = tri.map(|key| {
            *vertex_for.entry(key).or_insert_with(|| {
                let index = mesh.vertices.len() as u32;
                mesh.vertices.push(Vertex::new(edge_midpoint(grid, key)));
                index
            })
        });
        mesh.faces.push(face);
    }
    mesh
}

fn march_cube(grid: &OccupancyGrid, (x, y, z): (usize, usize, usize), out: &mut Vec<[EdgeKey; 3]>) {
    let corners: [usize; 8] = std::array::from_fn(|bit| {
        grid.index(x + (bit & 1), y + ((bit >> 1) & 1), z + ((bit >> 2) & 1))
    });
    let inside = corners.map(|c| grid.get_index(c));
    if inside.iter().all(|&s| s == inside[0]) {
        return;
    }

    for tet in CUBE_TETS {
        let ids = tet.map(|c| corners[c]);
        let solid = tet.map(|c| inside[c]);
        march_tet(grid, ids, solid, out);
    }
}

fn march_tet(grid: &OccupancyGrid, ids: [usize; 4], solid: [bool; 4], out: &mut Vec<[EdgeKey; 3]>) {
    let (mut ins, mut outs) = (Vec::with_capacity(4), Vec::with_capacity(4));
    for (&id, &s) in ids.iter().zip(&solid) {
        if s {
            ins.push(id);
        } else {
            outs.push(id);
        }
    }

    let e = edge_key;
    let triangles: Vec<[EdgeKey; 3]> = match (ins.as_slice(), outs.as_slice()) {
        (&[a], &[b, c, d]) => vec![[e(a, b), e(a, c), e(a, d)]],
        (&[a, b, c], &[d]) => vec![[e(d, a), e(d, b), e(d, c)]],
        (&[a, b], &[c, d]) => vec![
            [e(a, c), e(a, d), e(b, d)],
            [e(a, c), e(b, d), e(b, c)],
        ],
        _ => return,
    };

    let outward = centroid(grid, &outs) - centroid(grid, &ins);
    for mut tri in triangles {
        let [p0, p1, p2] = tri.map(|key| edge_midpoint(grid, key));
        if (p1 - p0).cross(&(p2 - p0)).dot(&outward) < 0.0 {
            tri.swap(1, 2);
        }
        out.push(tri);
    }
}

fn edge_key(a: usize, b: usize) -> EdgeKey {
    if a < b { (a, b) } else { (b, a) }
}

fn edge_midpoint(grid: &OccupancyGrid, (a, b): EdgeKey) -> Point3<f64> {
    let (ax, ay, az) = grid.coords(a);
    let (bx, by, bz) = grid.coords(b);
    nalgebra::center(&grid.position(ax, ay, az), &grid.position(bx, by, bz))
}

#[allow(clippy::cast_precision_loss)]
fn centroid(grid: &OccupancyGrid, ids: &[usize]) -> Vector3<f64> {
    let sum: Vector3<f64> = ids
        .iter()
        .map(|&i| {
            let (x, y, z) = grid.coords(i);
            grid.position(x, y, z).coords
        })
        .sum();
    sum / ids.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_repair::{MeshAdjacency, count_inconsistent_edges};

    fn block(n: usize, lo: usize, hi: usize) -> OccupancyGrid {
        let mut grid = OccupancyGrid::new((n, n, n), Point3::origin(), 1.0);
        for z in lo..=hi {
            for y in lo..=hi {
                for x in lo..=hi {
                    grid.set(x, y, z, true);
                }
            }
        }
        grid
    }

    #[test]
    fn tets_tile_the_cube() {
        // Each tet walks 0 -> p0 -> p0|p1 -> 7 along distinct axes.
        for [a, b, c, d] in CUBE_TETS {
            assert_eq!(a, 0);
            assert_eq!(d, 7);
            assert_eq!((b as u32).count_ones(), 1);
            assert_eq!((c as u32).count_ones(), 2);
            assert_eq!(b & c, b);
        }
    }

    #[test]
    fn single_sample_gives_closed_shell() {
        // The sample has 14 neighbors in the split and sits in 24 tetrahedra.
        let grid = block(3, 1, 1);
        let mesh = extract_surface(&grid);

        assert_eq!(mesh.vertices.len(), 14);
        assert_eq!(mesh.faces.len(), 24);
        assert!(MeshAdjacency::build(&mesh.faces).is_watertight());
        assert_eq!(count_inconsistent_edges(&mesh.faces), 0);
        assert!((mesh.signed_volume() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn block_surface_is_closed_and_outward() {
        let grid = block(8, 2, 5);
        let mesh = extract_surface(&grid);

        let adjacency = MeshAdjacency::build(&mesh.faces);
        assert!(adjacency.is_watertight());
        assert!(adjacency.is_manifold());
        assert_eq!(count_inconsistent_edges(&mesh.faces), 0);
        // The surface runs half a sample outside the solid samples, with
        // chamfered edges, so its volume lies between 3^3 and 5^3.
        let volume = mesh.signed_volume();
        assert!(volume > 27.0 && volume < 125.0, "volume = {volume}");
        assert!((volume - 61.25).abs() < 1e-9);
    }

    #[test]
    fn empty_grid_has_no_surface() {
        let grid = OccupancyGrid::new((4, 4, 4), Point3::origin(), 1.0);
        assert!(extract_surface(&grid).faces.is_empty());
    }
}
