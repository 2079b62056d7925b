//! Taubin lambda/mu smoothing.
//!
//! Plain Laplacian smoothing shrinks a closed mesh toward its centroid. Taubin
//! alternates a shrinking step (`lambda > 0`) with an inflating step
//! (`mu < 0`), which acts as a low-pass filter and keeps volume nearly
//! constant.
//!
//! # References
//!
//! Taubin, G. (1995). "A Signal Processing Approach to Fair Surface Design".
//! SIGGRAPH '95.

use std::fmt;

use mesh_types::{IndexedMesh, Point3};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::SmoothingResult;
use crate::params::SmoothParams;

/// Result of Taubin smoothing.
#[derive(Debug, Clone)]
pub struct SmoothResult {
    /// The smoothed mesh. Faces are unchanged.
    pub mesh: IndexedMesh,

    /// Number of lambda/mu iterations performed.
    pub iterations: u32,

    /// Largest distance any vertex moved from its input position.
    pub max_displacement: f64,
}

impl fmt::Display for SmoothResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Smooth: {} iterations over {} vertices, max displacement {:.4}",
            self.iterations,
            self.mesh.vertices.len(),
            self.max_displacement
        )
    }
}

/// Smooth a mesh with Taubin's lambda/mu scheme.
///
/// Each iteration moves every vertex by `lambda` times the offset to the
/// centroid of its 1-ring, then by `mu` times the new offset. Vertices
/// referenced by no face stay where they are. Connectivity and vertex count
/// never change. If the input carried vertex normals they are recomputed
/// from the smoothed positions.
///
/// # Errors
///
/// Returns [`SmoothError::InvalidParameter`](crate::SmoothError::InvalidParameter)
/// if `params` fail validation.
///
/// # Example
///
/// ```
/// use mesh_smooth::{SmoothParams, smooth_taubin};
/// use mesh_types::icosphere;
///
/// let sphere = icosphere(2);
/// let result = smooth_taubin(&sphere, &SmoothParams::default()).unwrap();
/// assert_eq!(result.mesh.faces, sphere.faces);
/// assert!((result.mesh.volume() - sphere.volume()).abs() < 0.02 * sphere.volume());
/// ```
pub fn smooth_taubin(mesh: &IndexedMesh, params: &SmoothParams) -> SmoothingResult<SmoothResult> {
    params.validate()?;

    info!(
        vertices = mesh.vertices.len(),
        iterations = params.iterations,
        lambda = params.lambda,
        mu = params.mu,
        "Starting Taubin smoothing"
    );

    let neighbors = build_vertex_neighbors(mesh);
    let original: Vec<Point3<f64>> = mesh.vertices.iter().map(|v| v.position).collect();
    let mut positions = original.clone();

    for iteration in 0..params.iterations {
        positions = laplacian_step(&positions, &neighbors, params.lambda);
        positions = laplacian_step(&positions, &neighbors, params.mu);
        debug!(iteration, "Taubin iteration done");
    }

    let max_displacement = original
        .par_iter()
        .zip(positions.par_iter())
        .map(|(a, b)| (b - a).norm())
        .reduce(|| 0.0, f64::max);

    let mut smoothed = mesh.clone();
    for (vertex, position) in smoothed.vertices.iter_mut().zip(positions) {
        vertex.position = position;
    }
    if mesh.vertices.iter().any(|v| v.normal().is_some()) {
        smoothed.compute_vertex_normals();
    }

    info!(max_displacement, "Taubin smoothing complete");

    Ok(SmoothResult {
        mesh: smoothed,
        iterations: params.iterations,
        max_displacement,
    })
}

/// Move every vertex toward its 1-ring centroid by `factor`.
fn laplacian_step(
    positions: &[Point3<f64>],
    neighbors: &[Vec<u32>],
    factor: f64,
) -> Vec<Point3<f64>> {
    positions
        .par_iter()
        .zip(neighbors.par_iter())
        .map(|(&p, ring)| {
            if ring.is_empty() {
                return p;
            }
            #[allow(clippy::cast_precision_loss)]
            // Precision: ring sizes are tiny
            let n = ring.len() as f64;
            let sum = ring
                .iter()
                .fold(nalgebra::Vector3::zeros(), |acc, &j| {
                    acc + positions[j as usize].coords
                });
            let centroid = Point3::from(sum / n);
            p + (centroid - p) * factor
        })
        .collect()
}

/// Sorted, deduplicated 1-ring of every vertex.
fn build_vertex_neighbors(mesh: &IndexedMesh) -> Vec<Vec<u32>> {
    let n = mesh.vertices.len();
    let mut neighbors: Vec<Vec<u32>> = vec![Vec::new(); n];
    for &[a, b, c] in &mesh.faces {
        for (from, to) in [(a, b), (b, c), (c, a)] {
            if from == to || from as usize >= n || to as usize >= n {
                continue;
            }
            neighbors[from as usize].push(to);
            neighbors[to as usize].push(from);
        }
    }
    for ring in &mut neighbors {
        ring.sort_unstable();
        ring.dedup();
    }
    neighbors
}
