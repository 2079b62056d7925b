//! Result type for voxel resampling.

use mesh_types::IndexedMesh;

/// Result of [`resample_to_watertight`](crate::resample_to_watertight).
#[derive(Debug, Clone)]
pub struct ResampleResult {
    /// Closed, manifold, outward-wound surface.
    pub mesh: IndexedMesh,

    /// Samples along each axis, padding included.
    pub grid_dimensions: (usize, usize, usize),

    /// Sample spacing in mesh units.
    pub pitch: f64,

    /// Solid samples after closing and cavity filling.
    pub solid_voxels: usize,

    /// Empty samples enclosed by the surface that were filled.
    pub cavities_filled: usize,

    /// Fan triangles added to close leftover boundary loops.
    pub fans_added: usize,
}

impl ResampleResult {
    /// Total number of samples in the grid.
    #[must_use]
    pub const fn grid_cells(&self) -> usize {
        self.grid_dimensions.0 * self.grid_dimensions.1 * self.grid_dimensions.2
    }
}

impl std::fmt::Display for ResampleResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (nx, ny, nz) = self.grid_dimensions;
        write!(
            f,
            "Resample: {nx}x{ny}x{nz} grid at pitch {:.4}, {} solid -> {} vertices, {} faces",
            self.pitch,
            self.solid_voxels,
            self.mesh.vertices.len(),
            self.mesh.faces.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_grid() {
        let result = ResampleResult {
            mesh: IndexedMesh::new(),
            grid_dimensions: (4, 5, 6),
            pitch: 0.25,
            solid_voxels: 12,
            cavities_filled: 0,
            fans_added: 0,
        };
        assert_eq!(result.grid_cells(), 120);
        let text = result.to_string();
        assert!(text.contains("4x5x6"));
        assert!(text.contains("12 solid"));
    }
}
