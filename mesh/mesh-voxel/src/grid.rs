//! Dense boolean occupancy grid.

use mesh_types::Aabb;
use nalgebra::Point3;

/// A dense 3D occupancy grid.
///
/// Sample `(ix, iy, iz)` sits at `origin + (ix, iy, iz) * pitch`. Values are
/// stored with x varying fastest. The grid is built for one resampling call
/// and dropped once the surface has been extracted.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    cells: Vec<bool>,
    dimensions: (usize, usize, usize),
    origin: Point3<f64>,
    pitch: f64,
}

impl OccupancyGrid {
    /// Create an all-empty grid.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_voxel::OccupancyGrid;
    /// use nalgebra::Point3;
    ///
    /// let grid = OccupancyGrid::new((4, 5, 6), Point3::origin(), 0.5);
    /// assert_eq!(grid.len(), 120);
    /// assert_eq!(grid.solid_count(), 0);
    /// ```
    #[must_use]
    pub fn new(dimensions: (usize, usize, usize), origin: Point3<f64>, pitch: f64) -> Self {
        let (nx, ny, nz) = dimensions;
        Self {
            cells: vec![false; nx * ny * nz],
            dimensions,
            origin,
            pitch,
        }
    }

    /// Number of cells a grid covering `bounds` would need.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    // Truncation: extents are finite and positive, ceil() of a ratio
    pub fn dimensions_for(bounds: &Aabb, pitch: f64, padding: usize) -> (usize, usize, usize) {
        let extent = bounds.size();
        let axis = |e: f64| (e / pitch).ceil() as usize + 1 + 2 * padding;
        (axis(extent.x), axis(extent.y), axis(extent.z))
    }

    /// Grid covering `bounds` with `padding` empty samples on every side.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_bounds(bounds: &Aabb, pitch: f64, padding: usize) -> Self {
        let pad = padding as f64 * pitch;
        let origin = Point3::new(bounds.min.x - pad, bounds.min.y - pad, bounds.min.z - pad);
        Self::new(Self::dimensions_for(bounds, pitch, padding), origin, pitch)
    }

    /// Grid dimensions `(nx, ny, nz)`.
    #[must_use]
    pub const fn dimensions(&self) -> (usize, usize, usize) {
        self.dimensions
    }

    /// Position of sample `(0, 0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// Spacing between samples.
    #[must_use]
    pub const fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Total number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True for a grid with no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of solid samples.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Linear index of `(ix, iy, iz)`.
    #[inline]
    #[must_use]
    pub const fn index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        ix + iy * self.dimensions.0 + iz * self.dimensions.0 * self.dimensions.1
    }

    /// Inverse of [`OccupancyGrid::index`].
    #[inline]
    #[must_use]
    pub const fn coords(&self, index: usize) -> (usize, usize, usize) {
        let (nx, ny, _) = self.dimensions;
        (index % nx, (index / nx) % ny, index / (nx * ny))
    }

    /// Occupancy at `(ix, iy, iz)`. Out-of-range samples are empty.
    #[inline]
    #[must_use]
    pub fn get(&self, ix: usize, iy: usize, iz: usize) -> bool {
        let (nx, ny, nz) = self.dimensions;
        ix < nx && iy < ny && iz < nz && self.cells[self.index(ix, iy, iz)]
    }

    /// Set occupancy at `(ix, iy, iz)`. Out-of-range writes are ignored.
    #[inline]
    pub fn set(&mut self, ix: usize, iy: usize, iz: usize, solid: bool) {
        let (nx, ny, nz) = self.dimensions;
        if ix < nx && iy < ny && iz < nz {
            let idx = self.index(ix, iy, iz);
            self.cells[idx] = solid;
        }
    }

    /// Occupancy by linear index.
    #[inline]
    #[must_use]
    pub fn get_index(&self, index: usize) -> bool {
        self.cells[index]
    }

    /// World-space position of a sample.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn position(&self, ix: usize, iy: usize, iz: usize) -> Point3<f64> {
        Point3::new(
            (ix as f64).mul_add(self.pitch, self.origin.x),
            (iy as f64).mul_add(self.pitch, self.origin.y),
            (iz as f64).mul_add(self.pitch, self.origin.z),
        )
    }

    /// Nearest sample to a world-space point, if inside the grid.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn nearest(&self, point: &Point3<f64>) -> Option<(usize, usize, usize)> {
        let offset = (point - self.origin) / self.pitch;
        let (nx, ny, nz) = self.dimensions;
        let round = |v: f64, n: usize| {
            let r = v.round();
            (r >= 0.0 && (r as usize) < n).then_some(r as usize)
        };
        Some((round(offset.x, nx)?, round(offset.y, ny)?, round(offset.z, nz)?))
    }

    /// Up to six face-adjacent neighbors of a linear index.
    pub(crate) fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + use<> {
        let (nx, ny, nz) = self.dimensions;
        let (x, y, z) = self.coords(index);
        let stride_y = nx;
        let stride_z = nx * ny;
        [
            (x > 0).then(|| index - 1),
            (x + 1 < nx).then(|| index + 1),
            (y > 0).then(|| index - stride_y),
            (y + 1 < ny).then(|| index + stride_y),
            (z > 0).then(|| index - stride_z),
            (z + 1 < nz).then(|| index + stride_z),
        ]
        .into_iter()
        .flatten()
    }

    /// True if the sample lies on the outer layer of the grid.
    pub(crate) fn is_border(&self, index: usize) -> bool {
        let (nx, ny, nz) = self.dimensions;
        let (x, y, z) = self.coords(index);
        x == 0 || y == 0 || z == 0 || x + 1 == nx || y + 1 == ny || z + 1 == nz
    }

    /// Raw occupancy slice.
    pub(crate) fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Replace every sample at once. Length must match.
    pub(crate) fn replace_cells(&mut self, cells: Vec<bool>) {
        debug_assert_eq!(cells.len(), self.cells.len());
        self.cells = cells;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn from_bounds_pads_every_side() {
        let bounds = Aabb::new(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
        let grid = OccupancyGrid::from_bounds(&bounds, 0.5, 2);

        assert_eq!(grid.dimensions(), (7, 9, 11));
        assert_relative_eq!(grid.origin().x, -1.0);
        let far = grid.position(6, 8, 10);
        assert_relative_eq!(far.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(far.y, 3.0, epsilon = 1e-12);
        assert_relative_eq!(far.z, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn index_roundtrip_and_neighbors() {
        let grid = OccupancyGrid::new((3, 4, 5), Point3::origin(), 1.0);
        let idx = grid.index(1, 2, 3);
        assert_eq!(grid.coords(idx), (1, 2, 3));
        assert_eq!(grid.neighbors(idx).count(), 6);
        assert!(!grid.is_border(idx));

        let corner = grid.index(0, 0, 0);
        assert_eq!(grid.neighbors(corner).count(), 3);
        assert!(grid.is_border(corner));
    }

    #[test]
    fn get_set_and_nearest() {
        let mut grid = OccupancyGrid::new((5, 5, 5), Point3::origin(), 1.0);
        grid.set(2, 3, 4, true);
        assert!(grid.get(2, 3, 4));
        assert!(!grid.get(9, 9, 9));
        grid.set(9, 9, 9, true);
        assert_eq!(grid.solid_count(), 1);

        assert_eq!(grid.nearest(&Point3::new(1.6, 2.4, 0.1)), Some((2, 2, 0)));
        assert_eq!(grid.nearest(&Point3::new(-0.6, 0.0, 0.0)), None);
    }
}
