//! Voxel resampling parameters.

use crate::error::{VoxelError, VoxelResult};

/// Configuration for [`resample_to_watertight`](crate::resample_to_watertight).
///
/// # Example
///
/// ```
/// use mesh_voxel::VoxelParams;
///
/// let params = VoxelParams::default().with_divisions(128).with_closing_radius(2);
/// assert_eq!(params.divisions, 128);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelParams {
    /// Cells along the bounding-box diagonal: pitch = diagonal / divisions.
    /// Default: 256
    pub divisions: u32,

    /// Explicit cell pitch. Overrides `divisions` when set.
    pub pitch: Option<f64>,

    /// Empty cells added around the bounding box on every side. Raised to
    /// `closing_radius + 1` if smaller so closing never touches the border.
    /// Default: 2
    pub padding: usize,

    /// Dilate/erode steps of the morphological closing. Zero disables it.
    /// Default: 1
    pub closing_radius: usize,

    /// Upper bound on grid cells.
    /// Default: 2^27
    pub max_cells: usize,
}

impl Default for VoxelParams {
    fn default() -> Self {
        Self {
            divisions: 256,
            pitch: None,
            padding: 2,
            closing_radius: 1,
            max_cells: 1 << 27,
        }
    }
}

impl VoxelParams {
    /// Coarse grid for previews and tests.
    #[must_use]
    pub fn preview() -> Self {
        Self {
            divisions: 32,
            ..Self::default()
        }
    }

    /// Fine grid for hero assets.
    #[must_use]
    pub fn high_quality() -> Self {
        Self {
            divisions: 384,
            ..Self::default()
        }
    }

    /// Set the number of divisions along the diagonal.
    #[must_use]
    pub const fn with_divisions(mut self, divisions: u32) -> Self {
        self.divisions = divisions;
        self
    }

    /// Set an explicit pitch.
    #[must_use]
    pub const fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = Some(pitch);
        self
    }

    /// Set the closing radius.
    #[must_use]
    pub const fn with_closing_radius(mut self, radius: usize) -> Self {
        self.closing_radius = radius;
        self
    }

    /// Set the padding in cells.
    #[must_use]
    pub const fn with_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    /// Padding actually used: at least one empty ring beyond the closing.
    #[must_use]
    pub fn effective_padding(&self) -> usize {
        self.padding.max(self.closing_radius + 1)
    }

    /// Cell pitch for a mesh with the given bounding-box diagonal.
    #[must_use]
    pub fn pitch_for(&self, diagonal: f64) -> f64 {
        self.pitch
            .unwrap_or_else(|| diagonal / f64::from(self.divisions))
    }

    /// Check ranges.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::InvalidParams`] naming the offending field.
    pub fn validate(&self) -> VoxelResult<()> {
        if self.divisions < 2 {
            return Err(VoxelError::InvalidParams {
                name: "divisions",
                reason: format!("must be at least 2, got {}", self.divisions),
            });
        }
        match self.pitch {
            Some(pitch) if !(pitch.is_finite() && pitch > 0.0) => Err(VoxelError::InvalidParams {
                name: "pitch",
                reason: format!("must be positive and finite, got {pitch}"),
            }),
            _ => Ok(()),
        }
    }
}
