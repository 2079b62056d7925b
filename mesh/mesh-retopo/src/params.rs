//! Retopology parameters.

use crate::error::{RetopoError, RetopologyResult};

/// Configuration for [`retopologize`](crate::retopologize).
///
/// # Example
///
/// ```
/// use mesh_retopo::RetopoParams;
///
/// let params = RetopoParams::for_target(2000).with_max_subdivision_passes(2);
/// assert_eq!(params.target_faces, 2000);
/// assert_eq!(params.tolerance(), 20);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetopoParams {
    /// Face count to aim for.
    /// Default: 8000
    pub target_faces: usize,

    /// Weld distance for the post-pass. `None` scales with the mesh
    /// (bounding-box diagonal * 1e-6).
    pub weld_epsilon: Option<f64>,

    /// Area below which faces are dropped in the post-pass. `None` uses the
    /// square of the weld distance.
    pub degenerate_area: Option<f64>,

    /// Allowed deviation from the target as a fraction of it.
    /// Default: 0.01
    pub tolerance_ratio: f64,

    /// Lower bound on the allowed deviation, in faces.
    /// Default: 2
    pub min_tolerance: usize,

    /// Upper bound on 1-to-4 subdivision passes.
    /// Default: 4
    pub max_subdivision_passes: u32,
}

impl Default for RetopoParams {
    fn default() -> Self {
        Self {
            target_faces: 8000,
            weld_epsilon: None,
            degenerate_area: None,
            tolerance_ratio: 0.01,
            min_tolerance: 2,
            max_subdivision_passes: 4,
        }
    }
}

impl RetopoParams {
    /// Default settings with a different face budget.
    #[must_use]
    pub fn for_target(target_faces: usize) -> Self {
        Self {
            target_faces,
            ..Self::default()
        }
    }

    /// Set the face budget.
    #[must_use]
    pub const fn with_target_faces(mut self, target_faces: usize) -> Self {
        self.target_faces = target_faces;
        self
    }

    /// Set an absolute weld distance.
    #[must_use]
    pub const fn with_weld_epsilon(mut self, epsilon: f64) -> Self {
        self.weld_epsilon = Some(epsilon);
        self
    }

    /// Set an absolute degenerate-area threshold.
    #[must_use]
    pub const fn with_degenerate_area(mut self, area: f64) -> Self {
        self.degenerate_area = Some(area);
        self
    }

    /// Set the relative tolerance.
    #[must_use]
    pub const fn with_tolerance_ratio(mut self, ratio: f64) -> Self {
        self.tolerance_ratio = ratio;
        self
    }

    /// Set the maximum number of subdivision passes.
    #[must_use]
    pub const fn with_max_subdivision_passes(mut self, passes: u32) -> Self {
        self.max_subdivision_passes = passes;
        self
    }

    /// Allowed deviation in faces: `max(ceil(ratio * target), min_tolerance)`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    // Truncation: ratio is validated to [0, 1], so the product fits the target
    pub fn tolerance(&self) -> usize {
        let relative = (self.target_faces as f64 * self.tolerance_ratio).ceil() as usize;
        relative.max(self.min_tolerance)
    }

    /// Check ranges.
    ///
    /// # Errors
    ///
    /// Returns [`RetopoError::InvalidParams`] naming the offending field.
    pub fn validate(&self) -> RetopologyResult<()> {
        if self.target_faces < 4 {
            return Err(RetopoError::InvalidParams {
                name: "target_faces",
                reason: format!("a closed mesh needs at least 4 faces, got {}", self.target_faces),
            });
        }
        if !(0.0..=1.0).contains(&self.tolerance_ratio) {
            return Err(RetopoError::InvalidParams {
                name: "tolerance_ratio",
                reason: format!("must be within [0, 1], got {}", self.tolerance_ratio),
            });
        }
        for (name, value) in [
            ("weld_epsilon", self.weld_epsilon),
            ("degenerate_area", self.degenerate_area),
        ] {
            match value {
                Some(v) if !(v.is_finite() && v >= 0.0) => {
                    return Err(RetopoError::InvalidParams {
                        name,
                        reason: format!("must be finite and non-negative, got {v}"),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_has_a_floor() {
        assert_eq!(RetopoParams::default().tolerance(), 80);
        assert_eq!(RetopoParams::for_target(20).tolerance(), 2);
        assert_eq!(RetopoParams::for_target(250).tolerance(), 3);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(RetopoParams::for_target(3).validate().is_err());
        assert!(RetopoParams::default().with_tolerance_ratio(1.5).validate().is_err());
        assert!(RetopoParams::default().with_weld_epsilon(-1.0).validate().is_err());
        assert!(RetopoParams::default().with_degenerate_area(f64::NAN).validate().is_err());
        assert!(RetopoParams::default().validate().is_ok());
    }
}
