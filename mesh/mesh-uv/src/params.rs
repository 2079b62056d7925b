//! Chart atlas parameters.

use crate::error::{UvError, UvResult};

/// Parameters for [`PlanarChartAtlas`](crate::PlanarChartAtlas).
///
/// # Example
///
/// ```
/// use mesh_uv::AtlasParams;
///
/// let params = AtlasParams::default().with_cone_angle_degrees(45.0);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtlasParams {
    /// Largest angle between a face normal and its chart's seed normal, in
    /// radians.
    /// Default: 60 degrees
    pub cone_angle: f64,

    /// Spacing between packed charts as a fraction of the atlas side.
    /// Default: 0.01
    pub gutter: f64,
}

impl Default for AtlasParams {
    fn default() -> Self {
        Self {
            cone_angle: 60.0_f64.to_radians(),
            gutter: 0.01,
        }
    }
}

impl AtlasParams {
    /// Fewer, larger charts with more distortion.
    #[must_use]
    pub fn preview() -> Self {
        Self {
            cone_angle: 75.0_f64.to_radians(),
            gutter: 0.005,
        }
    }

    /// Smaller charts with less stretch and a wider gutter for mip-mapping.
    #[must_use]
    pub fn high_quality() -> Self {
        Self {
            cone_angle: 40.0_f64.to_radians(),
            gutter: 0.02,
        }
    }

    /// Set the cone angle in radians.
    #[must_use]
    pub const fn with_cone_angle(mut self, radians: f64) -> Self {
        self.cone_angle = radians;
        self
    }

    /// Set the cone angle in degrees.
    #[must_use]
    pub fn with_cone_angle_degrees(self, degrees: f64) -> Self {
        self.with_cone_angle(degrees.to_radians())
    }

    /// Set the gutter.
    #[must_use]
    pub const fn with_gutter(mut self, gutter: f64) -> Self {
        self.gutter = gutter;
        self
    }

    /// Check that the cone angle lies in `(0, pi/2]` and the gutter in
    /// `[0, 0.25)`.
    ///
    /// # Errors
    ///
    /// Returns [`UvError::InvalidParams`] naming the first bad field.
    pub fn validate(&self) -> UvResult<()> {
        if !(self.cone_angle > 0.0 && self.cone_angle <= std::f64::consts::FRAC_PI_2) {
            return Err(UvError::InvalidParams {
                name: "cone_angle",
                reason: format!("must be within (0, pi/2], got {}", self.cone_angle),
            });
        }
        if !(0.0..0.25).contains(&self.gutter) {
            return Err(UvError::InvalidParams {
                name: "gutter",
                reason: format!("must be within [0, 0.25), got {}", self.gutter),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_cone_is_sixty_degrees() {
        let params = AtlasParams::default();
        assert_relative_eq!(params.cone_angle, std::f64::consts::FRAC_PI_3);
        assert!(params.validate().is_ok());
        assert!(AtlasParams::preview().validate().is_ok());
        assert!(AtlasParams::high_quality().validate().is_ok());
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(AtlasParams::default().with_cone_angle(0.0).validate().is_err());
        assert!(AtlasParams::default().with_cone_angle_degrees(120.0).validate().is_err());
        assert!(AtlasParams::default().with_gutter(-0.1).validate().is_err());
        assert!(AtlasParams::default().with_gutter(f64::NAN).validate().is_err());
    }
}
