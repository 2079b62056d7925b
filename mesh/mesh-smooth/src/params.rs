//! Taubin smoothing parameters.

use crate::error::{SmoothError, SmoothingResult};

/// Taubin smoothing parameters.
///
/// Each iteration is a shrinking pass with `lambda > 0` followed by an
/// inflating pass with `mu < 0`. `|mu|` slightly larger than `lambda`
/// cancels the shrinkage of plain Laplacian smoothing.
///
/// # Example
///
/// ```
/// use mesh_smooth::SmoothParams;
///
/// let params = SmoothParams::default().with_iterations(20);
/// assert!(params.validate().is_ok());
/// assert!(SmoothParams::default().with_mu(-0.4).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmoothParams {
    /// Number of lambda/mu iterations.
    /// Default: 10
    pub iterations: u32,

    /// Smoothing factor (positive).
    /// Default: 0.5
    pub lambda: f64,

    /// Inflation factor (negative).
    /// Default: -0.53
    pub mu: f64,
}

impl Default for SmoothParams {
    fn default() -> Self {
        Self {
            iterations: 10,
            lambda: 0.5,
            mu: -0.53,
        }
    }
}

impl SmoothParams {
    /// Stronger smoothing for noisy reconstructions.
    #[must_use]
    pub const fn strong() -> Self {
        Self {
            iterations: 20,
            lambda: 0.6,
            mu: -0.64,
        }
    }

    /// Gentle smoothing that barely moves sharp features.
    #[must_use]
    pub const fn gentle() -> Self {
        Self {
            iterations: 5,
            lambda: 0.3,
            mu: -0.31,
        }
    }

    /// Set the iteration count.
    #[must_use]
    pub const fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the smoothing factor.
    #[must_use]
    pub const fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Set the inflation factor.
    #[must_use]
    pub const fn with_mu(mut self, mu: f64) -> Self {
        self.mu = mu;
        self
    }

    /// Check `lambda > 0`, `mu < 0`, `|mu| > lambda`, all finite.
    ///
    /// # Errors
    ///
    /// Returns [`SmoothError::InvalidParameter`] for the first violation.
    pub fn validate(&self) -> SmoothingResult<()> {
        let invalid = |name, value, reason| {
            Err(SmoothError::InvalidParameter {
                name,
                value,
                reason,
            })
        };
        if !(self.lambda.is_finite() && self.lambda > 0.0) {
            return invalid("lambda", self.lambda, "must be positive and finite");
        }
        if !(self.mu.is_finite() && self.mu < 0.0) {
            return invalid("mu", self.mu, "must be negative and finite");
        }
        if self.mu.abs() <= self.lambda {
            return invalid("mu", self.mu, "magnitude must exceed lambda");
        }
        Ok(())
    }
}
