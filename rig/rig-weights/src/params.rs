//! Weight painting parameters.

use std::num::NonZeroUsize;

use crate::error::{WeightError, WeightResult};

/// Distance used to rank bones for a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InfluenceMetric {
    /// Distance to the bone's rest position.
    #[default]
    Euclidean,
    /// Distance to the segment from the parent's rest position to the
    /// bone's. The root uses its own point.
    Segment,
}

/// Configuration for [`paint_weights`](crate::paint_weights).
///
/// # Example
///
/// ```
/// use rig_weights::{InfluenceMetric, WeightParams};
///
/// let params = WeightParams::game_ready();
/// assert_eq!(params.metric, InfluenceMetric::Segment);
/// assert_eq!(params.max_influences.map(|k| k.get()), Some(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightParams {
    /// Offset added to every distance before inverting.
    /// Default: 0.01
    pub epsilon: f64,

    /// Distance measure.
    /// Default: [`InfluenceMetric::Euclidean`]
    pub metric: InfluenceMetric,

    /// Keep only the strongest `k` bones per vertex.
    /// Default: `None` (every bone influences every vertex)
    pub max_influences: Option<NonZeroUsize>,
}

impl Default for WeightParams {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            metric: InfluenceMetric::Euclidean,
            max_influences: None,
        }
    }
}

impl WeightParams {
    /// Segment distances and at most four bones per vertex, the common GPU
    /// skinning limit.
    #[must_use]
    pub const fn game_ready() -> Self {
        Self {
            epsilon: 0.01,
            metric: InfluenceMetric::Segment,
            max_influences: NonZeroUsize::new(4),
        }
    }

    /// Set the distance offset.
    #[must_use]
    pub const fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the distance measure.
    #[must_use]
    pub const fn with_metric(mut self, metric: InfluenceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Cap bones per vertex. 0 removes the cap.
    #[must_use]
    pub const fn with_max_influences(mut self, k: usize) -> Self {
        self.max_influences = NonZeroUsize::new(k);
        self
    }

    /// Check the epsilon.
    ///
    /// # Errors
    ///
    /// Returns [`WeightError::InvalidEpsilon`] unless it is positive and
    /// finite.
    pub fn validate(&self) -> WeightResult<()> {
        if self.epsilon.is_finite() && self.epsilon > 0.0 {
            Ok(())
        } else {
            Err(WeightError::InvalidEpsilon {
                value: self.epsilon,
            })
        }
    }
}
