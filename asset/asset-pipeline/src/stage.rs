//! Stage identifiers, progress events and cancellation.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    /// Voxel resampling to a watertight surface.
    Resample,
    /// Face-budget retopology.
    Retopology,
    /// Taubin smoothing.
    Smoothing,
    /// UV parameterization.
    Parameterization,
    /// Skeleton inference.
    Skeleton,
    /// Weight painting.
    Weights,
    /// Level-of-detail generation.
    Lod,
    /// Collision proxy generation.
    Collision,
}

impl Stage {
    /// Stages of a clean-up run, in order.
    pub const CLEANUP: [Self; 4] = [
        Self::Resample,
        Self::Retopology,
        Self::Smoothing,
        Self::Parameterization,
    ];

    /// Stages of a rigging run, in order.
    pub const RIG: [Self; 2] = [Self::Skeleton, Self::Weights];

    /// Lowercase stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Resample => "resample",
            Self::Retopology => "retopology",
            Self::Smoothing => "smoothing",
            Self::Parameterization => "parameterization",
            Self::Skeleton => "skeleton",
            Self::Weights => "weights",
            Self::Lod => "lod",
            Self::Collision => "collision",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Progress notification sent at stage boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    /// The stage is about to run.
    Started(Stage),
    /// The stage completed successfully.
    Finished(Stage),
}

/// Cooperative cancellation flag shared between a caller and a pipeline.
///
/// The pipeline checks the flag before each stage; a stage already running
/// is never interrupted.
///
/// # Example
///
/// ```
/// use asset_pipeline::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once any clone has called [`cancel`](Self::cancel).
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
