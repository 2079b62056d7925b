//! Skeleton inference output.

use std::fmt;

use crate::skeleton::Skeleton;

/// Result of skeleton inference.
#[derive(Debug, Clone)]
pub struct SkeletonResult {
    /// The fitted skeleton.
    pub skeleton: Skeleton,

    /// Names of plan bones cut by the bone limit, in plan order.
    pub dropped: Vec<String>,
}

impl SkeletonResult {
    /// True if the whole plan fit under the bone limit.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty()
    }
}

impl fmt::Display for SkeletonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Skeleton: {} bones", self.skeleton.num_bones())?;
        if !self.dropped.is_empty() {
            write!(f, ", {} dropped ({})", self.dropped.len(), self.dropped.join(", "))?;
        }
        Ok(())
    }
}
