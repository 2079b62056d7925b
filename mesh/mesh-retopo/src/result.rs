//! Result types for retopology.

// Face counts don't overflow in practice
#![allow(clippy::cast_precision_loss)]

use mesh_repair::RepairSummary;
use mesh_types::IndexedMesh;

/// The final face count missed the target by more than the tolerance.
///
/// Non-fatal: the mesh is still valid, only its budget is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToleranceWarning {
    /// Requested face count.
    pub target: usize,
    /// Face count actually produced.
    pub actual: usize,
    /// Allowed deviation.
    pub tolerance: usize,
}

impl ToleranceWarning {
    /// A warning if `actual` is more than `tolerance` away from `target`.
    #[must_use]
    pub const fn check(target: usize, actual: usize, tolerance: usize) -> Option<Self> {
        if actual.abs_diff(target) > tolerance {
            Some(Self {
                target,
                actual,
                tolerance,
            })
        } else {
            None
        }
    }
}

impl std::fmt::Display for ToleranceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "face count {} is outside {} ± {}",
            self.actual, self.target, self.tolerance
        )
    }
}

/// Result of [`retopologize`](crate::retopologize).
#[derive(Debug, Clone)]
pub struct RetopoResult {
    /// The adjusted, cleaned mesh with vertex normals.
    pub mesh: IndexedMesh,

    /// Faces in the input.
    pub original_faces: usize,

    /// Faces in the output.
    pub final_faces: usize,

    /// 1-to-4 subdivision passes applied.
    pub subdivision_passes: u32,

    /// Edge collapses applied.
    pub collapses_performed: usize,

    /// Collapse candidates rejected by topology or geometry checks.
    pub collapses_rejected: usize,

    /// What the clean-up post-pass changed.
    pub repair: RepairSummary,

    /// Set when the final count is outside the tolerance.
    pub warning: Option<ToleranceWarning>,
}

impl RetopoResult {
    /// Final faces over original faces.
    #[must_use]
    pub fn face_ratio(&self) -> f64 {
        if self.original_faces == 0 {
            1.0
        } else {
            self.final_faces as f64 / self.original_faces as f64
        }
    }

    /// True if the final count is within tolerance.
    #[must_use]
    pub const fn on_target(&self) -> bool {
        self.warning.is_none()
    }
}

impl std::fmt::Display for RetopoResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Retopology: {} → {} faces ({} subdivisions, {} collapses)",
            self.original_faces,
            self.final_faces,
            self.subdivision_passes,
            self.collapses_performed
        )?;
        if let Some(warning) = &self.warning {
            write!(f, " [{warning}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_only_outside_tolerance() {
        assert!(ToleranceWarning::check(100, 102, 2).is_none());
        assert!(ToleranceWarning::check(100, 98, 2).is_none());
        let warning = ToleranceWarning::check(100, 110, 2).unwrap();
        assert_eq!(warning.actual, 110);
        assert_eq!(warning.to_string(), "face count 110 is outside 100 ± 2");
    }

    #[test]
    fn display_includes_warning() {
        let result = RetopoResult {
            mesh: IndexedMesh::new(),
            original_faces: 1000,
            final_faces: 500,
            subdivision_passes: 0,
            collapses_performed: 250,
            collapses_rejected: 3,
            repair: RepairSummary::default(),
            warning: ToleranceWarning::check(400, 500, 4),
        };
        assert!((result.face_ratio() - 0.5).abs() < 1e-12);
        assert!(!result.on_target());
        let text = result.to_string();
        assert!(text.contains("1000 → 500"));
        assert!(text.contains("outside 400 ± 4"));
    }
}
