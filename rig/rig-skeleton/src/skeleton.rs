//! Bone hierarchy.

use std::fmt;

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{InferenceResult, SkeletonError};

/// A bone in a skeleton hierarchy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bone {
    /// Name of the bone.
    pub name: String,

    /// Index of the parent bone, or `None` for the root.
    pub parent: Option<usize>,

    /// Joint position in the rest pose, in mesh space.
    pub rest_position: Point3<f64>,
}

impl Bone {
    /// Create a root bone.
    #[must_use]
    pub fn new(name: impl Into<String>, rest_position: Point3<f64>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            rest_position,
        }
    }

    /// Set the parent bone.
    #[must_use]
    pub const fn with_parent(mut self, parent_index: usize) -> Self {
        self.parent = Some(parent_index);
        self
    }

    /// True for the parentless bone.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// An ordered bone hierarchy.
///
/// Bone 0 is the only root, and every other bone's parent precedes it, so a
/// front-to-back walk always visits parents first.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Skeleton {
    bones: Vec<Bone>,
}

impl Skeleton {
    /// Build a skeleton, checking the hierarchy.
    ///
    /// # Errors
    ///
    /// Returns [`SkeletonError::InvalidHierarchy`] if bone 0 has a parent,
    /// another bone has none, or a parent index does not precede its child.
    ///
    /// # Example
    ///
    /// ```
    /// use nalgebra::Point3;
    /// use rig_skeleton::{Bone, Skeleton};
    ///
    /// let skeleton = Skeleton::from_bones(vec![
    ///     Bone::new("root", Point3::origin()),
    ///     Bone::new("tip", Point3::new(0.0, 0.0, 1.0)).with_parent(0),
    /// ])
    /// .unwrap();
    /// assert_eq!(skeleton.children(0), vec![1]);
    /// ```
    pub fn from_bones(bones: Vec<Bone>) -> InferenceResult<Self> {
        for (index, bone) in bones.iter().enumerate() {
            let reason = match (index, bone.parent) {
                (0, Some(_)) => Some("the first bone must be the root".to_string()),
                (0, None) => None,
                (_, None) => Some("only the first bone may be a root".to_string()),
                (_, Some(p)) if p >= index => Some(format!(
                    "parent {p} does not precede the bone"
                )),
                (_, Some(_)) => None,
            };
            if let Some(reason) = reason {
                return Err(SkeletonError::InvalidHierarchy { index, reason });
            }
        }
        Ok(Self { bones })
    }

    /// Number of bones.
    #[must_use]
    pub fn num_bones(&self) -> usize {
        self.bones.len()
    }

    /// True if the skeleton has no bones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// All bones, parents before children.
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Bone by index.
    #[must_use]
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// The root bone.
    #[must_use]
    pub fn root(&self) -> Option<&Bone> {
        self.bones.first()
    }

    /// Index of the bone with this name.
    #[must_use]
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Indices of a bone's direct children.
    #[must_use]
    pub fn children(&self, bone_index: usize) -> Vec<usize> {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent == Some(bone_index))
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of edges between a bone and the root.
    #[must_use]
    pub fn depth(&self, bone_index: usize) -> usize {
        let mut depth = 0;
        let mut current = self.bones.get(bone_index).and_then(|b| b.parent);
        while let Some(parent) = current {
            depth += 1;
            if depth >= self.bones.len() {
                break;
            }
            current = self.bones.get(parent).and_then(|b| b.parent);
        }
        depth
    }

    /// The parent-to-bone segment. The root's segment is its own point.
    #[must_use]
    pub fn segment(&self, bone_index: usize) -> Option<(Point3<f64>, Point3<f64>)> {
        let bone = self.bones.get(bone_index)?;
        let start = bone
            .parent
            .and_then(|p| self.bones.get(p))
            .map_or(bone.rest_position, |p| p.rest_position);
        Some((start, bone.rest_position))
    }
}

impl fmt::Display for Skeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, bone) in self.bones.iter().enumerate() {
            let p = bone.rest_position;
            write!(
                f,
                "{:indent$}{} ({:.3}, {:.3}, {:.3})",
                "",
                bone.name,
                p.x,
                p.y,
                p.z,
                indent = 2 * self.depth(i)
            )?;
            if i + 1 < self.bones.len() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arm() -> Skeleton {
        Skeleton::from_bones(vec![
            Bone::new("root", Point3::origin()),
            Bone::new("upper", Point3::new(1.0, 0.0, 0.0)).with_parent(0),
            Bone::new("lower", Point3::new(2.0, 0.0, 0.0)).with_parent(1),
            Bone::new("other", Point3::new(0.0, 1.0, 0.0)).with_parent(0),
        ])
        .unwrap()
    }

    #[test]
    fn hierarchy_queries() {
        let skeleton = arm();
        assert_eq!(skeleton.num_bones(), 4);
        assert_eq!(skeleton.root().map(|b| b.name.as_str()), Some("root"));
        assert_eq!(skeleton.find_bone("lower"), Some(2));
        assert_eq!(skeleton.find_bone("missing"), None);
        assert_eq!(skeleton.children(0), vec![1, 3]);
        assert_eq!(skeleton.depth(2), 2);
        assert_eq!(skeleton.depth(0), 0);
    }

    #[test]
    fn segments_run_from_parent() {
        let skeleton = arm();
        assert_eq!(
            skeleton.segment(2),
            Some((Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)))
        );
        assert_eq!(skeleton.segment(0), Some((Point3::origin(), Point3::origin())));
        assert_eq!(skeleton.segment(9), None);
    }

    #[test]
    fn bad_hierarchies_rejected() {
        let child_first = vec![Bone::new("a", Point3::origin()).with_parent(0)];
        let two_roots = vec![Bone::new("a", Point3::origin()), Bone::new("b", Point3::origin())];
        let forward_parent = vec![
            Bone::new("a", Point3::origin()),
            Bone::new("b", Point3::origin()).with_parent(2),
            Bone::new("c", Point3::origin()).with_parent(0),
        ];
        for (bones, bad) in [(child_first, 0), (two_roots, 1), (forward_parent, 1)] {
            match Skeleton::from_bones(bones) {
                Err(SkeletonError::InvalidHierarchy { index, .. }) => assert_eq!(index, bad),
                other => panic!("expected hierarchy error, got {other:?}"),
            }
        }
    }

    #[test]
    fn display_indents_by_depth() {
        let text = arm().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("root"));
        assert!(lines[2].starts_with("    lower"));
    }
}
