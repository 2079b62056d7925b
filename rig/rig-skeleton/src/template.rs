//! Body plans: bone templates anchored to the mesh bounding box.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use hashbrown::HashSet;
use mesh_types::{Aabb, Point3};

use crate::error::{InferenceResult, SkeletonError};

/// Where a joint sits along the vertical (Z) axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VerticalAnchor {
    /// `min.z + f * height`.
    AboveBase(f64),
    /// `f * max.z`.
    OfTop(f64),
}

/// Joint placement relative to the mesh bounds.
///
/// Lateral and forward offsets are fractions of the box width (X) and depth
/// (Y), measured from the center of the box. Negative lateral is the
/// character's left.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoneAnchor {
    /// Fraction of the box width added to `center.x`.
    pub lateral: f64,
    /// Fraction of the box depth added to `center.y`.
    pub forward: f64,
    /// Height rule.
    pub vertical: VerticalAnchor,
}

impl BoneAnchor {
    /// Anchor on the vertical center line.
    #[must_use]
    pub const fn centered(vertical: VerticalAnchor) -> Self {
        Self {
            lateral: 0.0,
            forward: 0.0,
            vertical,
        }
    }

    /// Anchor offset sideways.
    #[must_use]
    pub const fn lateral(lateral: f64, vertical: VerticalAnchor) -> Self {
        Self {
            lateral,
            forward: 0.0,
            vertical,
        }
    }

    /// Set the forward offset.
    #[must_use]
    pub const fn with_forward(mut self, forward: f64) -> Self {
        self.forward = forward;
        self
    }

    /// Resolve against mesh bounds.
    #[must_use]
    pub fn resolve(&self, bounds: &Aabb) -> Point3<f64> {
        let size = bounds.size();
        let center = bounds.center();
        let z = match self.vertical {
            VerticalAnchor::AboveBase(f) => bounds.min.z + f * size.z,
            VerticalAnchor::OfTop(f) => f * bounds.max.z,
        };
        Point3::new(
            center.x + self.lateral * size.x,
            center.y + self.forward * size.y,
            z,
        )
    }
}

/// One bone of a body plan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoneTemplate {
    /// Bone name, unique within the plan.
    pub name: String,
    /// Parent bone name. `None` only for the first bone.
    pub parent: Option<String>,
    /// Joint placement.
    pub anchor: BoneAnchor,
}

impl BoneTemplate {
    /// Root template.
    #[must_use]
    pub fn root(name: impl Into<String>, anchor: BoneAnchor) -> Self {
        Self {
            name: name.into(),
            parent: None,
            anchor,
        }
    }

    /// Child template.
    #[must_use]
    pub fn child(name: impl Into<String>, parent: impl Into<String>, anchor: BoneAnchor) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent.into()),
            anchor,
        }
    }
}

/// Which anatomy to fit.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BodyPlan {
    /// The built-in 19-bone biped.
    #[default]
    Humanoid,
    /// A caller-supplied template list, root first.
    Custom(Vec<BoneTemplate>),
}

impl BodyPlan {
    /// Bone templates in hierarchy order.
    #[must_use]
    pub fn templates(&self) -> Vec<BoneTemplate> {
        match self {
            Self::Humanoid => humanoid(),
            Self::Custom(templates) => templates.clone(),
        }
    }

    /// Check the plan: non-empty, a parentless first bone, no other roots,
    /// unique names, and every parent named before its child.
    ///
    /// # Errors
    ///
    /// Returns [`SkeletonError::InvalidTemplate`] describing the first
    /// problem found.
    pub fn validate(&self) -> InferenceResult<()> {
        let Self::Custom(templates) = self else {
            return Ok(());
        };
        let invalid = |reason: String| Err(SkeletonError::InvalidTemplate { reason });

        let Some(first) = templates.first() else {
            return invalid("body plan has no bones".to_string());
        };
        if first.parent.is_some() {
            return invalid(format!("first bone '{}' must not have a parent", first.name));
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(templates.len());
        for template in templates {
            if seen.contains(template.name.as_str()) {
                return invalid(format!("duplicate bone name '{}'", template.name));
            }
            match (&template.parent, seen.is_empty()) {
                (None, false) => {
                    return invalid(format!("bone '{}' is a second root", template.name));
                }
                (Some(parent), _) if !seen.contains(parent.as_str()) => {
                    return invalid(format!(
                        "bone '{}' names parent '{parent}' before it is defined",
                        template.name
                    ));
                }
                _ => {}
            }
            seen.insert(template.name.as_str());
        }
        Ok(())
    }
}

/// The 19-bone humanoid: root, spine, head, then arms and legs.
///
/// Truncating the list keeps the torso and drops extremities first.
fn humanoid() -> Vec<BoneTemplate> {
    use VerticalAnchor::{AboveBase, OfTop};

    let mut bones = vec![BoneTemplate::root("root", BoneAnchor::centered(AboveBase(0.0)))];
    let mut parent = "root".to_string();
    for (i, height) in [0.3, 0.5, 0.7].into_iter().enumerate() {
        let name = format!("spine_{i}");
        bones.push(BoneTemplate::child(&name, parent, BoneAnchor::centered(AboveBase(height))));
        parent = name;
    }
    bones.push(BoneTemplate::child("head", "spine_2", BoneAnchor::centered(OfTop(0.9))));

    for (side, sign) in [("left", -1.0), ("right", 1.0)] {
        let chain = [
            ("shoulder", 0.7, 0.30),
            ("upper_arm", 0.5, 0.45),
            ("lower_arm", 0.3, 0.45),
            ("hand", 0.1, 0.45),
        ];
        let mut parent = "spine_2".to_string();
        for (part, height, lateral) in chain {
            let name = format!("{side}_{part}");
            bones.push(BoneTemplate::child(
                &name,
                parent,
                BoneAnchor::lateral(sign * lateral, AboveBase(height)),
            ));
            parent = name;
        }
    }

    for (side, sign) in [("left", -1.0), ("right", 1.0)] {
        let lateral = sign * 0.15;
        bones.push(BoneTemplate::child(
            format!("{side}_upper_leg"),
            "root",
            BoneAnchor::lateral(lateral, AboveBase(0.3)),
        ));
        bones.push(BoneTemplate::child(
            format!("{side}_lower_leg"),
            format!("{side}_upper_leg"),
            BoneAnchor::lateral(lateral, AboveBase(0.15)),
        ));
        bones.push(BoneTemplate::child(
            format!("{side}_foot"),
            format!("{side}_lower_leg"),
            BoneAnchor::lateral(lateral, AboveBase(0.0)).with_forward(0.1),
        ));
    }
    bones
}
