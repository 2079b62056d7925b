//! Fit a body plan to a mesh.

use hashbrown::HashMap;
use mesh_types::{IndexedMesh, MeshBounds};
use tracing::{info, warn};

use crate::error::{InferenceResult, SkeletonError};
use crate::params::SkeletonParams;
use crate::result::SkeletonResult;
use crate::skeleton::{Bone, Skeleton};
use crate::template::BodyPlan;

/// Place a skeleton inside a mesh.
///
/// Joint positions come from the body plan's anchors, resolved against the
/// mesh bounding box alone; Z is up. Vertex density has no effect. Only the first `bone_limit`
/// template bones are kept. Since parents always precede children, the
/// kept prefix is a valid hierarchy rooted at bone 0.
///
/// # Errors
///
/// - [`SkeletonError::InvalidBoneLimit`] if `bone_limit` is 0
/// - [`SkeletonError::InvalidTemplate`] if a custom plan is malformed
/// - [`SkeletonError::EmptyMesh`] if the mesh has no vertices
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use rig_skeleton::{SkeletonParams, infer_skeleton};
///
/// let result = infer_skeleton(&unit_cube(), &SkeletonParams::default()).unwrap();
/// assert_eq!(result.skeleton.num_bones(), 19);
/// assert!(result.is_complete());
/// ```
pub fn infer_skeleton(
    mesh: &IndexedMesh,
    params: &SkeletonParams,
) -> InferenceResult<SkeletonResult> {
    params.validate()?;
    if mesh.vertices.is_empty() {
        return Err(SkeletonError::EmptyMesh);
    }

    let bounds = mesh.bounds();

    info!(
        vertices = mesh.vertices.len(),
        bone_limit = params.bone_limit,
        custom = matches!(params.body_plan, BodyPlan::Custom(_)),
        "Starting skeleton inference"
    );

    let mut templates = params.body_plan.templates();
    let dropped: Vec<String> = if templates.len() > params.bone_limit {
        templates
            .split_off(params.bone_limit)
            .into_iter()
            .map(|t| t.name)
            .collect()
    } else {
        Vec::new()
    };
    if !dropped.is_empty() {
        warn!(
            kept = templates.len(),
            dropped = dropped.len(),
            first_dropped = %dropped[0],
            "Bone limit reached, dropping trailing bones"
        );
    }

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(templates.len());
    let mut bones = Vec::with_capacity(templates.len());
    for (i, template) in templates.iter().enumerate() {
        let mut bone = Bone::new(&template.name, template.anchor.resolve(&bounds));
        bone.parent = template
            .parent
            .as_deref()
            .and_then(|p| index.get(p).copied());
        index.insert(template.name.as_str(), i);
        bones.push(bone);
    }
    let skeleton = Skeleton::from_bones(bones)?;

    info!(bones = skeleton.num_bones(), "Skeleton inference complete");

    Ok(SkeletonResult { skeleton, dropped })
}
