//! Inverse-distance weight painting.

use mesh_types::IndexedMesh;
use nalgebra::Point3;
use rayon::prelude::*;
use rig_skeleton::Skeleton;
use tracing::info;

use crate::error::{WeightError, WeightResult};
use crate::matrix::WeightMatrix;
use crate::params::{InfluenceMetric, WeightParams};

/// Weight every vertex against every bone.
///
/// `w(v, b) = 1 / (d(v, b) + epsilon)`, then each row is scaled to sum to 1.
/// With `max_influences = k`, all but the `k` strongest weights in a row are
/// zeroed before scaling; ties keep the lower bone index. Rows are computed
/// in parallel and depend only on their own vertex, so the result is
/// deterministic.
///
/// # Errors
///
/// - [`WeightError::NoBones`] if the skeleton is empty
/// - [`WeightError::InvalidEpsilon`] if `epsilon` is not positive and finite
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use rig_skeleton::{SkeletonParams, infer_skeleton};
/// use rig_weights::{WeightParams, paint_weights};
///
/// let cube = unit_cube();
/// let skeleton = infer_skeleton(&cube, &SkeletonParams::default()).unwrap().skeleton;
/// let weights = paint_weights(&cube, &skeleton, &WeightParams::default()).unwrap();
/// assert_eq!(weights.vertex_count(), 8);
/// assert!(weights.is_normalized(1e-9));
/// ```
pub fn paint_weights(
    mesh: &IndexedMesh,
    skeleton: &Skeleton,
    params: &WeightParams,
) -> WeightResult<WeightMatrix> {
    params.validate()?;
    if skeleton.is_empty() {
        return Err(WeightError::NoBones);
    }

    let bone_count = skeleton.num_bones();
    info!(
        vertices = mesh.vertices.len(),
        bones = bone_count,
        metric = ?params.metric,
        max_influences = params.max_influences.map(|k| k.get()),
        "Starting weight painting"
    );

    let segments: Vec<(Point3<f64>, Point3<f64>)> = (0..bone_count)
        .filter_map(|i| skeleton.segment(i))
        .map(|(start, end)| match params.metric {
            InfluenceMetric::Euclidean => (end, end),
            InfluenceMetric::Segment => (start, end),
        })
        .collect();

    let mut weights = WeightMatrix::zeros(mesh.vertices.len(), bone_count);
    weights
        .as_mut_slice()
        .par_chunks_mut(bone_count)
        .zip(mesh.vertices.par_iter())
        .for_each(|(row, vertex)| {
            for (w, (start, end)) in row.iter_mut().zip(&segments) {
                let d = distance_to_segment(&vertex.position, start, end);
                *w = 1.0 / (d + params.epsilon);
            }
            if let Some(k) = params.max_influences {
                keep_strongest(row, k.get());
            }
            let total: f64 = row.iter().sum();
            for w in row.iter_mut() {
                *w /= total;
            }
        });

    info!("Weight painting complete");
    Ok(weights)
}

/// Distance from `p` to the segment `a..b`. A zero-length segment is a point.
fn distance_to_segment(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f64::EPSILON * f64::EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Zero every weight outside the `k` largest.
fn keep_strongest(row: &mut [f64], k: usize) {
    if k >= row.len() {
        return;
    }
    let mut order: Vec<usize> = (0..row.len()).collect();
    order.sort_by(|&a, &b| row[b].total_cmp(&row[a]).then(a.cmp(&b)));
    for &i in &order[k..] {
        row[i] = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{Vertex, icosphere, unit_cube};
    use rig_skeleton::{Bone, SkeletonParams, infer_skeleton};

    fn two_bones() -> Skeleton {
        Skeleton::from_bones(vec![
            Bone::new("a", Point3::origin()),
            Bone::new("b", Point3::new(1.0, 0.0, 0.0)).with_parent(0),
        ])
        .unwrap()
    }

    fn points(coords: &[[f64; 3]]) -> IndexedMesh {
        IndexedMesh::from_parts(
            coords.iter().map(|&[x, y, z]| Vertex::from_coords(x, y, z)).collect(),
            Vec::new(),
        )
    }

    #[test]
    fn inverse_distance_values() {
        let mesh = points(&[[0.0, 0.0, 0.0]]);
        let weights = paint_weights(&mesh, &two_bones(), &WeightParams::default()).unwrap();

        let near = 1.0 / 0.01;
        let far = 1.0 / 1.01;
        assert_relative_eq!(weights.get(0, 0).unwrap(), near / (near + far), epsilon = 1e-12);
        assert_relative_eq!(weights.get(0, 1).unwrap(), far / (near + far), epsilon = 1e-12);
    }

    #[test]
    fn rows_sum_to_one() {
        let sphere = icosphere(3);
        let skeleton = infer_skeleton(&sphere, &SkeletonParams::default()).unwrap().skeleton;
        for params in [WeightParams::default(), WeightParams::game_ready()] {
            let weights = paint_weights(&sphere, &skeleton, &params).unwrap();
            assert_eq!(weights.vertex_count(), sphere.vertices.len());
            assert_eq!(weights.bone_count(), 19);
            assert!(weights.is_normalized(1e-6));
            assert!(weights.as_slice().iter().all(|w| (0.0..=1.0).contains(w)));
        }
    }

    #[test]
    fn painting_is_pure() {
        let cube = unit_cube();
        let skeleton = infer_skeleton(&cube, &SkeletonParams::default()).unwrap().skeleton;
        let params = WeightParams::game_ready();
        let first = paint_weights(&cube, &skeleton, &params).unwrap();
        let second = paint_weights(&cube, &skeleton, &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn influence_cap() {
        let sphere = icosphere(2);
        let skeleton = infer_skeleton(&sphere, &SkeletonParams::default()).unwrap().skeleton;
        let params = WeightParams::default().with_max_influences(2);
        let weights = paint_weights(&sphere, &skeleton, &params).unwrap();

        for row in weights.rows() {
            assert!(row.iter().filter(|&&w| w > 0.0).count() <= 2);
        }
        assert!(weights.is_normalized(1e-9));
    }

    #[test]
    fn segment_metric_favors_the_bone_along_the_limb() {
        // Midway along the a -> b segment, off to one side.
        let mesh = points(&[[0.5, 0.1, 0.0]]);
        let skeleton = two_bones();

        let point = paint_weights(&mesh, &skeleton, &WeightParams::default()).unwrap();
        let segment = paint_weights(
            &mesh,
            &skeleton,
            &WeightParams::default().with_metric(InfluenceMetric::Segment),
        )
        .unwrap();

        // Equidistant from both joints.
        assert_relative_eq!(point.get(0, 0).unwrap(), 0.5, epsilon = 1e-12);
        // Close to the segment, far from the root's point.
        assert_eq!(segment.dominant_bone(0), Some(1));
    }

    #[test]
    fn single_bone_takes_everything() {
        let skeleton = Skeleton::from_bones(vec![Bone::new("only", Point3::origin())]).unwrap();
        let weights = paint_weights(&unit_cube(), &skeleton, &WeightParams::default()).unwrap();
        assert!(weights.as_slice().iter().all(|&w| (w - 1.0).abs() < 1e-12));
    }

    #[test]
    fn errors() {
        assert!(matches!(
            paint_weights(&unit_cube(), &Skeleton::default(), &WeightParams::default()),
            Err(WeightError::NoBones)
        ));
        assert!(matches!(
            paint_weights(&unit_cube(), &two_bones(), &WeightParams::default().with_epsilon(0.0)),
            Err(WeightError::InvalidEpsilon { .. })
        ));
    }

    #[test]
    fn segment_distance() {
        let a = Point3::origin();
        let b = Point3::new(2.0, 0.0, 0.0);
        assert_relative_eq!(distance_to_segment(&Point3::new(1.0, 1.0, 0.0), &a, &b), 1.0);
        assert_relative_eq!(distance_to_segment(&Point3::new(3.0, 0.0, 0.0), &a, &b), 1.0);
        assert_relative_eq!(distance_to_segment(&Point3::new(0.0, 3.0, 4.0), &a, &a), 5.0);
    }

    #[test]
    fn strongest_kept_with_index_tiebreak() {
        let mut row = [0.3, 0.5, 0.3, 0.1];
        keep_strongest(&mut row, 2);
        assert_eq!(row, [0.3, 0.5, 0.0, 0.0]);
    }
}
