//! Property-based tests for weight painting.
//!
//! Run with: cargo test -p rig-weights -- proptest

use mesh_types::{IndexedMesh, Vertex};
use nalgebra::Point3;
use proptest::prelude::*;
use rig_skeleton::{Bone, Skeleton};
use rig_weights::{InfluenceMetric, WeightParams, paint_weights};

fn arb_point() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-5.0..5.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

fn arb_cloud() -> impl Strategy<Value = IndexedMesh> {
    prop::collection::vec(arb_point(), 1..64).prop_map(|points| {
        IndexedMesh::from_parts(points.into_iter().map(Vertex::new).collect(), Vec::new())
    })
}

/// Random tree: each bone hangs off some earlier bone.
fn arb_skeleton() -> impl Strategy<Value = Skeleton> {
    prop::collection::vec((arb_point(), any::<prop::sample::Index>()), 1..24).prop_map(|spec| {
        let bones = spec
            .into_iter()
            .enumerate()
            .map(|(i, (p, parent))| {
                let bone = Bone::new(format!("bone_{i}"), p);
                if i == 0 { bone } else { bone.with_parent(parent.index(i)) }
            })
            .collect();
        Skeleton::from_bones(bones).unwrap()
    })
}

fn arb_params() -> impl Strategy<Value = WeightParams> {
    (
        0.001..1.0f64,
        prop::bool::ANY,
        0usize..6,
    )
        .prop_map(|(epsilon, segment, k)| {
            let metric = if segment {
                InfluenceMetric::Segment
            } else {
                InfluenceMetric::Euclidean
            };
            WeightParams::default()
                .with_epsilon(epsilon)
                .with_metric(metric)
                .with_max_influences(k)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn rows_are_normalized(mesh in arb_cloud(), skeleton in arb_skeleton(), params in arb_params()) {
        let weights = paint_weights(&mesh, &skeleton, &params).unwrap();
        prop_assert_eq!(weights.vertex_count(), mesh.vertices.len());
        prop_assert_eq!(weights.bone_count(), skeleton.num_bones());
        for row in weights.rows() {
            let sum: f64 = row.iter().sum();
            prop_assert!((sum - 1.0).abs() <= 1e-6, "row sums to {}", sum);
            prop_assert!(row.iter().all(|w| (0.0..=1.0 + 1e-12).contains(w)));
            if let Some(k) = params.max_influences {
                prop_assert!(row.iter().filter(|&&w| w > 0.0).count() <= k.get());
            }
        }
    }

    #[test]
    fn painting_is_deterministic(mesh in arb_cloud(), skeleton in arb_skeleton()) {
        let params = WeightParams::game_ready();
        let a = paint_weights(&mesh, &skeleton, &params).unwrap();
        let b = paint_weights(&mesh, &skeleton, &params).unwrap();
        prop_assert_eq!(a, b);
    }
}
