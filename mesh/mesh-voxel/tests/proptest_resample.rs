//! Property-based tests for voxel resampling.
//!
//! Run with: cargo test -p mesh-voxel -- proptest

use mesh_repair::{count_inconsistent_edges, validate_mesh};
use mesh_types::{IndexedMesh, Vector3, icosphere, unit_cube};
use mesh_voxel::{VoxelParams, resample_to_watertight};
use proptest::prelude::*;

/// Icosphere with random faces removed and the rest randomly reversed.
fn arb_damaged_sphere() -> impl Strategy<Value = IndexedMesh> {
    let faces = icosphere(1).faces.len();
    (
        prop::collection::vec(prop::bool::weighted(0.1), faces),
        prop::collection::vec(prop::bool::weighted(0.3), faces),
    )
        .prop_map(|(drop, flip)| {
            let mut sphere = icosphere(1);
            sphere.faces = sphere
                .faces
                .iter()
                .zip(drop.iter().zip(&flip))
                .filter(|&(_, (&d, _))| !d)
                .map(|(&[a, b, c], (_, &f))| if f { [a, c, b] } else { [a, b, c] })
                .collect();
            sphere
        })
}

/// Two to four unit cubes scattered so they may or may not overlap.
fn arb_cube_cluster() -> impl Strategy<Value = IndexedMesh> {
    prop::collection::vec(prop::array::uniform3(0.0..2.0f64), 1..4).prop_map(|offsets| {
        let mut mesh = unit_cube();
        for [x, y, z] in offsets {
            let mut cube = unit_cube();
            cube.translate(Vector3::new(x, y, z));
            mesh.merge(&cube);
        }
        mesh
    })
}

fn assert_closed(mesh: &IndexedMesh) -> Result<(), TestCaseError> {
    let report = validate_mesh(mesh);
    prop_assert!(report.is_watertight);
    prop_assert!(report.is_manifold);
    prop_assert_eq!(count_inconsistent_edges(&mesh.faces), 0);
    prop_assert!(mesh.signed_volume() > 0.0);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn damaged_sphere_resamples_closed(mesh in arb_damaged_sphere()) {
        let result = resample_to_watertight(&mesh, &VoxelParams::default().with_divisions(24));
        prop_assert!(result.is_ok());
        if let Ok(result) = result {
            assert_closed(&result.mesh)?;
        }
    }

    #[test]
    fn cube_cluster_resamples_closed(mesh in arb_cube_cluster()) {
        let result = resample_to_watertight(&mesh, &VoxelParams::default().with_divisions(24));
        prop_assert!(result.is_ok());
        if let Ok(result) = result {
            assert_closed(&result.mesh)?;
        }
    }
}
