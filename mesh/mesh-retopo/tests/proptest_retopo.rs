//! Property-based tests for retopology.
//!
//! Run with: cargo test -p mesh-retopo -- proptest

use mesh_repair::{count_inconsistent_edges, validate_mesh};
use mesh_retopo::{RetopoParams, retopologize};
use mesh_types::{IndexedMesh, icosphere};
use proptest::prelude::*;

/// Icosphere with every vertex pushed in or out along its radius.
fn arb_bumpy_sphere() -> impl Strategy<Value = IndexedMesh> {
    let count = icosphere(2).vertices.len();
    prop::collection::vec(0.8..1.2f64, count).prop_map(|radii| {
        let mut sphere = icosphere(2);
        for (vertex, r) in sphere.vertices.iter_mut().zip(radii) {
            vertex.position.coords *= r;
        }
        sphere
    })
}

/// Budget and surface checks shared by both directions.
fn check_retopo(mesh: &IndexedMesh, target: usize) -> Result<(), TestCaseError> {
    let params = RetopoParams::for_target(target);
    let result = retopologize(mesh, &params);
    prop_assert!(result.is_ok());
    let Ok(result) = result else { return Ok(()) };

    prop_assert!(result.final_faces <= target);
    prop_assert!(result.final_faces + params.tolerance() >= target);
    prop_assert!(result.warning.is_none());

    let report = validate_mesh(&result.mesh);
    prop_assert_eq!(report.degenerate_face_count, 0);
    prop_assert_eq!(report.duplicate_face_count, 0);
    prop_assert!(report.is_watertight);
    prop_assert_eq!(count_inconsistent_edges(&result.mesh.faces), 0);
    prop_assert!(result.mesh.signed_volume() > 0.0);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn budget_is_met_from_above(mesh in arb_bumpy_sphere(), target in 160usize..320) {
        check_retopo(&mesh, target)?;
    }

    // The source has 320 faces: these targets subdivide first, then decimate.
    #[test]
    fn budget_is_met_from_below(mesh in arb_bumpy_sphere(), target in 321usize..640) {
        check_retopo(&mesh, target)?;
    }
}
