//! Property-based tests for UV parameterization.
//!
//! Run with: cargo test -p mesh-uv -- proptest

use mesh_types::{IndexedMesh, icosphere};
use mesh_uv::{AtlasParams, PlanarChartAtlas, parameterize};
use proptest::prelude::*;

/// Icosphere with every vertex pushed in or out along its radius.
fn arb_lumpy_sphere() -> impl Strategy<Value = IndexedMesh> {
    let count = icosphere(2).vertices.len();
    prop::collection::vec(0.6..1.4f64, count).prop_map(|radii| {
        let mut sphere = icosphere(2);
        for (v, r) in sphere.vertices.iter_mut().zip(radii) {
            v.position.coords *= r;
        }
        sphere
    })
}

fn assert_unit_square(mesh: &IndexedMesh) -> Result<(), TestCaseError> {
    for v in &mesh.vertices {
        let uv = v.uv();
        prop_assert!(uv.is_some());
        if let Some(uv) = uv {
            prop_assert!((0.0..=1.0).contains(&uv.x), "u = {}", uv.x);
            prop_assert!((0.0..=1.0).contains(&uv.y), "v = {}", uv.y);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn atlas_uvs_stay_in_unit_square(
        mesh in arb_lumpy_sphere(),
        cone in 20.0..90.0f64,
        gutter in 0.0..0.05f64,
    ) {
        let atlas = PlanarChartAtlas::new(
            AtlasParams::default().with_cone_angle_degrees(cone).with_gutter(gutter),
        );
        let result = parameterize(&mesh, Some(&atlas));
        prop_assert!(result.is_ok());
        if let Ok(result) = result {
            prop_assert_eq!(result.mesh.faces.len(), mesh.faces.len());
            assert_unit_square(&result.mesh)?;
        }
    }

    #[test]
    fn fallback_uvs_stay_in_unit_square(mesh in arb_lumpy_sphere()) {
        let result = parameterize(&mesh, None);
        prop_assert!(result.is_ok());
        if let Ok(result) = result {
            assert_unit_square(&result.mesh)?;
        }
    }
}
