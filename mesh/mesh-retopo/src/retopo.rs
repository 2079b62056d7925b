//! Face-budget retopology.

use mesh_repair::{RepairParams, check_indices, fix_winding_order, repair_mesh};
use mesh_types::{IndexedMesh, MeshBounds};
use tracing::{debug, info, warn};

use crate::decimate::decimate_to;
use crate::error::{RetopoError, RetopologyResult};
use crate::params::RetopoParams;
use crate::result::{RetopoResult, ToleranceWarning};
use crate::subdivide::subdivide_midpoint;

/// Bring a mesh to a face budget and clean its topology.
///
/// 1. While the mesh is below the tolerance band under the target, each
///    triangle is split into four (at most `max_subdivision_passes` times)
/// 2. While it is above the target, the cheapest valid edge is collapsed
/// 3. Post-pass: weld, drop degenerate and duplicate faces, drop
///    unreferenced vertices, make winding consistent and outward per
///    component, and recompute area-weighted vertex normals
///
/// A final count outside the tolerance produces a [`ToleranceWarning`] in
/// the result rather than an error.
///
/// # Errors
///
/// - [`RetopoError::InvalidParams`] if `params` fail validation
/// - [`RetopoError::EmptyMesh`] if the mesh has no faces
/// - [`RetopoError::Repair`] if a face references a missing vertex
///
/// # Example
///
/// ```
/// use mesh_retopo::{RetopoParams, retopologize};
/// use mesh_types::icosphere;
///
/// let sphere = icosphere(3); // 1280 faces
/// let result = retopologize(&sphere, &RetopoParams::for_target(500)).unwrap();
/// assert!(result.on_target());
/// println!("{result}");
/// ```
pub fn retopologize(mesh: &IndexedMesh, params: &RetopoParams) -> RetopologyResult<RetopoResult> {
    params.validate()?;
    if mesh.faces.is_empty() {
        return Err(RetopoError::EmptyMesh);
    }
    check_indices(mesh)?;

    let original_faces = mesh.faces.len();
    let target = params.target_faces;
    let tolerance = params.tolerance();
    info!(original_faces, target, tolerance, "Starting retopology");

    let mut working = mesh.clone();
    let mut subdivision_passes = 0;
    while working.faces.len() + tolerance < target
        && subdivision_passes < params.max_subdivision_passes
    {
        working = subdivide_midpoint(&working);
        subdivision_passes += 1;
        debug!(
            pass = subdivision_passes,
            faces = working.faces.len(),
            "Subdivided"
        );
    }

    let (collapses_performed, collapses_rejected) = if working.faces.len() > target {
        let decimation = decimate_to(&working, target);
        working = decimation.mesh;
        (decimation.collapses_performed, decimation.collapses_rejected)
    } else {
        (0, 0)
    };

    let scale = working.bounds().diagonal();
    let mut repair_params = RepairParams::for_scale(scale);
    if let Some(eps) = params.weld_epsilon {
        repair_params = repair_params.with_weld_epsilon(eps);
    }
    if let Some(area) = params.degenerate_area {
        repair_params = repair_params.with_degenerate_area_threshold(area);
    }
    let repair = repair_mesh(&mut working, &repair_params);
    let winding = fix_winding_order(&mut working);
    working.compute_vertex_normals();
    debug!(
        flipped = winding.faces_flipped,
        reversed = winding.components_reversed,
        "{repair}"
    );

    let final_faces = working.faces.len();
    let warning = ToleranceWarning::check(target, final_faces, tolerance);
    if let Some(w) = &warning {
        warn!(
            target = w.target,
            actual = w.actual,
            tolerance = w.tolerance,
            "Retopology missed the face budget"
        );
    }

    info!(
        final_faces,
        subdivision_passes,
        collapses = collapses_performed,
        "Retopology complete"
    );

    Ok(RetopoResult {
        mesh: working,
        original_faces,
        final_faces,
        subdivision_passes,
        collapses_performed,
        collapses_rejected,
        repair,
        warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_repair::{count_inconsistent_edges, validate_mesh};
    use mesh_types::{icosphere, unit_cube};

    #[test]
    fn scenario_icosphere_to_twenty() {
        let sphere = icosphere(1);
        assert_eq!(sphere.faces.len(), 80);
        let result = retopologize(&sphere, &RetopoParams::for_target(20)).unwrap();

        assert!(result.final_faces <= 21);
        assert!(result.on_target());
        let report = validate_mesh(&result.mesh);
        assert_eq!(report.degenerate_face_count, 0);
        assert_eq!(report.duplicate_face_count, 0);
        assert!(report.is_sealed(), "{report}");
    }

    #[test]
    fn small_mesh_is_subdivided_then_trimmed() {
        let result = retopologize(&unit_cube(), &RetopoParams::for_target(100)).unwrap();
        // 12 -> 48 -> 192, then collapsed down to the budget.
        assert_eq!(result.subdivision_passes, 2);
        assert!(result.collapses_performed > 0);
        assert!(result.on_target(), "{result}");
        assert!(result.final_faces <= 100);
    }

    #[test]
    fn subdivision_is_bounded() {
        let params = RetopoParams::for_target(10_000).with_max_subdivision_passes(1);
        let result = retopologize(&unit_cube(), &params).unwrap();
        assert_eq!(result.subdivision_passes, 1);
        assert_eq!(result.final_faces, 48);
        let warning = result.warning.unwrap();
        assert_eq!(warning.target, 10_000);
        assert_eq!(warning.actual, 48);
    }

    #[test]
    fn post_pass_fixes_winding_and_normals() {
        let mut sphere = icosphere(2);
        sphere.flip_normals();
        sphere.faces[0].swap(1, 2);

        let result = retopologize(&sphere, &RetopoParams::for_target(200)).unwrap();
        assert_eq!(count_inconsistent_edges(&result.mesh.faces), 0);
        assert!(result.mesh.signed_volume() > 0.0);
        assert!(result.mesh.vertices.iter().all(|v| v.normal().is_some()));
        // Normals point away from the center of a sphere.
        let outward = result
            .mesh
            .vertices
            .iter()
            .filter(|v| v.normal().is_some_and(|n| n.dot(&v.position.coords) > 0.0))
            .count();
        assert_eq!(outward, result.mesh.vertices.len());
    }

    #[test]
    fn within_tolerance_is_left_alone() {
        let sphere = icosphere(2);
        let result = retopologize(&sphere, &RetopoParams::for_target(321)).unwrap();
        assert_eq!(result.subdivision_passes, 0);
        assert_eq!(result.collapses_performed, 0);
        assert_eq!(result.final_faces, 320);
    }

    #[test]
    fn empty_mesh_rejected() {
        assert!(matches!(
            retopologize(&IndexedMesh::new(), &RetopoParams::default()),
            Err(RetopoError::EmptyMesh)
        ));
    }
}
