//! Resampling a mesh into a watertight surface through an occupancy grid.

use mesh_repair::{MeshAdjacency, check_indices, seal_boundary_loops};
use mesh_types::{IndexedMesh, MeshBounds};
use tracing::{debug, info};

use crate::error::{VoxelError, VoxelResult};
use crate::grid::OccupancyGrid;
use crate::marching_tets::extract_surface;
use crate::morphology::{close, fill_cavities};
use crate::params::VoxelParams;
use crate::result::ResampleResult;
use crate::voxelize::{rasterize_surface, scan_parity};

/// Rebuild a mesh as a closed, manifold, outward-wound surface.
///
/// The input may be open, self-intersecting, non-manifold or inconsistently
/// wound. It is scan converted into an occupancy grid, small gaps are
/// bridged by a morphological closing, enclosed cavities are filled, and the
/// solid region's boundary is extracted with marching tetrahedra.
///
/// # Errors
///
/// - [`VoxelError::InvalidParams`] if `params` fail validation
/// - [`VoxelError::EmptyMesh`] if the mesh has no faces
/// - [`VoxelError::Repair`] if a face references a missing vertex
/// - [`VoxelError::ZeroVolume`] if the bounding box is flat or non-finite
/// - [`VoxelError::GridTooLarge`] if the grid would exceed `max_cells`
/// - [`VoxelError::NoSolidVoxels`] if nothing was marked solid
/// - [`VoxelError::NotWatertight`] if boundary edges survive sealing
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_voxel::{VoxelParams, resample_to_watertight};
///
/// let mut open_box = unit_cube();
/// open_box.faces.truncate(10); // remove the +X side
///
/// let result = resample_to_watertight(&open_box, &VoxelParams::preview()).unwrap();
/// assert!(result.mesh.faces.len() > 12);
/// ```
pub fn resample_to_watertight(
    mesh: &IndexedMesh,
    params: &VoxelParams,
) -> VoxelResult<ResampleResult> {
    params.validate()?;
    if mesh.faces.is_empty() {
        return Err(VoxelError::EmptyMesh);
    }
    check_indices(mesh)?;

    let bounds = mesh.bounds();
    let size = bounds.size();
    let volume = bounds.volume();
    if !(volume.is_finite() && volume > 0.0) {
        return Err(VoxelError::ZeroVolume {
            width: size.x,
            depth: size.y,
            height: size.z,
        });
    }

    let pitch = params.pitch_for(bounds.diagonal());
    let padding = params.effective_padding();
    let (nx, ny, nz) = OccupancyGrid::dimensions_for(&bounds, pitch, padding);
    let cells = nx
        .checked_mul(ny)
        .and_then(|c| c.checked_mul(nz))
        .unwrap_or(usize::MAX);
    if cells > params.max_cells {
        return Err(VoxelError::GridTooLarge {
            cells,
            limit: params.max_cells,
        });
    }

    info!(
        faces = mesh.faces.len(),
        nx,
        ny,
        nz,
        pitch,
        "Starting voxel resample"
    );

    let mut grid = OccupancyGrid::from_bounds(&bounds, pitch, padding);
    scan_parity(&mut grid, mesh);
    let interior = grid.solid_count();
    rasterize_surface(&mut grid, mesh);
    debug!(
        interior,
        with_surface = grid.solid_count(),
        "Scan converted mesh"
    );

    close(&mut grid, params.closing_radius);
    let cavities_filled = fill_cavities(&mut grid);
    let solid_voxels = grid.solid_count();
    debug!(solid_voxels, cavities_filled, "Closed and filled occupancy");
    if solid_voxels == 0 {
        return Err(VoxelError::NoSolidVoxels);
    }

    let mut surface = extract_surface(&grid);
    drop(grid);

    let seal = seal_boundary_loops(&mut surface)?;
    let boundary_edges = MeshAdjacency::build(&surface.faces).boundary_edge_count();
    if boundary_edges > 0 || surface.faces.is_empty() {
        return Err(VoxelError::NotWatertight { boundary_edges });
    }

    info!(
        vertices = surface.vertices.len(),
        faces = surface.faces.len(),
        fans = seal.faces_added,
        "Voxel resample complete"
    );

    Ok(ResampleResult {
        mesh: surface,
        grid_dimensions: (nx, ny, nz),
        pitch,
        solid_voxels,
        cavities_filled,
        fans_added: seal.faces_added,
    })
}
