//! Morphological closing and cavity filling on an occupancy grid.

use std::collections::VecDeque;

use crate::grid::OccupancyGrid;

/// Dilate `radius` times, then erode `radius` times, using the 6-neighborhood.
///
/// Samples outside the grid count as empty, so the padding must be wider
/// than `radius` for the closing to be symmetric.
pub fn close(grid: &mut OccupancyGrid, radius: usize) {
    for _ in 0..radius {
        step(grid, true);
    }
    for _ in 0..radius {
        step(grid, false);
    }
}

/// One dilation (`grow = true`) or erosion step.
fn step(grid: &mut OccupancyGrid, grow: bool) {
    let cells = grid.cells();
    let next = (0..cells.len())
        .map(|i| {
            if grow {
                cells[i] || grid.neighbors(i).any(|n| cells[n])
            } else {
                // A border sample has out-of-grid (empty) neighbors.
                cells[i] && !grid.is_border(i) && grid.neighbors(i).all(|n| cells[n])
            }
        })
        .collect();
    grid.replace_cells(next);
}

/// Make every empty sample not reachable from the grid border solid.
///
/// Returns the number of samples filled.
pub fn fill_cavities(grid: &mut OccupancyGrid) -> usize {
    let cells = grid.cells();
    let mut exterior = vec![false; cells.len()];
    let mut queue = VecDeque::new();

    for (i, &solid) in cells.iter().enumerate() {
        if !solid && grid.is_border(i) {
            exterior[i] = true;
            queue.push_back(i);
        }
    }

    while let Some(i) = queue.pop_front() {
        for n in grid.neighbors(i) {
            if !cells[n] && !exterior[n] {
                exterior[n] = true;
                queue.push_back(n);
            }
        }
    }

    let filled = cells
        .iter()
        .zip(&exterior)
        .filter(|&(&solid, &outside)| !solid && !outside)
        .count();
    if filled > 0 {
        grid.replace_cells(exterior.into_iter().map(|outside| !outside).collect());
    }
    filled
}
