//! Shelf packing of chart rectangles.

use nalgebra::Vector2;

/// Packed chart layout: one offset per input rectangle and the side of the
/// square that holds them all.
#[derive(Debug, Clone)]
pub(crate) struct ShelfLayout {
    pub offsets: Vec<Vector2<f64>>,
    pub side: f64,
}

/// Pack rectangles onto shelves, tallest first.
///
/// The shelf width is chosen so the result is roughly square. Every
/// rectangle is surrounded by `gutter` times the estimated atlas side on all
/// four sides of empty space.
pub(crate) fn pack_shelves(sizes: &[Vector2<f64>], gutter: f64) -> ShelfLayout {
    let widest = sizes.iter().map(|s| s.x).fold(0.0, f64::max);
    let tallest = sizes.iter().map(|s| s.y).fold(0.0, f64::max);
    let area: f64 = sizes.iter().map(|s| s.x * s.y).sum();
    let pad = gutter * area.sqrt().max(widest).max(tallest);

    let padded_area: f64 = sizes.iter().map(|s| (s.x + pad) * (s.y + pad)).sum();
    let limit = padded_area.sqrt().max(widest + 2.0 * pad);

    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&a, &b| sizes[b].y.total_cmp(&sizes[a].y));

    let mut offsets = vec![Vector2::zeros(); sizes.len()];
    let (mut x, mut y) = (pad, pad);
    let mut shelf_height: f64 = 0.0;
    let mut width: f64 = 0.0;
    for i in order {
        let size = sizes[i];
        if x > pad && x + size.x + pad > limit {
            y += shelf_height + pad;
            x = pad;
            shelf_height = 0.0;
        }
        offsets[i] = Vector2::new(x, y);
        x += size.x + pad;
        shelf_height = shelf_height.max(size.y);
        width = width.max(x);
    }
    let height = y + shelf_height + pad;

    ShelfLayout {
        offsets,
        side: width.max(height),
    }
}
