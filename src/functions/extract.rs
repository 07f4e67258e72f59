//! Cutting regions out of color images.

use super::MAX_DIMENSION;
use crate::core::types::{ColorMap, Grid, Point};
use image::Rgba;
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

/// Copy a `width` x `height` rectangle starting at (`x`, `y`).
///
/// Pixels of the rectangle that fall outside the source are set to `fill`.
pub fn extract_rect(
    src: &ColorMap,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    fill: Rgba<u8>,
) -> ColorMap {
    ColorMap::from_fn(width, height, |dx, dy| {
        let sx = x.checked_add(dx);
        let sy = y.checked_add(dy);
        match (sx, sy) {
            (Some(sx), Some(sy)) if sx < src.width() && sy < src.height() => {
                *src.get_pixel(sx, sy)
            }
            _ => fill,
        }
    })
}

/// Warp the quadrilateral spanned by the first four points of `shape` onto
/// a `width` x `height` image.
///
/// The points are taken in order as the top-left, top-right, bottom-right
/// and bottom-left corners of the output.
pub fn extract_quad(
    src: &ColorMap,
    shape: &[Point],
    width: u32,
    height: u32,
) -> Result<ColorMap, String> {
    if shape.len() < 4 {
        return Err(format!(
            "The clipping area needs at least 4 points, got {}.",
            shape.len()
        ));
    }

    warp_corners(
        src,
        [shape[0], shape[1], shape[2], shape[3]],
        width,
        height,
    )
    .ok_or_else(|| "The clipping area is degenerate.".to_string())
}

/// Warp the outer boundary of `grid` onto a `width` x `height` image.
pub fn extract_grid(src: &ColorMap, grid: &Grid, width: u32, height: u32) -> Result<ColorMap, String> {
    if grid.is_empty() {
        return Err("The clipping grid has no cells.".to_string());
    }

    warp_corners(src, grid.corners(), width, height)
        .ok_or_else(|| "The clipping grid is degenerate.".to_string())
}

/// Output size implied by a grid: cells times the rounded-up axis length,
/// capped at [`MAX_DIMENSION`].
pub fn grid_size(grid: &Grid) -> (u32, u32) {
    let width = grid.x_cells as f32 * grid.x_axis.length().ceil();
    let height = grid.y_cells as f32 * grid.y_axis.length().ceil();
    (
        (width as u32).min(MAX_DIMENSION),
        (height as u32).min(MAX_DIMENSION),
    )
}

fn warp_corners(src: &ColorMap, corners: [Point; 4], width: u32, height: u32) -> Option<ColorMap> {
    let (w, h) = (width as f32, height as f32);
    let from = corners.map(Point::to_tuple);
    let to = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];

    let projection = Projection::from_control_points(from, to)?;

    let mut out = ColorMap::new(width, height);
    warp_into(
        src,
        &projection,
        Interpolation::Bilinear,
        Rgba([0, 0, 0, 255]),
        &mut out,
    );
    Some(out)
}
