//! Rendering line collections onto color images.

use crate::core::types::{ColorMap, Line};
use image::Rgba;
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point as PixelPoint;

/// How shapes are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    Outline,
    Filled,
}

impl DrawMode {
    pub const NAMES: &'static [&'static str] = &["Outline", "Filled"];

    pub fn from_name(name: &str) -> Self {
        match name {
            "Filled" => DrawMode::Filled,
            _ => DrawMode::Outline,
        }
    }
}

/// Draw every shape onto `canvas` in `color`.
pub fn draw_shapes(canvas: &mut ColorMap, shapes: &[Line], mode: DrawMode, color: Rgba<u8>) {
    for shape in shapes.iter().filter(|s| !s.is_empty()) {
        match mode {
            DrawMode::Outline => draw_outline(canvas, shape, color),
            DrawMode::Filled => draw_filled(canvas, shape, color),
        }
    }
}

fn draw_outline(canvas: &mut ColorMap, shape: &[crate::core::types::Point], color: Rgba<u8>) {
    let count = shape.len();
    for i in 0..count {
        let start = shape[i].to_tuple();
        let end = shape[(i + 1) % count].to_tuple();
        draw_line_segment_mut(canvas, start, end, color);
    }
}

fn draw_filled(canvas: &mut ColorMap, shape: &[crate::core::types::Point], color: Rgba<u8>) {
    let mut polygon: Vec<PixelPoint<i32>> = Vec::with_capacity(shape.len());
    for point in shape {
        let p = PixelPoint::new(point.x.round() as i32, point.y.round() as i32);
        if polygon.last() != Some(&p) {
            polygon.push(p);
        }
    }
    // Polygon filling expects an open ring
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }

    if polygon.len() < 3 {
        draw_outline(canvas, shape, color);
        return;
    }
    draw_polygon_mut(canvas, &polygon, color);
}
