//! Image rescaling.

use super::MAX_DIMENSION;
use crate::core::types::{ByteMap, ColorMap};
use image::imageops::FilterType;

/// Resampling function selected by the scale step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleFunction {
    #[default]
    Default,
    Custom,
}

impl ScaleFunction {
    pub const NAMES: &'static [&'static str] = &["Default", "Custom"];

    /// Parse an option name, falling back to [`ScaleFunction::Default`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "Custom" => ScaleFunction::Custom,
            _ => ScaleFunction::Default,
        }
    }

    pub fn filter(&self) -> FilterType {
        match self {
            ScaleFunction::Default => FilterType::Triangle,
            ScaleFunction::Custom => FilterType::Lanczos3,
        }
    }
}

/// Work out the output size from the requested and source sizes.
///
/// A zero in exactly one requested dimension is derived from the other,
/// keeping the aspect ratio. Whatever is still zero afterwards takes the
/// source dimension. A derived dimension never exceeds [`MAX_DIMENSION`].
pub fn calculate_size(width: u32, height: u32, src_width: u32, src_height: u32) -> (u32, u32) {
    let (mut w, mut h) = (width, height);

    if width == 0 && height > 0 && src_height > 0 {
        let factor = height as f64 / src_height as f64;
        w = ((src_width as f64 * factor).round() as u32).min(MAX_DIMENSION);
    } else if height == 0 && width > 0 && src_width > 0 {
        let factor = width as f64 / src_width as f64;
        h = ((src_height as f64 * factor).round() as u32).min(MAX_DIMENSION);
    }

    if w < 1 {
        w = src_width;
    }
    if h < 1 {
        h = src_height;
    }
    (w, h)
}

pub fn scale_color_map(src: &ColorMap, width: u32, height: u32, function: ScaleFunction) -> ColorMap {
    if width == 0 || height == 0 || super::is_empty(src) {
        return ColorMap::new(width, height);
    }
    image::imageops::resize(src, width, height, function.filter())
}

pub fn scale_byte_map(src: &ByteMap, width: u32, height: u32, function: ScaleFunction) -> ByteMap {
    if width == 0 || height == 0 || super::is_empty(src) {
        return ByteMap::new(width, height);
    }
    image::imageops::resize(src, width, height, function.filter())
}
