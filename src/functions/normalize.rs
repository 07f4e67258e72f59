//! Brightness normalization.

use super::luma;
use crate::core::types::ColorMap;

/// How brightness is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrightnessMethod {
    /// Scale so the mean luma hits a target
    #[default]
    Mean,
    /// Stretch the luma range to 0..255
    MinMax,
}

impl BrightnessMethod {
    pub const NAMES: &'static [&'static str] = &["Mean", "Min max"];

    pub fn from_name(name: &str) -> Self {
        match name {
            "Min max" => BrightnessMethod::MinMax,
            _ => BrightnessMethod::Mean,
        }
    }
}

/// Scale the color channels so the mean luma becomes `target`.
///
/// Black images are returned unchanged. Alpha is preserved.
pub fn normalize_mean(src: &ColorMap, target: u8) -> ColorMap {
    let count = src.width() as f64 * src.height() as f64;
    if count == 0.0 {
        return src.clone();
    }

    let mean = src.pixels().map(|p| luma(p) as f64).sum::<f64>() / count;
    if mean <= f64::EPSILON {
        return src.clone();
    }

    let factor = (target as f64 / mean) as f32;
    map_channels(src, |c| c as f32 * factor)
}

/// Stretch the luma range of `src` to cover 0..255.
///
/// Flat images are returned unchanged. Alpha is preserved.
pub fn normalize_min_max(src: &ColorMap) -> ColorMap {
    let (min, max) = src
        .pixels()
        .map(luma)
        .fold((f32::MAX, f32::MIN), |(lo, hi), l| (lo.min(l), hi.max(l)));
    if max - min <= f32::EPSILON {
        return src.clone();
    }

    let factor = 255.0 / (max - min);
    map_channels(src, |c| (c as f32 - min) * factor)
}

fn map_channels(src: &ColorMap, f: impl Fn(u8) -> f32) -> ColorMap {
    let mut result = src.clone();
    for pixel in result.pixels_mut() {
        for c in 0..3 {
            pixel[c] = f(pixel[c]).round().clamp(0.0, 255.0) as u8;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_mean_hits_target() {
        let src = ColorMap::from_pixel(4, 4, Rgba([64, 64, 64, 200]));
        let out = normalize_mean(&src, 128);
        assert_eq!(out.get_pixel(0, 0), &Rgba([128, 128, 128, 200]));
    }

    #[test]
    fn test_mean_leaves_black_alone() {
        let src = ColorMap::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        assert_eq!(normalize_mean(&src, 128), src);
    }

    #[test]
    fn test_min_max_stretches() {
        let mut src = ColorMap::from_pixel(2, 1, Rgba([100, 100, 100, 255]));
        src.put_pixel(1, 0, Rgba([150, 150, 150, 255]));

        let out = normalize_min_max(&src);
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(1, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_min_max_flat_image() {
        let src = ColorMap::from_pixel(3, 3, Rgba([10, 10, 10, 255]));
        assert_eq!(normalize_min_max(&src), src);
    }
}
