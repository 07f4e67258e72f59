//! Pure image transformations used by the step kinds.
//!
//! Nothing in here knows about parameters, names or sinks. Functions take
//! payloads and plain values and return new payloads, or an error message
//! when the inputs cannot be used.

pub mod draw;
pub mod extract;
pub mod normalize;
pub mod scale;
pub mod to_float;

use image::Rgba;

/// Largest width or height any step produces.
pub const MAX_DIMENSION: u32 = 10_000;

/// Rec. 709 luma of a pixel, in 0..255.
pub(crate) fn luma(pixel: &Rgba<u8>) -> f32 {
    0.2126 * pixel[0] as f32 + 0.7152 * pixel[1] as f32 + 0.0722 * pixel[2] as f32
}

/// Whether an image holds no pixels at all.
pub fn is_empty<P: image::Pixel>(image: &image::ImageBuffer<P, Vec<P::Subpixel>>) -> bool {
    image.width() == 0 || image.height() == 0
}
