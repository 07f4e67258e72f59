//! Conversion of color images into flat float buffers.

use crate::core::types::{ColorMap, Floats};

/// How channels are laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelMode {
    /// All channels of a pixel next to each other
    #[default]
    Interleaved,
    /// One full plane per channel
    Planar,
}

impl ChannelMode {
    pub const NAMES: &'static [&'static str] = &["Interleaved", "Planar"];

    pub fn from_name(name: &str) -> Self {
        match name {
            "Planar" => ChannelMode::Planar,
            _ => ChannelMode::Interleaved,
        }
    }
}

/// Which channels are written, and in what order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    #[default]
    Rgba,
    Bgra,
    Rgb,
    Bgr,
    Grey,
}

impl ChannelOrder {
    pub const NAMES: &'static [&'static str] = &["RGBA", "BGRA", "RGB", "BGR", "Grey"];

    pub fn from_name(name: &str) -> Self {
        match name {
            "BGRA" => ChannelOrder::Bgra,
            "RGB" => ChannelOrder::Rgb,
            "BGR" => ChannelOrder::Bgr,
            "Grey" => ChannelOrder::Grey,
            _ => ChannelOrder::Rgba,
        }
    }

    pub fn channels(&self) -> usize {
        match self {
            ChannelOrder::Rgba | ChannelOrder::Bgra => 4,
            ChannelOrder::Rgb | ChannelOrder::Bgr => 3,
            ChannelOrder::Grey => 1,
        }
    }

    fn sample(&self, pixel: &image::Rgba<u8>, channel: usize) -> f32 {
        let index = match self {
            ChannelOrder::Rgba | ChannelOrder::Rgb => channel,
            ChannelOrder::Bgra | ChannelOrder::Bgr => match channel {
                0 => 2,
                2 => 0,
                other => other,
            },
            ChannelOrder::Grey => return super::luma(pixel) / 255.0,
        };
        pixel[index] as f32 / 255.0
    }
}

/// Convert every pixel of `src` into floats in 0..1.
pub fn to_float(src: &ColorMap, mode: ChannelMode, order: ChannelOrder) -> Floats {
    let channels = order.channels();
    let pixel_count = (src.width() * src.height()) as usize;
    let mut data = Vec::with_capacity(pixel_count * channels);

    match mode {
        ChannelMode::Interleaved => {
            for pixel in src.pixels() {
                data.extend((0..channels).map(|c| order.sample(pixel, c)));
            }
        }
        ChannelMode::Planar => {
            for c in 0..channels {
                data.extend(src.pixels().map(|pixel| order.sample(pixel, c)));
            }
        }
    }

    Floats {
        width: src.width(),
        height: src.height(),
        channels,
        data,
    }
}
