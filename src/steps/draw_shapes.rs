//! Draw Shapes: render a line collection onto an image or a blank canvas.

use super::names::COLOR_IMAGE;
use super::{bounded_size, dimension, MAX_SIZE};
use crate::core::context::{OutputSink, StepInput};
use crate::core::error::StepError;
use crate::core::parameter::ParameterDescriptor;
use crate::core::step::StepDelegate;
use crate::core::store::{ParameterBuilder, ParameterSnapshot};
use crate::core::types::{ColorMap, Payload};
use crate::functions::draw::{draw_shapes, DrawMode};
use image::Rgba;

pub const CANVAS_MODE: &str = "canvas_mode";
pub const WIDTH: &str = "width";
pub const HEIGHT: &str = "height";
pub const SHAPES: &str = "shapes";
pub const DRAW_MODE: &str = "draw_mode";
pub const RED: &str = "red";
pub const GREEN: &str = "green";
pub const BLUE: &str = "blue";

pub const OUTPUT_IMAGE: &str = "output_image";

/// What the shapes are drawn onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasMode {
    /// A copy of a named color image
    #[default]
    SourceImage,
    /// A new opaque black image
    BlankCanvas,
}

impl CanvasMode {
    pub const NAMES: &'static [&'static str] = &["Source image", "Blank canvas"];

    pub fn from_name(name: &str) -> Self {
        match name {
            "Blank canvas" => CanvasMode::BlankCanvas,
            _ => CanvasMode::SourceImage,
        }
    }
}

/// Draws shapes. Needs both a canvas and shapes, so it never falls back to
/// the previous step.
#[derive(Debug, Clone, Copy)]
pub struct DrawShapes;

impl StepDelegate for DrawShapes {
    fn fixup_parameters(&self, params: &mut ParameterBuilder<'_>) {
        params.set_output_names(&[OUTPUT_IMAGE]);

        params.add(
            ParameterDescriptor::enumeration(CANVAS_MODE, CanvasMode::NAMES)
                .with_description("What to draw the shapes onto."),
        );
        let canvas_mode = CanvasMode::from_name(params.string(CANVAS_MODE));
        let blank = canvas_mode == CanvasMode::BlankCanvas;

        params.add(
            ParameterDescriptor::named_data(COLOR_IMAGE)
                .with_description("The image to draw onto.")
                .with_enabled(!blank),
        );
        params.add(
            bounded_size(WIDTH, 1, MAX_SIZE, 256)
                .with_description("The width of the blank canvas.")
                .with_enabled(blank),
        );
        params.add(
            bounded_size(HEIGHT, 1, MAX_SIZE, 256)
                .with_description("The height of the blank canvas.")
                .with_enabled(blank),
        );
        params.add(ParameterDescriptor::named_data(SHAPES).with_description("The shapes to draw."));
        params.add(
            ParameterDescriptor::enumeration(DRAW_MODE, DrawMode::NAMES)
                .with_description("Draw the outline of each shape, or fill it."),
        );
        for channel in [RED, GREEN, BLUE] {
            params.add(
                bounded_size(channel, 0, 255, 255)
                    .with_description(format!("The {} component of the drawing color.", channel)),
            );
        }
    }

    fn execute(&self, params: &ParameterSnapshot, input: &StepInput<'_>, output: &mut OutputSink) {
        let mut canvas = match CanvasMode::from_name(params.string(CANVAS_MODE)) {
            CanvasMode::SourceImage => match input.color_map(params.string(COLOR_IMAGE)) {
                Some(src) => src.clone(),
                None => {
                    output.add_error(StepError::missing("source image"));
                    return;
                }
            },
            CanvasMode::BlankCanvas => ColorMap::from_pixel(
                dimension(params, WIDTH),
                dimension(params, HEIGHT),
                Rgba([0, 0, 0, 255]),
            ),
        };

        let Some(shapes) = input.line_collection(params.string(SHAPES)) else {
            output.add_error(StepError::missing("shapes"));
            return;
        };

        let channel = |name: &str| params.size(name).min(255) as u8;
        let color = Rgba([channel(RED), channel(GREEN), channel(BLUE), 255]);
        let mode = DrawMode::from_name(params.string(DRAW_MODE));

        draw_shapes(&mut canvas, shapes, mode, color);
        output.publish(params.lookup_output_name(OUTPUT_IMAGE), Payload::ColorMap(canvas));
    }
}
