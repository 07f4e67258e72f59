//! Scale: resize a color image and/or a byte map.

use super::{dimension, MAX_SIZE};
use super::names::{COLOR_IMAGE, DESTINATION_HEIGHT, DESTINATION_WIDTH};
use crate::core::context::{OutputSink, StepInput};
use crate::core::error::{ParameterResult, StepError};
use crate::core::parameter::ParameterDescriptor;
use crate::core::step::{StepDelegate, StepKind};
use crate::core::store::{ParameterBuilder, ParameterSnapshot, StepDetails};
use crate::core::types::Payload;
use crate::functions::scale::{calculate_size, scale_byte_map, scale_color_map, ScaleFunction};

pub const BYTE_MAP: &str = "byte_map";
pub const FUNCTION: &str = "function";

pub const OUTPUT_COLOR_IMAGE: &str = "output_color_image";
pub const OUTPUT_BYTE_MAP: &str = "output_byte_map";

/// Resizes images, deriving a missing dimension from the aspect ratio.
#[derive(Debug, Clone, Copy)]
pub struct Scale;

impl Scale {
    /// Details for a scale step with the given target size.
    pub fn details(width: usize, height: usize) -> ParameterResult<StepDetails> {
        let mut details = StepDetails::new(StepKind::Scale);
        details.set_parameter_value(DESTINATION_WIDTH, width)?;
        details.set_parameter_value(DESTINATION_HEIGHT, height)?;
        details.recompute();
        Ok(details)
    }
}

impl StepDelegate for Scale {
    fn fixup_parameters(&self, params: &mut ParameterBuilder<'_>) {
        params.set_output_names(&[OUTPUT_COLOR_IMAGE, OUTPUT_BYTE_MAP]);

        // Zero means "derive from the source", so there is no default to clamp to
        params.add(
            ParameterDescriptor::size(DESTINATION_WIDTH)
                .with_description("The width of the image generated by this step.")
                .with_range(0.0, MAX_SIZE as f64),
        );
        params.add(
            ParameterDescriptor::size(DESTINATION_HEIGHT)
                .with_description("The height of the image generated by this step.")
                .with_range(0.0, MAX_SIZE as f64),
        );
        params.add(
            ParameterDescriptor::named_data(COLOR_IMAGE).with_description("The source image to scale."),
        );
        params.add(
            ParameterDescriptor::named_data(BYTE_MAP).with_description("The source byte map to scale."),
        );
        params.add(
            ParameterDescriptor::enumeration(FUNCTION, ScaleFunction::NAMES)
                .with_description("The function to use for downscaling images."),
        );
    }

    fn execute(&self, params: &ParameterSnapshot, input: &StepInput<'_>, output: &mut OutputSink) {
        let width = dimension(params, DESTINATION_WIDTH);
        let height = dimension(params, DESTINATION_HEIGHT);
        let function = ScaleFunction::from_name(params.string(FUNCTION));

        let color_image_name = params.string(COLOR_IMAGE);
        if !color_image_name.is_empty() {
            match input.color_map(color_image_name) {
                Some(src) => {
                    let (w, h) = calculate_size(width, height, src.width(), src.height());
                    output.publish(
                        params.lookup_output_name(OUTPUT_COLOR_IMAGE),
                        Payload::ColorMap(scale_color_map(src, w, h, function)),
                    );
                }
                None => output.add_error(StepError::missing("color image")),
            }
        }

        let byte_map_name = params.string(BYTE_MAP);
        if !byte_map_name.is_empty() {
            match input.byte_map(byte_map_name) {
                Some(src) => {
                    let (w, h) = calculate_size(width, height, src.width(), src.height());
                    output.publish(
                        params.lookup_output_name(OUTPUT_BYTE_MAP),
                        Payload::ByteMap(scale_byte_map(src, w, h, function)),
                    );
                }
                None => output.add_error(StepError::missing("byte map image")),
            }
        }
    }
}
