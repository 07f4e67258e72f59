//! To Float: convert color images into flat float buffers.

use super::color_sources;
use super::names::COLOR_IMAGE;
use crate::core::context::{OutputSink, StepInput};
use crate::core::parameter::ParameterDescriptor;
use crate::core::step::StepDelegate;
use crate::core::store::{ParameterBuilder, ParameterSnapshot};
use crate::core::types::Payload;
use crate::functions::to_float::{to_float, ChannelMode, ChannelOrder};

pub const CHANNEL_MODE: &str = "channel_mode";
pub const CHANNEL_ORDER: &str = "channel_order";

pub const OUTPUT_DATA: &str = "output_data";

/// Converts color maps to floats in 0..1.
///
/// With no source named, every color map of the previous step is converted.
#[derive(Debug, Clone, Copy)]
pub struct ToFloat;

impl StepDelegate for ToFloat {
    fn fixup_parameters(&self, params: &mut ParameterBuilder<'_>) {
        params.set_output_names(&[OUTPUT_DATA]);

        params.add(
            ParameterDescriptor::named_data(COLOR_IMAGE)
                .with_description("The source image to convert to floats."),
        );
        params.add(
            ParameterDescriptor::enumeration(CHANNEL_MODE, ChannelMode::NAMES)
                .with_description("Select how channels are stored in memory."),
        );
        params.add(
            ParameterDescriptor::enumeration(CHANNEL_ORDER, ChannelOrder::NAMES)
                .with_description("Select how channels are ordered in memory."),
        );
    }

    fn execute(&self, params: &ParameterSnapshot, input: &StepInput<'_>, output: &mut OutputSink) {
        let mode = ChannelMode::from_name(params.string(CHANNEL_MODE));
        let order = ChannelOrder::from_name(params.string(CHANNEL_ORDER));

        for src in color_sources(params.string(COLOR_IMAGE), input, "source color image", output) {
            output.publish(
                params.lookup_output_name(OUTPUT_DATA),
                Payload::Floats(to_float(src, mode, order)),
            );
        }
    }
}
