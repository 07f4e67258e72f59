//! Normalize Brightness: adjust color images to a common brightness.

use super::names::COLOR_IMAGE;
use super::{bounded_size, color_sources};
use crate::core::context::{OutputSink, StepInput};
use crate::core::parameter::ParameterDescriptor;
use crate::core::step::StepDelegate;
use crate::core::store::{ParameterBuilder, ParameterSnapshot};
use crate::core::types::Payload;
use crate::functions::normalize::{normalize_mean, normalize_min_max, BrightnessMethod};

pub const METHOD: &str = "method";
pub const TARGET_BRIGHTNESS: &str = "target_brightness";

pub const OUTPUT_IMAGE: &str = "output_image";

#[derive(Debug, Clone, Copy)]
pub struct NormalizeBrightness;

impl StepDelegate for NormalizeBrightness {
    fn fixup_parameters(&self, params: &mut ParameterBuilder<'_>) {
        params.set_output_names(&[OUTPUT_IMAGE]);

        params.add(
            ParameterDescriptor::named_data(COLOR_IMAGE)
                .with_description("The image to normalize. Leave empty to use the previous step."),
        );
        params.add(
            ParameterDescriptor::enumeration(METHOD, BrightnessMethod::NAMES)
                .with_description("How to normalize the brightness."),
        );
        let method = BrightnessMethod::from_name(params.string(METHOD));

        params.add(
            bounded_size(TARGET_BRIGHTNESS, 0, 255, 128)
                .with_description("The mean brightness to aim for.")
                .with_enabled(method == BrightnessMethod::Mean),
        );
    }

    fn execute(&self, params: &ParameterSnapshot, input: &StepInput<'_>, output: &mut OutputSink) {
        let method = BrightnessMethod::from_name(params.string(METHOD));
        let target = params.size(TARGET_BRIGHTNESS).min(255) as u8;

        for src in color_sources(params.string(COLOR_IMAGE), input, "source image", output) {
            let image = match method {
                BrightnessMethod::Mean => normalize_mean(src, target),
                BrightnessMethod::MinMax => normalize_min_max(src),
            };
            output.publish(params.lookup_output_name(OUTPUT_IMAGE), Payload::ColorMap(image));
        }
    }
}
