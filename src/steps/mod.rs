//! Built-in step kinds.
//!
//! Each submodule holds one stateless delegate together with the names of
//! its parameters and output slots.

pub mod draw_shapes;
pub mod extract_rect;
pub mod normalize_brightness;
pub mod scale;
pub mod to_float;

pub use draw_shapes::{CanvasMode, DrawShapes};
pub use extract_rect::{AreaMode, ExtractRect, OriginMode};
pub use normalize_brightness::NormalizeBrightness;
pub use scale::Scale;
pub use to_float::ToFloat;

use crate::core::context::{OutputSink, StepInput};
use crate::core::error::StepError;
use crate::core::parameter::ParameterDescriptor;
use crate::core::store::ParameterSnapshot;
use crate::core::types::{ColorMap, MemberKind};
use crate::functions::MAX_DIMENSION;

/// Upper bound of every size parameter.
pub(crate) const MAX_SIZE: usize = MAX_DIMENSION as usize;

/// Parameter names shared by several step kinds.
pub mod names {
    pub const COLOR_IMAGE: &str = "color_image";
    pub const DESTINATION_WIDTH: &str = "destination_width";
    pub const DESTINATION_HEIGHT: &str = "destination_height";
}

/// Read a size parameter as an image dimension.
pub(crate) fn dimension(params: &ParameterSnapshot, name: &str) -> u32 {
    u32::try_from(params.size(name)).unwrap_or(u32::MAX)
}

/// A size parameter bounded to `[min, max]` with a default.
pub(crate) fn bounded_size(name: &str, min: usize, max: usize, default: usize) -> ParameterDescriptor {
    ParameterDescriptor::size(name)
        .with_range(min as f64, max as f64)
        .with_default(default)
}

/// Color maps a single-input step should transform.
///
/// A non-empty `name` resolves exactly that member and reports `what` as
/// missing when it does not exist. An empty `name` takes every color map
/// the previous step published.
pub(crate) fn color_sources<'a>(
    name: &str,
    input: &StepInput<'a>,
    what: &str,
    output: &mut OutputSink,
) -> Vec<&'a ColorMap> {
    if !name.is_empty() {
        return match input.color_map(name) {
            Some(image) => vec![image],
            None => {
                output.add_error(StepError::missing(what));
                Vec::new()
            }
        };
    }

    let Some(previous) = input.previous_step() else {
        output.add_error(StepError::NoUpstream);
        return Vec::new();
    };

    let sources: Vec<_> = previous
        .members()
        .iter()
        .filter(|m| m.kind() == MemberKind::ColorMap)
        .filter_map(|m| m.as_color_map())
        .collect();
    log::debug!(
        "No source named, using {} color maps from the previous step",
        sources.len()
    );
    sources
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::context::{OutputSink, StepInput};
    use crate::core::store::StepDetails;
    use crate::core::types::{ColorMap, Member, Payload};

    /// Run a configured step against earlier outputs.
    pub fn run(details: &StepDetails, previous: &[OutputSink]) -> OutputSink {
        details
            .kind()
            .execute(&details.snapshot(), &StepInput::new(previous))
    }

    /// A step output holding the given members.
    pub fn step_with(members: Vec<(&str, Payload)>) -> OutputSink {
        let mut sink = OutputSink::new();
        for (name, payload) in members {
            sink.add_member(Member::new(name, payload));
        }
        sink
    }

    /// An image whose red and green channels encode the pixel position.
    pub fn gradient(width: u32, height: u32) -> ColorMap {
        ColorMap::from_fn(width, height, |x, y| image::Rgba([x as u8, y as u8, 0, 255]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::step::StepKind;
    use crate::core::store::StepDetails;
    use crate::core::types::ParamValue;
    use proptest::prelude::*;

    fn any_kind() -> impl Strategy<Value = StepKind> {
        prop::sample::select(StepKind::all().to_vec())
    }

    fn any_value() -> impl Strategy<Value = ParamValue> {
        prop_oneof![
            (0usize..20_000).prop_map(ParamValue::Size),
            (-10.0f64..300.0).prop_map(ParamValue::Float),
            prop::sample::select(vec![
                "", "Rect", "Area", "Grid", "XY", "CenterCrop", "Centered", "Planar", "Grey",
                "Filled", "Blank canvas", "Min max", "Custom", "junk",
            ])
            .prop_map(ParamValue::from),
        ]
    }

    proptest! {
        #[test]
        fn recompute_is_idempotent(
            kind in any_kind(),
            edits in prop::collection::vec((0usize..16, any_value()), 0..12),
        ) {
            let mut details = StepDetails::new(kind);
            for (index, value) in edits {
                let names: Vec<String> = details.parameters_order().iter().map(|n| n.to_string()).collect();
                let name = &names[index % names.len()];
                // Type mismatches are rejected and leave the store untouched
                let _ = details.set_parameter_value(name, value);
                details.recompute();
            }

            let once = details.clone();
            details.recompute();
            prop_assert_eq!(once, details);
        }

        #[test]
        fn kind_changes_keep_the_schema_consistent(from in any_kind(), to in any_kind()) {
            let mut details = StepDetails::new(from);
            details.set_kind(to);
            let fresh = StepDetails::new(to);
            prop_assert_eq!(details.parameters_order(), fresh.parameters_order());
            prop_assert_eq!(details.output_names(), fresh.output_names());
        }
    }

    #[test]
    fn test_every_kind_declares_outputs_and_valid_parameters() {
        for kind in StepKind::all() {
            let details = StepDetails::new(*kind);
            assert!(!details.output_names().is_empty(), "{}", kind);
            assert_eq!(
                details.valid_parameters().len(),
                details.parameters().count(),
                "{}",
                kind
            );
        }
    }

    #[test]
    fn test_missing_source_image_is_one_error_for_every_kind() {
        for kind in StepKind::all() {
            let mut details = StepDetails::new(*kind);
            details
                .set_parameter_value(names::COLOR_IMAGE, "nowhere")
                .unwrap();
            if *kind == StepKind::DrawShapes {
                details.set_parameter_value("shapes", "outline").unwrap();
            }
            details.recompute();

            let previous = vec![test_support::step_with(vec![(
                "outline",
                crate::core::types::Payload::LineCollection(vec![]),
            )])];
            let output = test_support::run(&details, &previous);
            assert_eq!(output.errors().len(), 1, "{}: {:?}", kind, output.errors());
            assert!(output.members().is_empty(), "{}", kind);
        }
    }

    #[test]
    fn test_color_sources_fallback() {
        let previous = vec![test_support::step_with(vec![
            ("a", crate::core::types::Payload::ColorMap(ColorMap::new(1, 1))),
            ("b", crate::core::types::Payload::ByteMap(image::GrayImage::new(1, 1))),
            ("c", crate::core::types::Payload::ColorMap(ColorMap::new(2, 2))),
        ])];
        let input = StepInput::new(&previous);
        let mut output = OutputSink::new();

        let sources = color_sources("", &input, "source image", &mut output);
        assert_eq!(sources.len(), 2);
        assert!(output.is_empty());

        let sources = color_sources("b", &input, "source image", &mut output);
        assert!(sources.is_empty());
        assert_eq!(output.errors(), ["Failed to find source image.".to_string()]);
    }

    #[test]
    fn test_color_sources_without_upstream() {
        let mut output = OutputSink::new();
        let sources = color_sources("", &StepInput::default(), "source image", &mut output);
        assert!(sources.is_empty());
        assert_eq!(output.errors(), ["No input data found.".to_string()]);
    }
}
