//! Extract Rect: cut a rectangle, a quadrilateral or a grid out of an image.

use super::names::{COLOR_IMAGE, DESTINATION_HEIGHT, DESTINATION_WIDTH};
use super::{bounded_size, dimension, MAX_SIZE};
use crate::core::context::{OutputSink, StepInput};
use crate::core::error::{ParameterResult, StepError};
use crate::core::parameter::ParameterDescriptor;
use crate::core::step::{StepDelegate, StepKind};
use crate::core::store::{ParameterBuilder, ParameterSnapshot, StepDetails};
use crate::core::types::{Grid, Line, Payload};
use crate::functions::{self, extract};
use image::Rgba;

pub const MODE: &str = "mode";
pub const ORIGIN_MODE: &str = "origin_mode";
pub const X: &str = "x";
pub const Y: &str = "y";
pub const CLIPPING_AREA: &str = "clipping_area";
pub const CLIPPING_GRID: &str = "clipping_grid";

pub const OUTPUT_DATA: &str = "output_data";

/// How the region to extract is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AreaMode {
    /// Explicit origin and size
    #[default]
    Rect,
    /// First four points of a named line collection
    Area,
    /// Outer boundary of a named grid
    Grid,
}

impl AreaMode {
    pub const NAMES: &'static [&'static str] = &["Rect", "Area", "Grid"];

    pub fn from_name(name: &str) -> Self {
        match name {
            "Area" => AreaMode::Area,
            "Grid" => AreaMode::Grid,
            _ => AreaMode::Rect,
        }
    }
}

/// How the origin of a [`AreaMode::Rect`] extraction is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OriginMode {
    /// Use the `x` and `y` parameters
    #[default]
    XY,
    /// Legacy center crop.
    ///
    /// The horizontal offset is computed from the widths and is then
    /// overwritten by the vertical offset computed from the heights; `y`
    /// keeps its parameter value. Pipelines saved with this mode produce the
    /// same output as before.
    CenterCrop,
    /// Center the rectangle on both axes
    Centered,
}

impl OriginMode {
    pub const NAMES: &'static [&'static str] = &["XY", "CenterCrop", "Centered"];

    pub fn from_name(name: &str) -> Self {
        match name {
            "CenterCrop" => OriginMode::CenterCrop,
            "Centered" => OriginMode::Centered,
            _ => OriginMode::XY,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OriginMode::XY => "XY",
            OriginMode::CenterCrop => "CenterCrop",
            OriginMode::Centered => "Centered",
        }
    }

    /// Top-left corner of a `size` rectangle cut from a `source` image.
    pub fn origin(&self, xy: (u32, u32), source: (u32, u32), size: (u32, u32)) -> (u32, u32) {
        let (x, y) = xy;
        let (src_width, src_height) = source;
        let (width, height) = size;

        match self {
            OriginMode::XY => (x, y),
            OriginMode::CenterCrop => {
                let mut x = x;
                if src_width > width {
                    x = (src_width - width) / 2;
                }
                if src_height > height {
                    x = (src_height - height) / 2;
                }
                (x, y)
            }
            OriginMode::Centered => (
                src_width.saturating_sub(width) / 2,
                src_height.saturating_sub(height) / 2,
            ),
        }
    }
}

/// The resolved region for one execution.
enum Region<'a> {
    Rect,
    Area(&'a Line),
    Grid(&'a Grid),
}

/// Cuts a region out of a color image.
#[derive(Debug, Clone, Copy)]
pub struct ExtractRect;

impl ExtractRect {
    /// Details for a rectangle extraction from `in_name`, published as
    /// `out_name`.
    pub fn details(
        in_name: &str,
        out_name: &str,
        origin_mode: OriginMode,
        width: usize,
        height: usize,
    ) -> ParameterResult<StepDetails> {
        let mut details = StepDetails::new(StepKind::ExtractRect);
        details.set_parameter_value(COLOR_IMAGE, in_name)?;
        details.set_output_mapping([(OUTPUT_DATA, out_name)]);
        details.set_parameter_value(ORIGIN_MODE, origin_mode.name())?;
        details.set_parameter_value(DESTINATION_WIDTH, width)?;
        details.set_parameter_value(DESTINATION_HEIGHT, height)?;
        details.recompute();
        Ok(details)
    }
}

impl StepDelegate for ExtractRect {
    fn fixup_parameters(&self, params: &mut ParameterBuilder<'_>) {
        params.set_output_names(&[OUTPUT_DATA]);

        params.add(
            ParameterDescriptor::enumeration(MODE, AreaMode::NAMES)
                .with_description("The type of area to cut out."),
        );
        let area_mode = AreaMode::from_name(params.string(MODE));

        params.add(
            ParameterDescriptor::enumeration(ORIGIN_MODE, OriginMode::NAMES)
                .with_description("How to calculate the x,y coords of the rect.")
                .with_enabled(area_mode == AreaMode::Rect),
        );
        let origin_mode = OriginMode::from_name(params.string(ORIGIN_MODE));

        params.add(
            ParameterDescriptor::named_data(COLOR_IMAGE)
                .with_description("The source image to cut the shape from."),
        );
        params.add(
            bounded_size(DESTINATION_WIDTH, 0, MAX_SIZE, 0)
                .with_description("The width of the image generated by this step."),
        );
        params.add(
            bounded_size(DESTINATION_HEIGHT, 0, MAX_SIZE, 0)
                .with_description("The height of the image generated by this step."),
        );

        let xy_enabled = area_mode == AreaMode::Rect && origin_mode == OriginMode::XY;
        params.add(
            bounded_size(X, 0, MAX_SIZE, 0)
                .with_description("The x origin of this rect.")
                .with_enabled(xy_enabled),
        );
        params.add(
            bounded_size(Y, 0, MAX_SIZE, 0)
                .with_description("The y origin of this rect.")
                .with_enabled(xy_enabled),
        );

        params.add(
            ParameterDescriptor::named_data(CLIPPING_AREA)
                .with_description("The shape to cut out.")
                .with_enabled(area_mode == AreaMode::Area),
        );
        params.add(
            ParameterDescriptor::named_grid(CLIPPING_GRID)
                .with_description("The grid to cut out.")
                .with_enabled(area_mode == AreaMode::Grid),
        );
    }

    fn execute(&self, params: &ParameterSnapshot, input: &StepInput<'_>, output: &mut OutputSink) {
        let area_mode = AreaMode::from_name(params.string(MODE));
        let origin_mode = OriginMode::from_name(params.string(ORIGIN_MODE));

        let Some(src) = input.color_map(params.string(COLOR_IMAGE)) else {
            output.add_error(StepError::missing("source image"));
            return;
        };

        let clipping_grid = input.grid(params.string(CLIPPING_GRID));

        let region = match area_mode {
            AreaMode::Rect => Region::Rect,
            AreaMode::Area => match input.line_collection(params.string(CLIPPING_AREA)) {
                None => {
                    output.add_error(StepError::missing("clipping area"));
                    return;
                }
                Some(shapes) => match shapes.first() {
                    Some(shape) => Region::Area(shape),
                    None => {
                        output.add_error(StepError::empty("clipping area"));
                        return;
                    }
                },
            },
            AreaMode::Grid => match clipping_grid {
                None => {
                    output.add_error(StepError::missing("clipping grid"));
                    return;
                }
                Some(grid) if grid.is_empty() => {
                    output.add_error(StepError::empty("clipping grid"));
                    return;
                }
                Some(grid) => Region::Grid(grid),
            },
        };

        if functions::is_empty(src) {
            log::debug!("Source image is empty, nothing to extract");
            return;
        }

        let (default_width, default_height) = match clipping_grid.filter(|g| !g.is_empty()) {
            Some(grid) => extract::grid_size(grid),
            None => src.dimensions(),
        };
        let mut width = dimension(params, DESTINATION_WIDTH);
        let mut height = dimension(params, DESTINATION_HEIGHT);
        if width < 1 {
            width = default_width;
        }
        if height < 1 {
            height = default_height;
        }

        let result = match region {
            Region::Area(shape) => extract::extract_quad(src, shape, width, height),
            Region::Grid(grid) => extract::extract_grid(src, grid, width, height),
            Region::Rect => {
                if width == 0 || height == 0 {
                    return;
                }
                let xy = (dimension(params, X), dimension(params, Y));
                let (x, y) = origin_mode.origin(xy, src.dimensions(), (width, height));
                Ok(extract::extract_rect(
                    src,
                    x,
                    y,
                    width,
                    height,
                    Rgba([0, 0, 0, 255]),
                ))
            }
        };

        match result {
            Ok(image) => output.publish(
                params.lookup_output_name(OUTPUT_DATA),
                Payload::ColorMap(image),
            ),
            Err(message) => output.add_error(StepError::Transform(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ColorMap, ParamValue, Point};
    use crate::steps::test_support::{gradient, run, step_with};

    fn grid_4x3() -> Grid {
        Grid {
            origin: Point::new(1.0, 1.0),
            x_axis: Point::new(2.5, 0.0),
            y_axis: Point::new(0.0, 3.1),
            x_cells: 4,
            y_cells: 3,
        }
    }

    fn details_in(mode: &str) -> StepDetails {
        let mut details = StepDetails::new(StepKind::ExtractRect);
        details.set_parameter_value(MODE, mode).unwrap();
        details.set_parameter_value(COLOR_IMAGE, "src").unwrap();
        details.set_parameter_value(CLIPPING_AREA, "shapes").unwrap();
        details.set_parameter_value(CLIPPING_GRID, "grid").unwrap();
        details.recompute();
        details
    }

    fn only_image(output: &OutputSink) -> &ColorMap {
        assert!(output.errors().is_empty(), "{:?}", output.errors());
        assert_eq!(output.members().len(), 1);
        output.members()[0].as_color_map().unwrap()
    }

    #[test]
    fn test_parameter_order_and_enabled_state() {
        let details = StepDetails::new(StepKind::ExtractRect);
        assert_eq!(
            details.parameters_order(),
            vec![
                MODE,
                ORIGIN_MODE,
                COLOR_IMAGE,
                DESTINATION_WIDTH,
                DESTINATION_HEIGHT,
                X,
                Y,
                CLIPPING_AREA,
                CLIPPING_GRID
            ]
        );
        let visible: Vec<_> = details.visible_parameters().map(|p| p.name.as_str()).collect();
        assert!(visible.contains(&X));
        assert!(!visible.contains(&CLIPPING_GRID));

        let grid = details_in("Grid");
        let visible: Vec<_> = grid.visible_parameters().map(|p| p.name.as_str()).collect();
        assert!(!visible.contains(&ORIGIN_MODE));
        assert!(!visible.contains(&X));
        assert!(visible.contains(&CLIPPING_GRID));
    }

    #[test]
    fn test_center_crop_disables_xy() {
        let mut details = StepDetails::new(StepKind::ExtractRect);
        details.set_parameter_value(ORIGIN_MODE, "CenterCrop").unwrap();
        details.recompute();
        assert!(!details.parameter(X).unwrap().enabled);
        assert!(!details.parameter(Y).unwrap().enabled);
    }

    #[test]
    fn test_rect_defaults_to_source_size() {
        let previous = vec![step_with(vec![("src", Payload::ColorMap(gradient(100, 100)))])];
        let output = run(&details_in("Rect"), &previous);
        assert_eq!(only_image(&output).dimensions(), (100, 100));
        assert_eq!(output.members()[0].name, OUTPUT_DATA);
    }

    #[test]
    fn test_rect_with_explicit_origin() {
        let mut details = details_in("Rect");
        details.set_parameter_value(X, 10usize).unwrap();
        details.set_parameter_value(Y, 20usize).unwrap();
        details.set_parameter_value(DESTINATION_WIDTH, 5usize).unwrap();
        details.set_parameter_value(DESTINATION_HEIGHT, 6usize).unwrap();
        details.recompute();

        let previous = vec![step_with(vec![("src", Payload::ColorMap(gradient(50, 50)))])];
        let output = run(&details, &previous);
        let image = only_image(&output);
        assert_eq!(image.dimensions(), (5, 6));
        assert_eq!(image.get_pixel(0, 0), &Rgba([10, 20, 0, 255]));
    }

    #[test]
    fn test_center_crop_keeps_legacy_offsets() {
        let previous = vec![step_with(vec![("src", Payload::ColorMap(gradient(100, 60)))])];

        let mut details = ExtractRect::details("src", "crop", OriginMode::CenterCrop, 50, 20).unwrap();
        details.set_parameter_value(Y, 3usize).unwrap();
        let output = run(&details, &previous);
        let image = only_image(&output);
        // x comes from the heights, y from the parameter
        assert_eq!(image.get_pixel(0, 0), &Rgba([20, 3, 0, 255]));
        assert_eq!(output.members()[0].name, "crop");
    }

    #[test]
    fn test_centered_offsets_both_axes() {
        let previous = vec![step_with(vec![("src", Payload::ColorMap(gradient(100, 60)))])];
        let details = ExtractRect::details("src", "crop", OriginMode::Centered, 50, 20).unwrap();
        let output = run(&details, &previous);
        assert_eq!(only_image(&output).get_pixel(0, 0), &Rgba([25, 20, 0, 255]));
    }

    #[test]
    fn test_grid_metrics_give_default_size() {
        let previous = vec![step_with(vec![
            ("src", Payload::ColorMap(gradient(40, 40))),
            ("grid", Payload::Grid(grid_4x3())),
        ])];
        let output = run(&details_in("Grid"), &previous);
        assert_eq!(only_image(&output).dimensions(), (12, 12));
    }

    #[test]
    fn test_area_uses_first_shape() {
        let quad = vec![
            Point::new(4.0, 4.0),
            Point::new(12.0, 4.0),
            Point::new(12.0, 12.0),
            Point::new(4.0, 12.0),
        ];
        let mut details = details_in("Area");
        details.set_parameter_value(DESTINATION_WIDTH, 8usize).unwrap();
        details.set_parameter_value(DESTINATION_HEIGHT, 8usize).unwrap();
        details.recompute();

        let previous = vec![step_with(vec![
            ("src", Payload::ColorMap(gradient(16, 16))),
            ("shapes", Payload::LineCollection(vec![quad, vec![]])),
        ])];
        let output = run(&details, &previous);
        assert_eq!(only_image(&output).dimensions(), (8, 8));
    }

    fn square(min: f32, max: f32) -> Line {
        vec![
            Point::new(min, min),
            Point::new(max, min),
            Point::new(max, max),
            Point::new(min, max),
        ]
    }

    #[test]
    fn test_area_defaults_from_grid_metrics() {
        let previous = vec![step_with(vec![
            ("src", Payload::ColorMap(gradient(40, 40))),
            ("shapes", Payload::LineCollection(vec![square(4.0, 20.0)])),
            ("grid", Payload::Grid(grid_4x3())),
        ])];
        let output = run(&details_in("Area"), &previous);
        assert_eq!(only_image(&output).dimensions(), (12, 12));
    }

    #[test]
    fn test_area_defaults_from_source() {
        let previous = vec![step_with(vec![
            ("src", Payload::ColorMap(gradient(40, 30))),
            ("shapes", Payload::LineCollection(vec![square(4.0, 20.0)])),
        ])];
        let output = run(&details_in("Area"), &previous);
        assert_eq!(only_image(&output).dimensions(), (40, 30));
    }

    #[test]
    fn test_rect_defaults_from_grid_when_configured() {
        let previous = vec![step_with(vec![
            ("src", Payload::ColorMap(gradient(40, 40))),
            ("grid", Payload::Grid(grid_4x3())),
        ])];
        let output = run(&details_in("Rect"), &previous);
        let image = only_image(&output);
        assert_eq!(image.dimensions(), (12, 12));
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(11, 11), &Rgba([11, 11, 0, 255]));
    }

    #[test]
    fn test_area_with_empty_shapes_fails_even_with_grid() {
        let previous = vec![step_with(vec![
            ("src", Payload::ColorMap(gradient(40, 40))),
            ("shapes", Payload::LineCollection(vec![])),
            ("grid", Payload::Grid(grid_4x3())),
        ])];
        let output = run(&details_in("Area"), &previous);
        assert_eq!(output.errors(), ["The clipping area is empty.".to_string()]);
        assert!(output.members().is_empty());
    }

    #[test]
    fn test_area_with_short_shape_forwards_error() {
        let previous = vec![step_with(vec![
            ("src", Payload::ColorMap(gradient(40, 40))),
            ("shapes", Payload::LineCollection(vec![vec![Point::new(1.0, 1.0)]])),
        ])];
        let output = run(&details_in("Area"), &previous);
        assert_eq!(output.errors().len(), 1);
        assert!(output.members().is_empty());
    }

    #[test]
    fn test_grid_mode_requires_cells() {
        let previous = vec![step_with(vec![
            ("src", Payload::ColorMap(gradient(40, 40))),
            ("grid", Payload::Grid(Grid::default())),
        ])];
        let output = run(&details_in("Grid"), &previous);
        assert_eq!(output.errors(), ["The clipping grid is empty.".to_string()]);

        let previous = vec![step_with(vec![("src", Payload::ColorMap(gradient(40, 40)))])];
        let output = run(&details_in("Grid"), &previous);
        assert_eq!(output.errors(), ["Failed to find clipping grid.".to_string()]);
        assert!(output.members().is_empty());
    }

    #[test]
    fn test_missing_source_reported_before_mode() {
        let output = run(&details_in("Area"), &[]);
        assert_eq!(output.errors(), ["Failed to find source image.".to_string()]);
        assert!(output.members().is_empty());
    }

    #[test]
    fn test_empty_source_produces_nothing() {
        let previous = vec![step_with(vec![("src", Payload::ColorMap(ColorMap::new(0, 0)))])];
        let output = run(&details_in("Rect"), &previous);
        assert!(output.is_empty());
    }

    #[test]
    fn test_details_constructor() {
        let details = ExtractRect::details("in", "out", OriginMode::CenterCrop, 32, 16).unwrap();
        assert_eq!(details.kind(), StepKind::ExtractRect);
        assert_eq!(details.lookup_output_name(OUTPUT_DATA), "out");
        assert_eq!(
            details.parameter_value(ORIGIN_MODE),
            Some(&ParamValue::from("CenterCrop"))
        );
        assert_eq!(
            details.parameter_value(DESTINATION_WIDTH),
            Some(&ParamValue::Size(32))
        );
    }
}
