//! Step kinds and the step contract.
//!
//! Every step kind implements two operations:
//! - `fixup_parameters` rebuilds the parameter schema from current values
//! - `execute` reads a parameter snapshot and earlier outputs, and fills an
//!   [`OutputSink`]
//!
//! The catalog of kinds is closed. [`StepKind`] dispatches to a stateless
//! delegate per kind, so a host only ever stores the enum.

use crate::core::context::{OutputSink, StepInput};
use crate::core::store::{ParameterBuilder, ParameterSnapshot};
use crate::steps::{DrawShapes, ExtractRect, NormalizeBrightness, Scale, ToFloat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category tag for organizing step kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Locating and cutting out regions
    FindAndSegment,
    /// Transformations that keep the payload kind
    Processing,
    /// Transformations into another payload kind
    Conversion,
    /// Rendering onto images
    Drawing,
}

impl Category {
    /// Get the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::FindAndSegment => "Find and segment",
            Category::Processing => "Processing",
            Category::Conversion => "Conversion",
            Category::Drawing => "Drawing",
        }
    }

    /// Get all categories in display order.
    pub fn all() -> &'static [Category] {
        &[
            Category::FindAndSegment,
            Category::Processing,
            Category::Conversion,
            Category::Drawing,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The behavior behind one step kind.
///
/// Implementations hold no state. Everything a step needs arrives through
/// its arguments.
pub trait StepDelegate: Send + Sync {
    /// Declare the parameters and output slots for the current values.
    ///
    /// Must be idempotent: feeding the result back in yields the same
    /// descriptors.
    fn fixup_parameters(&self, params: &mut ParameterBuilder<'_>);

    /// Run the step.
    ///
    /// Never fails. Problems are appended to `output` as errors, and no
    /// member is produced for the slot they affect.
    fn execute(&self, params: &ParameterSnapshot, input: &StepInput<'_>, output: &mut OutputSink);
}

/// Closed catalog of step kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    ExtractRect,
    Scale,
    ToFloat,
    DrawShapes,
    NormalizeBrightness,
}

impl StepKind {
    /// Get all step kinds.
    pub fn all() -> &'static [StepKind] {
        &[
            StepKind::ExtractRect,
            StepKind::Scale,
            StepKind::ToFloat,
            StepKind::DrawShapes,
            StepKind::NormalizeBrightness,
        ]
    }

    /// Stable identifier.
    pub fn id(&self) -> &'static str {
        match self {
            StepKind::ExtractRect => "extract_rect",
            StepKind::Scale => "scale",
            StepKind::ToFloat => "to_float",
            StepKind::DrawShapes => "draw_shapes",
            StepKind::NormalizeBrightness => "normalize_brightness",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            StepKind::ExtractRect => "Extract Rect",
            StepKind::Scale => "Scale",
            StepKind::ToFloat => "To Float",
            StepKind::DrawShapes => "Draw Shapes",
            StepKind::NormalizeBrightness => "Normalize Brightness",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StepKind::ExtractRect => {
                "Cut a rectangle, a quadrilateral area or a grid out of an image"
            }
            StepKind::Scale => "Resize a color image and/or a byte map",
            StepKind::ToFloat => "Convert a color image into a flat buffer of floats",
            StepKind::DrawShapes => "Draw line collections onto an image or a blank canvas",
            StepKind::NormalizeBrightness => "Adjust the brightness of a color image",
        }
    }

    /// Category tags.
    pub fn categories(&self) -> &'static [Category] {
        match self {
            StepKind::ExtractRect => &[Category::FindAndSegment],
            StepKind::Scale | StepKind::NormalizeBrightness => &[Category::Processing],
            StepKind::ToFloat => &[Category::Conversion],
            StepKind::DrawShapes => &[Category::Drawing],
        }
    }

    /// Searchable tags.
    pub fn tags(&self) -> &'static [&'static str] {
        match self {
            StepKind::ExtractRect => &["crop", "clip", "warp", "grid", "area"],
            StepKind::Scale => &["resize", "rescale", "size"],
            StepKind::ToFloat => &["float", "tensor", "channels"],
            StepKind::DrawShapes => &["draw", "polygon", "lines", "shapes"],
            StepKind::NormalizeBrightness => &["brightness", "luma", "levels"],
        }
    }

    /// The stateless implementation behind this kind.
    pub fn delegate(&self) -> &'static dyn StepDelegate {
        match self {
            StepKind::ExtractRect => &ExtractRect,
            StepKind::Scale => &Scale,
            StepKind::ToFloat => &ToFloat,
            StepKind::DrawShapes => &DrawShapes,
            StepKind::NormalizeBrightness => &NormalizeBrightness,
        }
    }

    pub fn fixup_parameters(&self, params: &mut ParameterBuilder<'_>) {
        self.delegate().fixup_parameters(params);
    }

    /// Run the step and collect what it produced.
    pub fn execute(&self, params: &ParameterSnapshot, input: &StepInput<'_>) -> OutputSink {
        let mut output = OutputSink::new();
        self.delegate().execute(params, input, &mut output);
        output
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StepKind {
    type Err = crate::core::error::PixelstepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepKind::all()
            .iter()
            .copied()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| crate::core::error::PixelstepError::UnknownStepKind(s.to_string()))
    }
}
