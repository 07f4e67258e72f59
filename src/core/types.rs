//! Core value types that flow between pipeline steps.
//!
//! The type system uses closed enums on both sides of a step:
//! - Parameter values are a small set of scalar kinds (sizes, floats, strings)
//! - Output members carry one of a fixed set of payload kinds, each tagged
//!   with an explicit [`MemberKind`] so consumers dispatch on the tag rather
//!   than probing the payload
//! - Serialization: serde handles enums natively

use image::{GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An RGBA8 color image.
pub type ColorMap = RgbaImage;

/// A single channel 8-bit image.
pub type ByteMap = GrayImage;

/// A closed polyline. The last point connects back to the first.
pub type Line = Vec<Point>;

/// A 2D point, also used as a vector for grid axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length when the point is read as a vector.
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Component-wise sum.
    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    /// Multiply both components by `factor`.
    pub fn scale(self, factor: f32) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    /// As a tuple, the form `imageproc` expects.
    pub fn to_tuple(self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// A regular grid laid over an image.
///
/// `x_axis` and `y_axis` are the vectors spanning a single cell, so the
/// whole grid spans `x_axis * x_cells` by `y_axis * y_cells` from `origin`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub origin: Point,
    pub x_axis: Point,
    pub y_axis: Point,
    pub x_cells: usize,
    pub y_cells: usize,
}

impl Grid {
    /// A grid has no area when either axis has no cells.
    pub fn is_empty(&self) -> bool {
        self.x_cells == 0 || self.y_cells == 0
    }

    /// The four outer corners, clockwise from the origin.
    pub fn corners(&self) -> [Point; 4] {
        let across = self.x_axis.scale(self.x_cells as f32);
        let down = self.y_axis.scale(self.y_cells as f32);
        [
            self.origin,
            self.origin.add(across),
            self.origin.add(across).add(down),
            self.origin.add(down),
        ]
    }
}

/// A flat buffer of floats produced from an image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Floats {
    pub width: u32,
    pub height: u32,
    /// Number of channels per pixel in `data`.
    pub channels: usize,
    pub data: Vec<f32>,
}

// ============================================================================
// Members
// ============================================================================

/// Discriminator for the payload carried by a [`Member`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    ColorMap,
    ByteMap,
    Floats,
    LineCollection,
    Grid,
}

impl MemberKind {
    /// Human readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            MemberKind::ColorMap => "Color map",
            MemberKind::ByteMap => "Byte map",
            MemberKind::Floats => "Floats",
            MemberKind::LineCollection => "Line collection",
            MemberKind::Grid => "Grid",
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Data carried by an output member.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    ColorMap(ColorMap),
    ByteMap(ByteMap),
    Floats(Floats),
    LineCollection(Vec<Line>),
    Grid(Grid),
}

impl Payload {
    /// The discriminator for this payload.
    pub fn kind(&self) -> MemberKind {
        match self {
            Payload::ColorMap(_) => MemberKind::ColorMap,
            Payload::ByteMap(_) => MemberKind::ByteMap,
            Payload::Floats(_) => MemberKind::Floats,
            Payload::LineCollection(_) => MemberKind::LineCollection,
            Payload::Grid(_) => MemberKind::Grid,
        }
    }
}

/// One named, typed value published by a step.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// The published name, already resolved through the step's output mapping.
    pub name: String,
    kind: MemberKind,
    payload: Payload,
}

impl Member {
    /// Create a member, tagging it with the payload's kind.
    pub fn new(name: impl Into<String>, payload: Payload) -> Self {
        Self {
            name: name.into(),
            kind: payload.kind(),
            payload,
        }
    }

    /// Kind tag assigned at creation.
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn as_color_map(&self) -> Option<&ColorMap> {
        match &self.payload {
            Payload::ColorMap(image) => Some(image),
            _ => None,
        }
    }

    pub fn as_byte_map(&self) -> Option<&ByteMap> {
        match &self.payload {
            Payload::ByteMap(image) => Some(image),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&Floats> {
        match &self.payload {
            Payload::Floats(floats) => Some(floats),
            _ => None,
        }
    }

    pub fn as_line_collection(&self) -> Option<&[Line]> {
        match &self.payload {
            Payload::LineCollection(lines) => Some(lines),
            _ => None,
        }
    }

    pub fn as_grid(&self) -> Option<&Grid> {
        match &self.payload {
            Payload::Grid(grid) => Some(grid),
            _ => None,
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::ColorMap(image) => {
                write!(f, "{} [Color map {}x{}]", self.name, image.width(), image.height())
            }
            Payload::ByteMap(image) => {
                write!(f, "{} [Byte map {}x{}]", self.name, image.width(), image.height())
            }
            Payload::Floats(floats) => write!(
                f,
                "{} [Floats {}x{}x{}]",
                self.name, floats.width, floats.height, floats.channels
            ),
            Payload::LineCollection(lines) => {
                write!(f, "{} [Line collection, {} lines]", self.name, lines.len())
            }
            Payload::Grid(grid) => {
                write!(f, "{} [Grid {}x{}]", self.name, grid.x_cells, grid.y_cells)
            }
        }
    }
}

// ============================================================================
// Parameter values
// ============================================================================

/// The value held by a parameter descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ParamValue {
    /// Non-negative integer (sizes, coordinates, color components)
    Size(usize),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string (free text, enum options and named references)
    String(String),
}

/// Type tag of a parameter descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Size,
    Float,
    String,
    /// One of a declared set of string options
    Enum,
    /// Name of a member published by an earlier step
    NamedData,
    /// Name of a grid published by an earlier step
    NamedGrid,
}

impl ParamValue {
    pub fn as_size(&self) -> Option<usize> {
        if let ParamValue::Size(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    /// Sizes are converted to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Size(v) => Some(*v as f64),
            ParamValue::String(_) => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        if let ParamValue::String(s) = self {
            Some(s)
        } else {
            None
        }
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        ParamValue::Size(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Size(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{:.4}", v),
            ParamValue::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl ParamType {
    /// Check if a value can be stored in a descriptor of this type.
    pub fn matches(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (ParamType::Size, ParamValue::Size(_)) => true,
            // Sizes widen to floats
            (ParamType::Float, ParamValue::Float(_) | ParamValue::Size(_)) => true,
            (
                ParamType::String | ParamType::Enum | ParamType::NamedData | ParamType::NamedGrid,
                ParamValue::String(_),
            ) => true,
            _ => false,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ParamType::Size => "Size",
            ParamType::Float => "Float",
            ParamType::String => "String",
            ParamType::Enum => "Enum",
            ParamType::NamedData => "Named data",
            ParamType::NamedGrid => "Named grid",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_type_matching() {
        assert!(ParamType::Size.matches(&ParamValue::Size(3)));
        assert!(ParamType::Float.matches(&ParamValue::Size(3)));
        assert!(!ParamType::Size.matches(&ParamValue::Float(3.0)));
        assert!(ParamType::Enum.matches(&ParamValue::from("Rect")));
        assert!(ParamType::NamedGrid.matches(&ParamValue::from("grid")));
        assert!(!ParamType::NamedData.matches(&ParamValue::Size(0)));
    }

    #[test]
    fn test_member_kind_is_tagged_at_creation() {
        let member = Member::new("lines", Payload::LineCollection(vec![]));
        assert_eq!(member.kind(), MemberKind::LineCollection);
        assert!(member.as_line_collection().is_some());
        assert!(member.as_color_map().is_none());
    }

    #[test]
    fn test_grid_corners() {
        let grid = Grid {
            origin: Point::new(1.0, 1.0),
            x_axis: Point::new(2.0, 0.0),
            y_axis: Point::new(0.0, 3.0),
            x_cells: 2,
            y_cells: 1,
        };
        let corners = grid.corners();
        assert_eq!(corners[1], Point::new(5.0, 1.0));
        assert_eq!(corners[2], Point::new(5.0, 4.0));
        assert_eq!(corners[3], Point::new(1.0, 4.0));
        assert!(!grid.is_empty());
        assert!(Grid::default().is_empty());
    }

    #[test]
    fn test_member_display() {
        let member = Member::new("img", Payload::ColorMap(ColorMap::new(4, 2)));
        assert_eq!(member.to_string(), "img [Color map 4x2]");
    }
}
