//! # Pixelstep - Parameterized Image Processing Steps
//!
//! Pixelstep models image processing as a list of configured steps. Each step
//! has a kind, a set of typed parameters and a mapping from its output slots
//! to the member names it publishes. Steps read their inputs by name from the
//! outputs of earlier steps.
//!
//! ## Features
//!
//! - **Dynamic parameter schemas**: a step's parameters depend on its kind and
//!   on the values of its other parameters, and are rebuilt on demand
//! - **Carry-over**: values the user set survive every schema rebuild that
//!   keeps the parameter
//! - **Closed step catalog**: rectangle extraction, scaling, float tensor
//!   conversion, shape drawing and brightness normalization
//! - **Partial failure**: a failing step reports errors in its own output and
//!   never stops the pipeline
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pixelstep::prelude::*;
//! use pixelstep::steps;
//!
//! let mut seed = OutputSink::new();
//! seed.publish("input", Payload::ColorMap(image::open("in.png")?.to_rgba8()));
//!
//! let mut scale = Scale::details(800, 0)?;
//! scale.set_parameter_value(names::COLOR_IMAGE, "input")?;
//! scale.set_output_name(steps::scale::OUTPUT_COLOR_IMAGE, "small");
//!
//! let crop = ExtractRect::details("small", "crop", OriginMode::Centered, 256, 256)?;
//!
//! let pipeline = Pipeline::new().with_step(scale).with_step(crop);
//! let result = ExecutionEngine::new().execute(&pipeline, seed);
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: value types, parameter descriptors, the step store and errors
//! - [`functions`]: the image operations behind the step kinds
//! - [`steps`]: one delegate per step kind
//! - [`execution`]: the sequential pipeline engine and its options
//! - [`registry`]: lookup and grouping of step kinds

#![warn(clippy::all)]

pub mod core;
pub mod execution;
pub mod functions;
pub mod registry;
pub mod steps;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use pixelstep::prelude::*;
/// ```
pub mod prelude {
    // Value types
    pub use crate::core::types::{
        ByteMap, ColorMap, Floats, Grid, Line, Member, MemberKind, ParamType, ParamValue, Payload,
        Point,
    };

    // Parameters and the step store
    pub use crate::core::parameter::ParameterDescriptor;
    pub use crate::core::store::{ParameterBuilder, ParameterSnapshot, StepDetails};

    // Step contract
    pub use crate::core::context::{OutputSink, StepInput};
    pub use crate::core::step::{Category, StepDelegate, StepKind};

    // Errors
    pub use crate::core::error::{
        ParameterError, PixelstepError, PixelstepResult, StepError, StepId, ValidationReport,
    };

    // Step kinds
    pub use crate::steps::{
        names, AreaMode, CanvasMode, DrawShapes, ExtractRect, NormalizeBrightness, OriginMode,
        Scale, ToFloat,
    };

    // Execution
    pub use crate::execution::{
        ExecutionEngine, ExecutionOptions, ExecutionResult, ExecutionStats, Pipeline,
        PipelineStep,
    };

    // Registry
    pub use crate::registry::{RegistryEntry, StepRegistry};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
