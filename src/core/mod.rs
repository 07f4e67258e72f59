//! Core types and traits for the pixelstep step model.
//!
//! This module contains the foundational pieces every step kind builds on:
//! - Value types (members, payloads, parameter values)
//! - Parameter descriptors and the per-step store
//! - The step contract and the closed catalog of step kinds
//! - Error types
//! - Step inputs and output sinks

pub mod types;
pub mod parameter;
pub mod error;
pub mod context;
pub mod step;
pub mod store;

// Re-export commonly used types
pub use types::{ByteMap, ColorMap, Floats, Grid, Line, Member, MemberKind, ParamType, ParamValue, Payload, Point};
pub use parameter::ParameterDescriptor;
pub use error::{ParameterError, PixelstepError, StepError, StepId, ValidationReport};
pub use context::{OutputSink, StepInput};
pub use step::{Category, StepDelegate, StepKind};
pub use store::{ParameterBuilder, ParameterSnapshot, StepDetails};
