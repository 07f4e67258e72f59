//! Execution engine module.
//!
//! This module runs pipelines of configured steps.

pub mod engine;
pub mod options;

pub use engine::{ExecutionEngine, ExecutionResult, ExecutionStats, Pipeline, PipelineStep};
pub use options::ExecutionOptions;
