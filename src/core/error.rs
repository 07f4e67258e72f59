//! Error types for pixelstep.
//!
//! Uses thiserror for structured errors with context. Two layers exist:
//! - Execution-time failures ([`StepError`]) are never propagated; a step
//!   renders them into its output sink and carries on
//! - Configuration-time failures ([`ParameterError`]) are collected into a
//!   [`ValidationReport`] before anything runs

use crate::core::types::{ParamType, ParamValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a step instance in a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(pub Uuid);

impl StepId {
    /// Create a new random step ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StepId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Top-level error type for pixelstep.
///
/// Only used at the edges: loading configuration, reading and writing images,
/// (de)serializing step details.
#[derive(Error, Debug)]
pub enum PixelstepError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Unknown step kind '{0}'")]
    UnknownStepKind(String),
}

/// Failures a step reports while executing.
///
/// Either a named input could not be found, or it was found but is
/// unusable. Anything reported by the transformation functions is
/// forwarded as [`StepError::Transform`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepError {
    #[error("Failed to find {what}.")]
    MissingInput { what: String },

    #[error("The {what} is empty.")]
    EmptyInput { what: String },

    #[error("No input data found.")]
    NoUpstream,

    #[error("{0}")]
    Transform(String),
}

impl StepError {
    pub fn missing(what: impl Into<String>) -> Self {
        StepError::MissingInput { what: what.into() }
    }

    pub fn empty(what: impl Into<String>) -> Self {
        StepError::EmptyInput { what: what.into() }
    }
}

/// Problems with a parameter value, found during validation.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterError {
    #[error("Parameter '{name}' is {value}, outside [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Parameter '{name}' is \"{value}\", expected one of {options:?}")]
    NotAnOption {
        name: String,
        value: String,
        options: Vec<String>,
    },

    #[error("Parameter '{name}' expects {expected}, got {got}")]
    TypeMismatch {
        name: String,
        expected: ParamType,
        got: ParamValue,
    },

    #[error("Parameter '{name}' has no value")]
    Unset { name: String },

    #[error("Step has no parameter '{name}'")]
    Unknown { name: String },
}

impl ParameterError {
    /// Name of the offending parameter.
    pub fn parameter(&self) -> &str {
        match self {
            ParameterError::OutOfRange { name, .. }
            | ParameterError::NotAnOption { name, .. }
            | ParameterError::TypeMismatch { name, .. }
            | ParameterError::Unset { name }
            | ParameterError::Unknown { name } => name,
        }
    }

    /// Get suggestion for fixing this error.
    pub fn suggested_fix(&self) -> Option<String> {
        match self {
            ParameterError::OutOfRange { name, min, max, .. } => {
                Some(format!("Set '{}' to a value between {} and {}", name, min, max))
            }
            ParameterError::NotAnOption { name, options, .. } => options
                .first()
                .map(|first| format!("Pick an option for '{}', for example \"{}\"", name, first)),
            _ => None,
        }
    }
}

/// Result type alias for pixelstep operations.
pub type PixelstepResult<T> = Result<T, PixelstepError>;

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;

// ============================================================================
// Validation Report
// ============================================================================

/// Result of validating a step's parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether validation passed without errors.
    pub success: bool,
    /// List of errors found.
    pub errors: Vec<ParameterError>,
}

impl ValidationReport {
    /// Create a new empty report (success).
    pub fn new() -> Self {
        Self {
            success: true,
            errors: Vec::new(),
        }
    }

    /// Add an error to the report.
    pub fn add_error(&mut self, error: ParameterError) {
        self.success = false;
        self.errors.push(error);
    }

    /// Check if the step can be executed.
    pub fn can_execute(&self) -> bool {
        self.success
    }

    /// Get a human-readable summary.
    pub fn summary(&self) -> String {
        if self.success {
            "✓ Parameters are valid".to_string()
        } else {
            format!("✗ Validation failed with {} error(s)", self.errors.len())
        }
    }

    /// Get detailed error messages with suggestions.
    pub fn detailed_errors(&self) -> Vec<String> {
        self.errors
            .iter()
            .enumerate()
            .map(|(i, error)| {
                let mut msg = format!("{}. {}", i + 1, error);
                if let Some(fix) = error.suggested_fix() {
                    msg.push_str(&format!("\n   → Suggestion: {}", fix));
                }
                msg
            })
            .collect()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
