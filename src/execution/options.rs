//! Execution options.
//!
//! Options can be built in code or loaded from a TOML file:
//!
//! ```toml
//! validate_parameters = true
//! recompute_before_execute = true
//! log_timing = false
//! ```
//!
//! Missing keys take their default value.

use crate::core::error::PixelstepResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Execution options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionOptions {
    /// Validate each step before running it. Steps with invalid parameters
    /// report their violations as errors and are skipped.
    pub validate_parameters: bool,
    /// Recompute each step's parameters before running it.
    pub recompute_before_execute: bool,
    /// Log the duration of every step at info level.
    pub log_timing: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            validate_parameters: true,
            recompute_before_execute: true,
            log_timing: false,
        }
    }
}

impl ExecutionOptions {
    /// Create a new options builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable/disable parameter validation.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_parameters = validate;
        self
    }

    /// Enable/disable recomputing parameters before execution.
    pub fn with_recompute(mut self, recompute: bool) -> Self {
        self.recompute_before_execute = recompute;
        self
    }

    /// Enable/disable per-step timing logs.
    pub fn with_timing(mut self, log_timing: bool) -> Self {
        self.log_timing = log_timing;
        self
    }

    /// Parse options from TOML.
    pub fn from_toml_str(source: &str) -> PixelstepResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load options from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> PixelstepResult<Self> {
        let path = path.as_ref();
        log::debug!("Loading execution options from {}", path.display());
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PixelstepError;
    use std::io::Write;

    #[test]
    fn test_execution_options_builder() {
        let options = ExecutionOptions::new()
            .with_validation(false)
            .with_recompute(false)
            .with_timing(true);

        assert!(!options.validate_parameters);
        assert!(!options.recompute_before_execute);
        assert!(options.log_timing);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let options = ExecutionOptions::from_toml_str("log_timing = true").unwrap();
        assert_eq!(options, ExecutionOptions::new().with_timing(true));

        let empty = ExecutionOptions::from_toml_str("").unwrap();
        assert_eq!(empty, ExecutionOptions::default());
    }

    #[test]
    fn test_bad_toml() {
        let result = ExecutionOptions::from_toml_str("validate_parameters = \"yes\"");
        assert!(matches!(result, Err(PixelstepError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "validate_parameters = false").unwrap();
        writeln!(file, "recompute_before_execute = false").unwrap();

        let options = ExecutionOptions::from_file(file.path()).unwrap();
        assert!(!options.validate_parameters);
        assert!(!options.recompute_before_execute);
        assert!(!options.log_timing);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ExecutionOptions::from_file(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(PixelstepError::Io(_))));
    }
}
