//! Parameter descriptors.
//!
//! A descriptor is one configurable value of a step: its type, bounds or
//! option set, whether it is currently enabled, and the value itself.
//! Descriptors are rebuilt by every recompute pass, so everything a reader
//! needs (bounds, options, enabled state) is stored on the descriptor.

use crate::core::error::{ParameterError, ParameterResult};
use crate::core::types::{ParamType, ParamValue};
use serde::{Deserialize, Serialize};

/// Definition and current value of a step parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Stable identifier within the step
    pub name: String,
    /// Human-readable name
    pub display_name: String,
    /// Description for documentation and tooltips
    pub description: String,
    /// Type tag
    pub param_type: ParamType,
    /// Inclusive lower bound for numeric parameters
    pub min: Option<f64>,
    /// Inclusive upper bound for numeric parameters
    pub max: Option<f64>,
    /// Allowed options for enum parameters, in presentation order
    pub enum_values: Vec<String>,
    /// Value substituted when the current one is unset or unusable
    pub default_value: Option<ParamValue>,
    /// Whether the parameter takes part in validation and presentation
    pub enabled: bool,
    /// Current value
    pub value: Option<ParamValue>,
}

impl ParameterDescriptor {
    /// Create a new, enabled descriptor with no value.
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        let name = name.into();
        Self {
            display_name: Self::name_to_display(&name),
            name,
            description: String::new(),
            param_type,
            min: None,
            max: None,
            enum_values: Vec::new(),
            default_value: None,
            enabled: true,
            value: None,
        }
    }

    /// A non-negative integer parameter.
    pub fn size(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Size)
    }

    /// A reference to a member published by an earlier step.
    pub fn named_data(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::NamedData)
    }

    /// A reference to a grid published by an earlier step.
    pub fn named_grid(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::NamedGrid)
    }

    /// An enum parameter restricted to `options`.
    pub fn enumeration(name: impl Into<String>, options: &[&str]) -> Self {
        let mut descriptor = Self::new(name, ParamType::Enum);
        descriptor.enum_values = options.iter().map(|o| o.to_string()).collect();
        descriptor
    }

    /// Set the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set inclusive numeric bounds.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Validate bounds against this default: unset or mistyped values are
    /// replaced by it and numeric values are clamped into range.
    pub fn with_default(mut self, value: impl Into<ParamValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Set the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Convert snake_case name to Title Case display name.
    fn name_to_display(name: &str) -> String {
        name.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Bring the value in line with the descriptor's type, bounds and options.
    ///
    /// Applying this twice is the same as applying it once.
    pub fn normalize(&mut self) {
        if self.param_type == ParamType::Enum {
            let recognized = self
                .value
                .as_ref()
                .and_then(ParamValue::as_string)
                .is_some_and(|v| self.enum_values.iter().any(|o| o == v));
            if !recognized {
                self.value = self.enum_values.first().cloned().map(ParamValue::String);
            }
            return;
        }

        let Some(default) = self.default_value.clone() else {
            return;
        };

        let usable = self
            .value
            .as_ref()
            .is_some_and(|v| self.param_type.matches(v));
        if !usable {
            self.value = Some(default);
        }

        if let Some(value) = self.value.as_mut() {
            match value {
                ParamValue::Size(v) => {
                    if let Some(min) = self.min {
                        *v = (*v).max(min.max(0.0) as usize);
                    }
                    if let Some(max) = self.max {
                        *v = (*v).min(max.max(0.0) as usize);
                    }
                }
                ParamValue::Float(v) => {
                    if let Some(min) = self.min {
                        *v = v.max(min);
                    }
                    if let Some(max) = self.max {
                        *v = v.min(max);
                    }
                }
                ParamValue::String(_) => {}
            }
        }
    }

    /// Check the current value against type, bounds and options.
    ///
    /// An unset value is acceptable for everything except enums; steps read
    /// unset sizes as zero and unset names as empty.
    pub fn validate(&self) -> ParameterResult<()> {
        let Some(value) = &self.value else {
            if self.param_type == ParamType::Enum {
                return Err(ParameterError::Unset {
                    name: self.name.clone(),
                });
            }
            return Ok(());
        };

        if !self.param_type.matches(value) {
            return Err(ParameterError::TypeMismatch {
                name: self.name.clone(),
                expected: self.param_type,
                got: value.clone(),
            });
        }

        if self.param_type == ParamType::Enum {
            let chosen = value.as_string().unwrap_or_default();
            if !self.enum_values.iter().any(|o| o == chosen) {
                return Err(ParameterError::NotAnOption {
                    name: self.name.clone(),
                    value: chosen.to_string(),
                    options: self.enum_values.clone(),
                });
            }
        }

        if let Some(number) = value.as_float() {
            let min = self.min.unwrap_or(f64::NEG_INFINITY);
            let max = self.max.unwrap_or(f64::INFINITY);
            if number < min || number > max {
                return Err(ParameterError::OutOfRange {
                    name: self.name.clone(),
                    value: number,
                    min,
                    max,
                });
            }
        }

        Ok(())
    }

    /// Take the value of a descriptor from an earlier recompute pass when it
    /// has the same type.
    pub fn carry_over(&mut self, previous: &ParameterDescriptor) -> bool {
        if previous.param_type != self.param_type {
            return false;
        }
        self.value = previous.value.clone();
        true
    }
}
