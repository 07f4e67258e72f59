//! Per-step parameter storage.
//!
//! [`StepDetails`] owns the descriptors of one configured step. The two
//! phases of a step never share it mutably:
//! - recompute runs through a [`ParameterBuilder`] that reads the previous
//!   descriptors and produces a fresh set
//! - execute receives a [`ParameterSnapshot`], an owned copy of the values

use crate::core::error::{ParameterError, ParameterResult, PixelstepResult, ValidationReport};
use crate::core::parameter::ParameterDescriptor;
use crate::core::step::StepKind;
use crate::core::types::ParamValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration of one step in a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDetails {
    kind: StepKind,
    /// Descriptors in canonical presentation and processing order
    parameters: IndexMap<String, ParameterDescriptor>,
    /// Names that take part in validation and presentation
    valid_parameters: Vec<String>,
    /// Output slots the step kind declares
    output_names: Vec<String>,
    /// Slot name to published name
    output_mapping: IndexMap<String, String>,
}

impl StepDetails {
    /// Create the details for a step of `kind` with its default parameters.
    pub fn new(kind: StepKind) -> Self {
        let mut details = Self {
            kind,
            parameters: IndexMap::new(),
            valid_parameters: Vec::new(),
            output_names: Vec::new(),
            output_mapping: IndexMap::new(),
        };
        details.recompute();
        details
    }

    pub fn kind(&self) -> StepKind {
        self.kind
    }

    /// Switch to another step kind.
    ///
    /// Values of parameters whose name and type exist in both kinds survive;
    /// everything else is dropped.
    pub fn set_kind(&mut self, kind: StepKind) {
        self.kind = kind;
        self.recompute();
    }

    /// Rebuild every descriptor from the current values.
    ///
    /// Call after any value change. Running it again without changing a value
    /// produces the same descriptors.
    pub fn recompute(&mut self) {
        let mut builder = ParameterBuilder::new(&self.parameters);
        self.kind.fixup_parameters(&mut builder);
        let fixed = builder.finish();

        log::debug!(
            "Recomputed {} parameters for step '{}'",
            fixed.parameters.len(),
            self.kind.id()
        );

        self.parameters = fixed.parameters;
        self.valid_parameters = fixed.valid_parameters;
        self.output_names = fixed.output_names;
    }

    /// Find a descriptor by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.get(name)
    }

    /// All descriptors in canonical order.
    pub fn parameters(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters.values()
    }

    /// Names of all descriptors in canonical order.
    pub fn parameters_order(&self) -> Vec<&str> {
        self.parameters.keys().map(|k| k.as_str()).collect()
    }

    /// Names that take part in validation and presentation.
    pub fn valid_parameters(&self) -> &[String] {
        &self.valid_parameters
    }

    /// Valid descriptors that are currently enabled, in canonical order.
    pub fn visible_parameters(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.valid_parameters
            .iter()
            .filter_map(|name| self.parameters.get(name))
            .filter(|p| p.enabled)
    }

    /// Current value of a parameter.
    pub fn parameter_value(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name).and_then(|p| p.value.as_ref())
    }

    /// Set the value of an existing parameter.
    ///
    /// The value must fit the descriptor's type; bounds are checked later by
    /// [`recompute`](Self::recompute) and [`validate`](Self::validate).
    pub fn set_parameter_value(
        &mut self,
        name: &str,
        value: impl Into<ParamValue>,
    ) -> ParameterResult<()> {
        let descriptor = self
            .parameters
            .get_mut(name)
            .ok_or_else(|| ParameterError::Unknown {
                name: name.to_string(),
            })?;

        let value = value.into();
        if !descriptor.param_type.matches(&value) {
            return Err(ParameterError::TypeMismatch {
                name: name.to_string(),
                expected: descriptor.param_type,
                got: value,
            });
        }

        descriptor.value = Some(value);
        Ok(())
    }

    /// Output slots declared by the step kind, in declaration order.
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// Publish the member written to `slot` under `name`.
    pub fn set_output_name(&mut self, slot: impl Into<String>, name: impl Into<String>) {
        self.output_mapping.insert(slot.into(), name.into());
    }

    /// Replace the whole slot mapping.
    pub fn set_output_mapping<S, N>(&mut self, mapping: impl IntoIterator<Item = (S, N)>)
    where
        S: Into<String>,
        N: Into<String>,
    {
        self.output_mapping = mapping
            .into_iter()
            .map(|(slot, name)| (slot.into(), name.into()))
            .collect();
    }

    /// Name a member written to `slot` is published under.
    pub fn lookup_output_name(&self, slot: &str) -> String {
        lookup(&self.output_mapping, slot)
    }

    /// Check every valid, enabled parameter against its bounds and options.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        for descriptor in self.visible_parameters() {
            if let Err(error) = descriptor.validate() {
                report.add_error(error);
            }
        }
        report
    }

    /// Take an immutable copy of the values for execution.
    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            values: self
                .parameters
                .iter()
                .filter_map(|(name, p)| p.value.clone().map(|v| (name.clone(), v)))
                .collect(),
            output_mapping: self.output_mapping.clone(),
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> PixelstepResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON string.
    ///
    /// Descriptors are recomputed after loading so stale bounds or options in
    /// the document cannot survive.
    pub fn from_json(json: &str) -> PixelstepResult<Self> {
        let mut details: StepDetails = serde_json::from_str(json)?;
        details.recompute();
        Ok(details)
    }
}

fn lookup(mapping: &IndexMap<String, String>, slot: &str) -> String {
    mapping
        .get(slot)
        .cloned()
        .unwrap_or_else(|| slot.to_string())
}

// ============================================================================
// Recompute phase
// ============================================================================

/// Descriptors produced by one recompute pass.
#[derive(Debug, Clone, Default)]
pub struct FixedParameters {
    pub parameters: IndexMap<String, ParameterDescriptor>,
    pub valid_parameters: Vec<String>,
    pub output_names: Vec<String>,
}

/// Mutable builder handed to a step kind while it declares its parameters.
///
/// Descriptors must be added in dependency order: when one parameter's
/// enabled state or bounds depend on another, add the other one first and
/// read its normalized value back through [`string`](Self::string) or
/// [`size`](Self::size).
pub struct ParameterBuilder<'a> {
    previous: &'a IndexMap<String, ParameterDescriptor>,
    fixed: FixedParameters,
}

impl<'a> ParameterBuilder<'a> {
    /// Start a pass over the descriptors of the previous pass.
    pub fn new(previous: &'a IndexMap<String, ParameterDescriptor>) -> Self {
        Self {
            previous,
            fixed: FixedParameters::default(),
        }
    }

    /// Declare the step's output slots.
    pub fn set_output_names(&mut self, names: &[&str]) {
        self.fixed.output_names = names.iter().map(|n| n.to_string()).collect();
    }

    /// Declare a parameter.
    ///
    /// The value is carried over from the previous pass when a descriptor
    /// with the same name and type existed, then normalized.
    pub fn add(&mut self, mut descriptor: ParameterDescriptor) {
        if let Some(previous) = self.previous.get(&descriptor.name) {
            descriptor.carry_over(previous);
        }
        descriptor.normalize();

        let name = descriptor.name.clone();
        if !self.fixed.valid_parameters.contains(&name) {
            self.fixed.valid_parameters.push(name.clone());
        }
        self.fixed.parameters.insert(name, descriptor);
    }

    /// Normalized value of a parameter declared earlier in this pass.
    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.fixed
            .parameters
            .get(name)
            .and_then(|p| p.value.as_ref())
    }

    /// String value of an earlier parameter, empty when unset.
    pub fn string(&self, name: &str) -> &str {
        self.value(name)
            .and_then(ParamValue::as_string)
            .unwrap_or_default()
    }

    /// Size value of an earlier parameter, zero when unset.
    pub fn size(&self, name: &str) -> usize {
        self.value(name).and_then(ParamValue::as_size).unwrap_or(0)
    }

    /// Finish the pass.
    pub fn finish(self) -> FixedParameters {
        self.fixed
    }
}

// ============================================================================
// Execute phase
// ============================================================================

/// Owned copy of a step's parameter values and output mapping.
///
/// Accessors never fail: unset sizes read as zero and unset strings as
/// empty, which steps interpret as "not configured".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSnapshot {
    values: HashMap<String, ParamValue>,
    output_mapping: IndexMap<String, String>,
}

impl ParameterSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value.
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Map an output slot to a published name.
    pub fn with_output_name(mut self, slot: impl Into<String>, name: impl Into<String>) -> Self {
        self.output_mapping.insert(slot.into(), name.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn size(&self, name: &str) -> usize {
        self.get(name).and_then(ParamValue::as_size).unwrap_or(0)
    }

    pub fn string(&self, name: &str) -> &str {
        self.get(name)
            .and_then(ParamValue::as_string)
            .unwrap_or_default()
    }

    /// Name a member written to `slot` is published under.
    pub fn lookup_output_name(&self, slot: &str) -> String {
        lookup(&self.output_mapping, slot)
    }
}
