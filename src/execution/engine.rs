//! Execution engine implementation.
//!
//! The engine runs the steps of a pipeline strictly in order. Every step
//! sees the outputs of all steps before it, oldest first. A failing step
//! never stops the pipeline; its errors end up in its own output sink.

use crate::core::context::{OutputSink, StepInput};
use crate::core::error::StepId;
use crate::core::store::StepDetails;
use crate::execution::options::ExecutionOptions;
use std::borrow::Cow;
use std::time::{Duration, Instant};

/// One configured step in a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStep {
    pub id: StepId,
    pub details: StepDetails,
}

/// An ordered list of configured steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    steps: Vec<PipelineStep>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step and return its ID.
    pub fn add_step(&mut self, details: StepDetails) -> StepId {
        let id = StepId::new();
        self.steps.push(PipelineStep { id, details });
        id
    }

    /// Append a step, builder style.
    pub fn with_step(mut self, details: StepDetails) -> Self {
        self.add_step(details);
        self
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn step(&self, id: StepId) -> Option<&PipelineStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn step_mut(&mut self, id: StepId) -> Option<&mut PipelineStep> {
        self.steps.iter_mut().find(|s| s.id == id)
    }

    /// Remove a step, returning its details.
    pub fn remove_step(&mut self, id: StepId) -> Option<StepDetails> {
        let index = self.steps.iter().position(|s| s.id == id)?;
        Some(self.steps.remove(index).details)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Result of executing a pipeline.
#[derive(Debug)]
pub struct ExecutionResult {
    /// Output of every step, in pipeline order.
    pub outputs: Vec<(StepId, OutputSink)>,
    /// Execution statistics.
    pub stats: ExecutionStats,
}

impl ExecutionResult {
    /// Output of a single step.
    pub fn output(&self, id: StepId) -> Option<&OutputSink> {
        self.outputs
            .iter()
            .find(|(step_id, _)| *step_id == id)
            .map(|(_, sink)| sink)
    }

    /// Output of the last step.
    pub fn last_output(&self) -> Option<&OutputSink> {
        self.outputs.last().map(|(_, sink)| sink)
    }

    /// Every error reported, tagged with the step that reported it.
    pub fn errors(&self) -> impl Iterator<Item = (StepId, &str)> {
        self.outputs
            .iter()
            .flat_map(|(id, sink)| sink.errors().iter().map(move |e| (*id, e.as_str())))
    }

    pub fn has_errors(&self) -> bool {
        self.stats.errors > 0
    }
}

/// Execution statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionStats {
    /// Number of steps that ran.
    pub steps_executed: usize,
    /// Number of steps skipped because their parameters are invalid.
    pub steps_skipped: usize,
    /// Number of error messages across all steps.
    pub errors: usize,
    /// Total execution time.
    pub duration: Duration,
}

/// The execution engine.
#[derive(Debug, Clone, Default)]
pub struct ExecutionEngine {
    /// Default execution options.
    default_options: ExecutionOptions,
}

impl ExecutionEngine {
    /// Create a new execution engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set default options.
    pub fn with_default_options(mut self, options: ExecutionOptions) -> Self {
        self.default_options = options;
        self
    }

    pub fn default_options(&self) -> &ExecutionOptions {
        &self.default_options
    }

    /// Execute a pipeline with the default options.
    ///
    /// Members of `seed`, such as loaded images, are visible to the first
    /// step as the output of a previous step. An empty seed is not.
    pub fn execute(&self, pipeline: &Pipeline, seed: OutputSink) -> ExecutionResult {
        self.execute_with_options(pipeline, seed, None)
    }

    /// Execute a pipeline.
    pub fn execute_with_options(
        &self,
        pipeline: &Pipeline,
        seed: OutputSink,
        options: Option<ExecutionOptions>,
    ) -> ExecutionResult {
        let options = options.unwrap_or_else(|| self.default_options.clone());
        let start_time = Instant::now();
        log::info!("Executing pipeline with {} steps", pipeline.len());

        let seeded = !seed.is_empty();
        let mut history: Vec<OutputSink> = Vec::with_capacity(pipeline.len() + 1);
        if seeded {
            history.push(seed);
        }

        let mut stats = ExecutionStats::default();

        for step in pipeline.steps() {
            let details = if options.recompute_before_execute {
                let mut details = step.details.clone();
                details.recompute();
                Cow::Owned(details)
            } else {
                Cow::Borrowed(&step.details)
            };

            let output = if options.validate_parameters {
                let report = details.validate();
                if report.can_execute() {
                    None
                } else {
                    log::warn!(
                        "Skipping step {} ({}): {}",
                        step.id,
                        details.kind(),
                        report.summary()
                    );
                    let mut output = OutputSink::new();
                    for error in &report.errors {
                        output.add_error(error);
                    }
                    stats.steps_skipped += 1;
                    Some(output)
                }
            } else {
                None
            };

            let output = output.unwrap_or_else(|| {
                let step_start = Instant::now();
                let output = details
                    .kind()
                    .execute(&details.snapshot(), &StepInput::new(&history));
                let elapsed = step_start.elapsed();

                if options.log_timing {
                    log::info!("Step {} ({}) took {:?}", step.id, details.kind(), elapsed);
                } else {
                    log::debug!("Step {} ({}) took {:?}", step.id, details.kind(), elapsed);
                }
                stats.steps_executed += 1;
                output
            });

            stats.errors += output.errors().len();
            history.push(output);
        }

        if seeded {
            history.remove(0);
        }
        let outputs = pipeline
            .steps()
            .iter()
            .map(|s| s.id)
            .zip(history)
            .collect();

        stats.duration = start_time.elapsed();
        log::info!(
            "Pipeline finished in {:?}: {} executed, {} skipped, {} errors",
            stats.duration,
            stats.steps_executed,
            stats.steps_skipped,
            stats.errors
        );

        ExecutionResult { outputs, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::step::StepKind;
    use crate::core::types::{ColorMap, MemberKind, Payload};
    use crate::steps::{ExtractRect, OriginMode, Scale};

    fn seed() -> OutputSink {
        let mut sink = OutputSink::new();
        sink.publish("input", Payload::ColorMap(ColorMap::new(200, 100)));
        sink
    }

    #[test]
    fn test_execute_empty_pipeline() {
        let engine = ExecutionEngine::new();
        let result = engine.execute(&Pipeline::new(), seed());
        assert!(result.outputs.is_empty());
        assert_eq!(result.stats.steps_executed, 0);
    }

    #[test]
    fn test_steps_see_earlier_outputs() {
        let mut scale = Scale::details(100, 0).unwrap();
        scale.set_parameter_value("color_image", "input").unwrap();
        scale.set_output_name(crate::steps::scale::OUTPUT_COLOR_IMAGE, "small");

        let crop = ExtractRect::details("small", "crop", OriginMode::Centered, 50, 50).unwrap();

        let pipeline = Pipeline::new()
            .with_step(scale)
            .with_step(StepDetails::new(StepKind::ToFloat))
            .with_step(crop);

        let result = ExecutionEngine::new().execute(&pipeline, seed());
        assert!(!result.has_errors(), "{:?}", result.errors().collect::<Vec<_>>());
        assert_eq!(result.stats.steps_executed, 3);
        assert_eq!(result.outputs.len(), 3);

        // to_float falls back to the scaled image
        let floats = &result.outputs[1].1.members()[0];
        assert_eq!(floats.kind(), MemberKind::Floats);
        assert_eq!(floats.as_floats().unwrap().width, 100);

        let crop = &result.last_output().unwrap().members()[0];
        assert_eq!(crop.name, "crop");
        assert_eq!(crop.as_color_map().unwrap().dimensions(), (50, 50));
    }

    #[test]
    fn test_failures_do_not_stop_the_pipeline() {
        let broken = ExtractRect::details("nowhere", "crop", OriginMode::XY, 0, 0).unwrap();
        let mut scale = Scale::details(20, 10).unwrap();
        scale.set_parameter_value("color_image", "input").unwrap();

        let mut pipeline = Pipeline::new();
        let broken_id = pipeline.add_step(broken);
        let scale_id = pipeline.add_step(scale);

        let result = ExecutionEngine::new().execute(&pipeline, seed());
        assert_eq!(result.stats.steps_executed, 2);
        assert_eq!(result.stats.errors, 1);
        assert_eq!(
            result.output(broken_id).unwrap().errors(),
            ["Failed to find source image.".to_string()]
        );
        assert_eq!(result.output(scale_id).unwrap().members().len(), 1);
        assert_eq!(result.errors().next().map(|(id, _)| id), Some(broken_id));
    }

    #[test]
    fn test_invalid_steps_are_skipped() {
        let mut scale = Scale::details(0, 1).unwrap();
        scale.set_parameter_value("color_image", "input").unwrap();
        scale.set_parameter_value("destination_width", 20_000usize).unwrap();
        let pipeline = Pipeline::new().with_step(scale);

        let result = ExecutionEngine::new().execute(&pipeline, seed());
        assert_eq!(result.stats.steps_skipped, 1);
        assert_eq!(result.stats.steps_executed, 0);
        let output = result.last_output().unwrap();
        assert!(output.members().is_empty());
        assert_eq!(output.errors().len(), 1);

        let options = ExecutionOptions::new().with_validation(false);
        let result = ExecutionEngine::new().execute_with_options(&pipeline, seed(), Some(options));
        assert_eq!(result.stats.steps_executed, 1);
        assert!(!result.has_errors());
    }

    #[test]
    fn test_recompute_before_execute() {
        let mut crop = StepDetails::new(StepKind::ExtractRect);
        crop.set_parameter_value("color_image", "input").unwrap();
        crop.set_parameter_value("destination_width", 20_000usize).unwrap();
        crop.set_parameter_value("destination_height", 10usize).unwrap();
        let pipeline = Pipeline::new().with_step(crop);

        // Recompute clamps the width before validation sees it
        let result = ExecutionEngine::new().execute(&pipeline, seed());
        assert!(!result.has_errors());
        let image = result.last_output().unwrap().members()[0].as_color_map().unwrap();
        assert_eq!(image.dimensions(), (10_000, 10));

        let options = ExecutionOptions::new().with_recompute(false);
        let result = ExecutionEngine::new()
            .with_default_options(options)
            .execute(&pipeline, seed());
        assert_eq!(result.stats.steps_skipped, 1);
    }

    #[test]
    fn test_without_seed_there_is_no_upstream() {
        let pipeline = Pipeline::new().with_step(StepDetails::new(StepKind::ToFloat));
        let result = ExecutionEngine::new().execute(&pipeline, OutputSink::new());
        assert_eq!(
            result.last_output().unwrap().errors(),
            ["No input data found.".to_string()]
        );
    }

    #[test]
    fn test_pipeline_editing() {
        let mut pipeline = Pipeline::new();
        let id = pipeline.add_step(StepDetails::new(StepKind::Scale));
        assert_eq!(pipeline.len(), 1);

        pipeline.step_mut(id).unwrap().details.set_kind(StepKind::ToFloat);
        assert_eq!(pipeline.step(id).unwrap().details.kind(), StepKind::ToFloat);

        assert!(pipeline.remove_step(id).is_some());
        assert!(pipeline.is_empty());
    }
}
