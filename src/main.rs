//! Pixelstep CLI - parameterized image processing steps
//!
//! A small front end over the pixelstep library: inspect the step catalog and
//! run a fixed scale/crop/normalize pipeline over a single image.

use anyhow::{anyhow, bail, Context};
use pixelstep::prelude::*;
use pixelstep::steps::{normalize_brightness, scale};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("pixelstep");

    if args.len() < 2 {
        print_usage(program);
        return Ok(());
    }

    match args[1].as_str() {
        "list" => list_steps(),
        "info" => {
            let Some(id) = args.get(2) else {
                bail!("Please specify a step kind, see '{} list'", program);
            };
            let json = args[3..].iter().any(|a| a == "--json");
            step_info(id, json)?;
        }
        "process" => {
            if args.len() < 4 {
                print_usage(program);
                bail!("Please specify input and output paths");
            }
            process_image(&args[2], &args[3], &args[4..])?;
        }
        "help" | "--help" | "-h" => print_usage(program),
        other => {
            print_usage(program);
            bail!("Unknown command: {}", other);
        }
    }

    Ok(())
}

fn print_usage(program: &str) {
    println!("Pixelstep v{}", pixelstep::VERSION);
    println!();
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  list                          List all available step kinds");
    println!("  info <kind> [--json]          Show the parameters of a step kind");
    println!("  process <in> <out> [options]  Process an image");
    println!("  help                          Show this help message");
    println!();
    println!("Process options:");
    println!("  --scale <WxH>      Scale the image, 0 keeps the aspect ratio (e.g. 800x0)");
    println!("  --crop <WxH>       Cut a centered rectangle out of the image");
    println!("  --normalize        Normalize the mean brightness");
    println!("  --config <file>    Load execution options from a TOML file");
    println!();
    println!("Set RUST_LOG=debug for detailed logs.");
}

fn list_steps() {
    let registry = StepRegistry::with_builtins();

    println!("Available step kinds ({} total):", registry.len());
    println!();

    for (category, kinds) in registry.grouped_by_category() {
        println!("  {}", category);
        for kind in kinds {
            println!("      • {} - {}", kind.id(), kind.description());
        }
        println!();
    }
}

fn step_info(id: &str, json: bool) -> anyhow::Result<()> {
    let registry = StepRegistry::with_builtins();
    let details = registry
        .create(id)
        .ok_or_else(|| anyhow!("Step kind not found: {}. Use 'list' to see available kinds.", id))?;

    if json {
        println!("{}", details.to_json()?);
        return Ok(());
    }

    let kind = details.kind();
    println!("Step: {}", kind.display_name());
    println!("ID: {}", kind.id());
    let categories: Vec<_> = kind.categories().iter().map(|c| c.display_name()).collect();
    println!("Categories: {}", categories.join(", "));
    println!();
    println!("Description:");
    println!("  {}", kind.description());
    println!();

    println!("Outputs:");
    for slot in details.output_names() {
        println!("  • {}", slot);
    }
    println!();

    println!("Parameters:");
    for param in details.parameters() {
        let mut line = format!("  • {} [{}]", param.name, param.param_type);
        if let Some(value) = &param.value {
            line.push_str(&format!(" = {}", value));
        }
        if let (Some(min), Some(max)) = (param.min, param.max) {
            line.push_str(&format!(" in [{}, {}]", min, max));
        }
        if !param.enum_values.is_empty() {
            line.push_str(&format!(" one of {:?}", param.enum_values));
        }
        if !param.enabled {
            line.push_str(" (disabled)");
        }
        println!("{}", line);
        if !param.description.is_empty() {
            println!("    {}", param.description);
        }
    }

    Ok(())
}

fn process_image(input_path: &str, output_path: &str, args: &[String]) -> anyhow::Result<()> {
    let mut scale_to: Option<(usize, usize)> = None;
    let mut crop_to: Option<(usize, usize)> = None;
    let mut normalize = false;
    let mut options = ExecutionOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--scale" if i + 1 < args.len() => {
                scale_to = Some(parse_dimensions(&args[i + 1])?);
                i += 2;
            }
            "--crop" if i + 1 < args.len() => {
                crop_to = Some(parse_dimensions(&args[i + 1])?);
                i += 2;
            }
            "--normalize" => {
                normalize = true;
                i += 1;
            }
            "--config" if i + 1 < args.len() => {
                options = ExecutionOptions::from_file(&args[i + 1])
                    .with_context(|| format!("Failed to load options from {}", args[i + 1]))?;
                i += 2;
            }
            other => bail!("Unknown option: {}", other),
        }
    }

    let source = image::open(input_path)
        .with_context(|| format!("Failed to open {}", input_path))?
        .to_rgba8();

    let mut seed = OutputSink::new();
    seed.publish("input", Payload::ColorMap(source));

    let mut pipeline = Pipeline::new();
    let mut current = "input".to_string();

    if let Some((width, height)) = scale_to {
        let mut details = Scale::details(width, height)?;
        details.set_parameter_value(names::COLOR_IMAGE, current.as_str())?;
        details.set_output_name(scale::OUTPUT_COLOR_IMAGE, "scaled");
        pipeline.add_step(details);
        current = "scaled".to_string();
    }

    if let Some((width, height)) = crop_to {
        let details = ExtractRect::details(&current, "cropped", OriginMode::Centered, width, height)?;
        pipeline.add_step(details);
        current = "cropped".to_string();
    }

    if normalize {
        let mut details = StepDetails::new(StepKind::NormalizeBrightness);
        details.set_parameter_value(names::COLOR_IMAGE, current.as_str())?;
        details.set_output_name(normalize_brightness::OUTPUT_IMAGE, "normalized");
        pipeline.add_step(details);
        current = "normalized".to_string();
    }

    println!("Processing {} -> {} ({} steps)", input_path, output_path, pipeline.len());
    let result = ExecutionEngine::new().execute_with_options(&pipeline, seed.clone(), Some(options));

    for (id, error) in result.errors() {
        eprintln!("  step {}: {}", id, error);
    }
    if result.has_errors() {
        bail!("{} step error(s), nothing written", result.stats.errors);
    }

    let produced = result
        .outputs
        .iter()
        .rev()
        .map(|(_, sink)| sink)
        .chain(std::iter::once(&seed))
        .find_map(|sink| sink.members_named(&current).find_map(|m| m.as_color_map()))
        .ok_or_else(|| anyhow!("The pipeline produced no image named '{}'", current))?;

    produced
        .save(output_path)
        .with_context(|| format!("Failed to write {}", output_path))?;

    println!(
        "Done in {:?} ({} steps). Image saved to: {}",
        result.stats.duration, result.stats.steps_executed, output_path
    );
    Ok(())
}

fn parse_dimensions(s: &str) -> anyhow::Result<(usize, usize)> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| anyhow!("Expected dimensions like 800x600, got '{}'", s))?;
    Ok((
        w.parse().with_context(|| format!("Bad width in '{}'", s))?,
        h.parse().with_context(|| format!("Bad height in '{}'", s))?,
    ))
}
