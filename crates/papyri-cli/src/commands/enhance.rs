use std::path::PathBuf;

use tracing::{info, warn};

use papyri_core::config::load_config;
use papyri_core::{BatchOutcome, BatchRunner};

use crate::builders::{build_request, build_retinex, build_sink, EnhanceOverrides};
use crate::processing::expand_inputs;

/// Everything `papyri enhance` takes from the command line.
#[derive(Debug, Clone, Default)]
pub struct EnhanceArgs {
    pub inputs: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub recursive: bool,
    pub overrides: EnhanceOverrides,
}

/// Enhance every input and print a summary.
pub fn cmd_enhance(args: EnhanceArgs) -> Result<(), String> {
    let handle = load_config(args.config.as_deref());
    if let Some(source) = &handle.source {
        info!(source = %source.display(), "using config");
    }
    for warning in &handle.warnings {
        warn!("{}", warning);
    }
    let config = handle.config;

    let request = build_request(&config, &args.overrides)?;
    let files = expand_inputs(&args.inputs, args.recursive)?;
    if files.is_empty() {
        return Err("No supported images found in inputs".to_string());
    }

    let mut sink = build_sink(&config, &request);
    let retinex = build_retinex(&config);
    if !request.operators.retinex.is_empty() && retinex.is_none() {
        warn!("retinex selected without retinex.command, retinex variants are skipped");
    }

    let mut runner = BatchRunner::new(request, &mut sink);
    if let Some(retinex) = &retinex {
        runner = runner.with_retinex(retinex);
    }
    if config.color.gamut_expansion {
        runner = runner.with_gamut_expansion(config.color.profile_dir.clone());
    }
    if let Some(out) = &args.out {
        runner = runner.with_output_dir(out);
    }

    println!("Enhancing {} image(s)...", files.len());
    let outcome = runner.run(&files).map_err(|e| e.to_string())?;
    print!("{}", format_summary(&outcome));
    Ok(())
}

/// Human-readable summary of a finished batch.
pub fn format_summary(outcome: &BatchOutcome) -> String {
    let mut text = String::new();
    text.push_str(&format!("Processed: {} image(s)\n", outcome.processed));
    if let Some(first) = &outcome.first {
        text.push_str(&format!(
            "Variants for {}: {}\n",
            first.source.display(),
            first.len().saturating_sub(1)
        ));
    }

    if !outcome.unreadable.is_empty() {
        text.push_str(&format!("Unreadable: {}\n", outcome.unreadable.len()));
        for entry in &outcome.unreadable {
            text.push_str(&format!(
                "  #{} {}: {}\n",
                entry.position,
                entry.path.display(),
                entry.reason
            ));
        }
    }
    if !outcome.warnings.is_empty() {
        text.push_str(&format!("Warnings: {}\n", outcome.warnings.len()));
        for warning in &outcome.warnings {
            text.push_str(&format!("  {}\n", warning));
        }
    }
    if !outcome.statuses.is_empty() {
        text.push_str(&format!("ICC profile: {}\n", outcome.statuses.len()));
        for status in &outcome.statuses {
            text.push_str(&format!("  {}\n", status));
        }
    }
    if outcome.aborted {
        text.push_str("Aborted before all inputs were processed\n");
    }
    text
}
