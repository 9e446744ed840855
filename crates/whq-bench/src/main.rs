use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use whq_bench::config::{BenchConfig, ResolvedOutputs};
use whq_bench::logging::init_logging;
use whq_bench::report::ReportRunner;

/// Reports for the recursive wh-question model.
#[derive(Debug, Parser)]
#[command(
    name = "whq-bench",
    author,
    version,
    about = "Exact-enumeration questioner/respondent model runs"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/whq.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of vials.
    #[arg(long, value_name = "N")]
    items: Option<usize>,

    /// Override the respondent confidence.
    #[arg(long, value_name = "P")]
    confidence: Option<f64>,

    /// Override the telemetry level (trace, debug, info, warn, error).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Exit after validating the configuration (no model is evaluated).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(items) = cli.items {
        config.model.n_items = items;
    }

    if let Some(confidence) = cli.confidence {
        config.model.confidence = confidence;
    }

    if let Some(level) = cli.log_level {
        config.logging.tracing_level = level;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    println!(
        "Loaded configuration '{run_id}' ({} vials, confidence {})",
        config.model.n_items, config.model.confidence
    );

    let logging_guard = init_logging(&run_id, &config.logging, &outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: model evaluation skipped.");
        return Ok(());
    }

    let runner = ReportRunner::new(config, outputs);
    let summary = runner
        .run()
        .with_context(|| format!("running report '{run_id}'"))?;

    print!("{}", summary.report.render_text());
    println!("\nReport JSON: {}", summary.json_path.display());
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
