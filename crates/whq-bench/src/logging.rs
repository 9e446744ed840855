use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

/// Crates whose events reach the telemetry file when `RUST_LOG` is unset.
const LOG_TARGETS: [&str; 2] = ["whq_core", "whq_bench"];

/// Keeps the background writer alive; dropping it flushes pending events.
pub struct LoggingGuard {
    _worker: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// `<summary dir>/<run_id>.telemetry.jsonl`, so runs sharing a directory keep separate logs.
pub fn telemetry_path(run_id: &str, outputs: &ResolvedOutputs) -> PathBuf {
    let dir = outputs
        .summary_md
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    dir.join(format!("{run_id}.telemetry.jsonl"))
}

/// Filter directives restricting `level` to the model and harness crates.
pub fn filter_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs a JSON subscriber for the run when structured logging is enabled.
///
/// Table construction in the model crate (listener, respondent and questioner builds) is
/// logged at `debug`/`trace`; run-level events at `info`.
pub fn init_logging(
    run_id: &str,
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let path = telemetry_path(run_id, outputs);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;
    }
    let file = File::create(&path)
        .with_context(|| format!("creating telemetry file at {}", path.display()))?;
    let (writer, worker) = NonBlockingBuilder::default().lossy(false).finish(file);

    let level = logging.level().unwrap_or(Level::INFO);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(true)
        .with_writer(writer)
        .finish();

    // Tests may have installed a global subscriber already.
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(Some(LoggingGuard {
        _worker: worker,
        telemetry_path: path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs(summary: &str) -> ResolvedOutputs {
        ResolvedOutputs {
            json: PathBuf::from("unused.json"),
            summary_md: PathBuf::from(summary),
        }
    }

    #[test]
    fn telemetry_file_is_named_after_the_run() {
        let path = telemetry_path("vials_5", &outputs("bench/out/vials_5/summary.md"));
        assert_eq!(path, PathBuf::from("bench/out/vials_5/vials_5.telemetry.jsonl"));
    }

    #[test]
    fn bare_summary_name_logs_into_working_directory() {
        let path = telemetry_path("run", &outputs("summary.md"));
        assert_eq!(path, PathBuf::from("./run.telemetry.jsonl"));
    }

    #[test]
    fn directives_cover_model_and_harness() {
        assert_eq!(
            filter_directives(Level::DEBUG),
            "whq_core=debug,whq_bench=debug"
        );
    }

    #[test]
    fn disabled_logging_installs_nothing() {
        let guard = init_logging("run", &LoggingConfig::default(), &outputs("summary.md"))
            .expect("no-op");
        assert!(guard.is_none());
    }
}
