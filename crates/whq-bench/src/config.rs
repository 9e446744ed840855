use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;
use whq_core::ModelParams;
use whq_core::domain::KnowledgeTable;

const DEFAULT_TOP_K: usize = 1;
const DEFAULT_KNOWLEDGE_INDICES: [usize; 4] = [0, 7, 14, 20];
const DEFAULT_SWEEP: [f64; 7] = [0.5, 0.6, 0.7, 0.8, 0.9, 0.95, 0.99];
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root harness configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchConfig {
    pub run_id: String,
    #[serde(default)]
    pub model: ModelParams,
    #[serde(default)]
    pub report: ReportConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BenchConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.model
            .validate()
            .map_err(|whq_core::ConfigError::InvalidField { field, message }| {
                ValidationError::InvalidField {
                    field: format!("model.{field}"),
                    message,
                }
            })?;
        self.report.validate(self.model.n_items)?;
        self.outputs.validate(&self.run_id)?;
        self.logging.validate()?;
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            json: resolve_template(&self.run_id, &self.outputs.json),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

/// Which tables the report renders.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Knowledge-config indices to show respondent answers for. When omitted, a fixed
    /// selection is used and indices beyond the table are skipped.
    #[serde(default)]
    pub knowledge: Option<Vec<usize>>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_sweep")]
    pub sweep: Vec<f64>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            knowledge: None,
            top_k: DEFAULT_TOP_K,
            sweep: default_sweep(),
        }
    }
}

impl ReportConfig {
    fn validate(&self, n_items: usize) -> Result<(), ValidationError> {
        if self.top_k == 0 {
            return Err(ValidationError::InvalidField {
                field: "report.top_k".to_string(),
                message: "top_k must be at least 1".to_string(),
            });
        }

        let len = KnowledgeTable::expected_len(n_items);
        if let Some(indices) = self.knowledge.as_ref() {
            if let Some(bad) = indices.iter().find(|&&index| index >= len) {
                return Err(ValidationError::InvalidField {
                    field: "report.knowledge".to_string(),
                    message: format!("index {bad} is outside the {len}-entry knowledge table"),
                });
            }
        }

        if let Some(bad) = self
            .sweep
            .iter()
            .find(|value| !value.is_finite() || **value <= 0.0 || **value >= 1.0)
        {
            return Err(ValidationError::InvalidField {
                field: "report.sweep".to_string(),
                message: format!("confidence {bad} must lie strictly between 0 and 1"),
            });
        }

        Ok(())
    }

    /// Knowledge indices to report for a model over `n_items` items.
    pub fn knowledge_indices(&self, n_items: usize) -> Vec<usize> {
        match self.knowledge.as_ref() {
            Some(indices) => indices.clone(),
            None => {
                let len = KnowledgeTable::expected_len(n_items);
                DEFAULT_KNOWLEDGE_INDICES
                    .into_iter()
                    .filter(|&index| index < len)
                    .collect()
            }
        }
    }
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_sweep() -> Vec<f64> {
    DEFAULT_SWEEP.to_vec()
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub json: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.json", &self.json),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn validate(&mut self) -> Result<(), ValidationError> {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
        if self.level().is_none() {
            return Err(ValidationError::InvalidField {
                field: "logging.tracing_level".to_string(),
                message: format!(
                    "unknown level '{}' (expected trace, debug, info, warn or error)",
                    self.tracing_level
                ),
            });
        }
        Ok(())
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub json: PathBuf,
    pub summary_md: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use whq_core::dist::DivergenceUnit;

    const BASIC_YAML: &str = r#"
run_id: "vials_5"
model:
  n_items: 5
  confidence: 0.9
  divergence_unit: "bits"
report:
  top_k: 2
outputs:
  json: "bench/out/{run_id}/report.json"
  summary_md: "bench/out/{run_id}/summary.md"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    fn field_of(err: ValidationError) -> String {
        let ValidationError::InvalidField { field, .. } = err;
        field
    }

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: BenchConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.model.alpha_r, ModelParams::default().alpha_r);
        assert_eq!(cfg.model.divergence_unit, DivergenceUnit::Bits);
        assert_eq!(cfg.report.top_k, 2);
        assert_eq!(cfg.report.sweep, DEFAULT_SWEEP.to_vec());
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));

        let outputs = cfg.resolved_outputs();
        assert_eq!(outputs.json, PathBuf::from("bench/out/vials_5/report.json"));
    }

    #[test]
    fn default_knowledge_selection_skips_missing_entries() {
        let report = ReportConfig::default();
        assert_eq!(report.knowledge_indices(5), vec![0, 7, 14, 20]);
        assert_eq!(report.knowledge_indices(3), vec![0, 7]);
    }

    #[test]
    fn rejects_out_of_table_knowledge_index() {
        let yaml = BASIC_YAML.replace("  top_k: 2\n", "  knowledge: [0, 21]\n");
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("index 21 is out of range");
        assert_eq!(field_of(err), "report.knowledge");
    }

    #[test]
    fn rejects_certain_confidence() {
        let yaml = BASIC_YAML.replace("confidence: 0.9", "confidence: 1.0");
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("confidence of 1 is rejected");
        assert_eq!(field_of(err), "model.confidence");
    }

    #[test]
    fn rejects_sweep_values_outside_unit_interval() {
        let yaml = BASIC_YAML.replace("  top_k: 2\n", "  sweep: [0.5, 1.2]\n");
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("sweep rejected");
        assert_eq!(field_of(err), "report.sweep");
    }

    #[test]
    fn rejects_unknown_tracing_level() {
        let yaml = BASIC_YAML.replace("tracing_level: \"debug\"", "tracing_level: \"loud\"");
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("level rejected");
        assert_eq!(field_of(err), "logging.tracing_level");
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("vials_5", "vials 5");
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid run id");
        assert_eq!(field_of(err), "run_id");
    }
}
