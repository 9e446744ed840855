use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event, info_span};
use whq_core::analysis::{
    QuestionPreference, RankedResponse, SweepPoint, confidence_sweep, question_preferences,
    top_responses,
};
use whq_core::domain::Question;
use whq_core::{AppInfo, Model, ModelError, ModelParams};

use crate::config::{BenchConfig, ResolvedOutputs};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize report JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Respondent answers for one knowledge configuration and question.
#[derive(Debug, Clone, Serialize)]
pub struct RespondentRow {
    pub knowledge: usize,
    pub label: String,
    pub question: Question,
    pub top: Vec<RankedResponse>,
}

/// Everything a run computes, in presentation order.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub run_id: String,
    pub version: &'static str,
    pub n_items: usize,
    pub n_worlds: usize,
    pub n_configs: usize,
    pub params: ModelParams,
    pub respondents: Vec<RespondentRow>,
    pub preferences: Vec<QuestionPreference>,
    pub sweep: Vec<SweepPoint>,
}

impl Report {
    pub fn build(config: &BenchConfig) -> Result<Self, ModelError> {
        let model = Model::new(config.model)?;
        let domain = model.domain();
        let n_items = domain.n_items();

        let mut respondents = Vec::new();
        for index in config.report.knowledge_indices(n_items) {
            let knowledge = domain.knowledge_id(index)?;
            let label = domain.knowledge_config(knowledge)?.label(n_items);
            for question in Question::ALL {
                let top = top_responses(&model, question, knowledge, config.report.top_k)?;
                respondents.push(RespondentRow {
                    knowledge: index,
                    label: label.clone(),
                    question,
                    top,
                });
            }
        }

        let preferences = question_preferences(&model)?;
        let sweep = confidence_sweep(&config.model, &config.report.sweep)?;

        event!(
            Level::INFO,
            run_id = %config.run_id,
            respondent_rows = respondents.len(),
            sweep_points = sweep.len(),
            "report computed"
        );

        Ok(Self {
            run_id: config.run_id.clone(),
            version: AppInfo::version(),
            n_items,
            n_worlds: domain.n_worlds(),
            n_configs: domain.knowledge().len(),
            params: config.model,
            respondents,
            preferences,
            sweep,
        })
    }

    /// Plain-text rendering for the terminal.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Wh-Questions Model: {} vials, {} worlds, {} knowledge configs\n",
            self.n_items, self.n_worlds, self.n_configs
        );
        let _ = writeln!(out, "R0's responses for selected knowledge configs:");
        let _ = writeln!(out, "(N_conf_contaminated, N_conf_uncontaminated, uncertain)");
        let mut last_knowledge = None;
        for row in &self.respondents {
            if last_knowledge != Some(row.knowledge) {
                let _ = writeln!(out, "  {}:", row.label);
                last_knowledge = Some(row.knowledge);
            }
            let answers = row
                .top
                .iter()
                .map(|ranked| format!("'{}' ({:.2})", ranked.response, ranked.probability))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "    {}: {}", row.question, answers);
        }

        let _ = writeln!(
            out,
            "\nQ1's question preferences (marginalizing over R0's knowledge):"
        );
        for pref in &self.preferences {
            let _ = writeln!(
                out,
                "  {}: P(Which cont?)={:.2}, P(Which uncont?)={:.2}",
                pref.goal, pref.which_contaminated, pref.which_uncontaminated
            );
        }

        if !self.sweep.is_empty() {
            let _ = writeln!(out, "\nQ1's preferences by R0 confidence level:");
            let _ = writeln!(
                out,
                "  {:<12} {:<20} {:<20}",
                "P_CONFIDENT", "FIND_CLEAN", "AVOID_CONTAM"
            );
            let _ = writeln!(
                out,
                "  {:12} {:<20} {:<20}",
                "", "P(Which uncont?)", "P(Which cont?)"
            );
            let _ = writeln!(out, "  {}", "-".repeat(52));
            for point in &self.sweep {
                let _ = writeln!(
                    out,
                    "  {:<12.2} {:<20.3} {:<20.3}",
                    point.confidence, point.find_clean, point.avoid_contamination
                );
            }
        }
        out
    }

    /// Markdown summary with the same tables.
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Wh-question model run `{}`\n", self.run_id);
        let _ = writeln!(
            out,
            "- vials: {}\n- worlds: {}\n- knowledge configs: {}\n- confidence: {}\n- divergence unit: {:?}\n",
            self.n_items,
            self.n_worlds,
            self.n_configs,
            self.params.confidence,
            self.params.divergence_unit
        );

        let _ = writeln!(out, "## Respondent answers\n");
        let _ = writeln!(out, "| config | question | answer | probability |");
        let _ = writeln!(out, "|---|---|---|---|");
        for row in &self.respondents {
            for ranked in &row.top {
                let _ = writeln!(
                    out,
                    "| {} | {} | `{}` | {:.3} |",
                    row.label, row.question, ranked.response, ranked.probability
                );
            }
        }

        let _ = writeln!(out, "\n## Question preferences\n");
        let _ = writeln!(out, "| goal | P(which contaminated) | P(which uncontaminated) |");
        let _ = writeln!(out, "|---|---|---|");
        for pref in &self.preferences {
            let _ = writeln!(
                out,
                "| {} | {:.3} | {:.3} |",
                pref.goal, pref.which_contaminated, pref.which_uncontaminated
            );
        }

        if !self.sweep.is_empty() {
            let _ = writeln!(out, "\n## Confidence sweep\n");
            let _ = writeln!(
                out,
                "| confidence | FIND_CLEAN: P(which uncontaminated) | AVOID_CONTAMINATION: P(which contaminated) |"
            );
            let _ = writeln!(out, "|---|---|---|");
            for point in &self.sweep {
                let _ = writeln!(
                    out,
                    "| {:.2} | {:.3} | {:.3} |",
                    point.confidence, point.find_clean, point.avoid_contamination
                );
            }
        }
        out
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        ensure_parent(path.parent())?;
        let file = File::create(path).map_err(|source| ReportError::Io {
            context: format!("creating report JSON at {}", path.display()),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(|source| ReportError::Io {
            context: format!("flushing report JSON at {}", path.display()),
            source,
        })
    }

    pub fn write_markdown(&self, path: &Path) -> Result<(), ReportError> {
        ensure_parent(path.parent())?;
        fs::write(path, self.render_markdown()).map_err(|source| ReportError::Io {
            context: format!("writing summary markdown at {}", path.display()),
            source,
        })
    }
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub report: Report,
    pub json_path: PathBuf,
    pub summary_path: PathBuf,
}

/// Computes the report for a validated configuration and writes its artifacts.
pub struct ReportRunner {
    config: BenchConfig,
    outputs: ResolvedOutputs,
}

impl ReportRunner {
    pub fn new(config: BenchConfig, outputs: ResolvedOutputs) -> Self {
        Self { config, outputs }
    }

    pub fn run(&self) -> Result<RunSummary, ReportError> {
        let span = info_span!(
            "report_run",
            run_id = %self.config.run_id,
            n_items = self.config.model.n_items,
            confidence = self.config.model.confidence
        );
        let _entered = span.enter();
        let report = Report::build(&self.config)?;
        report.write_json(&self.outputs.json)?;
        report.write_markdown(&self.outputs.summary_md)?;
        Ok(RunSummary {
            report,
            json_path: self.outputs.json.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }
}

fn ensure_parent(parent: Option<&Path>) -> Result<(), ReportError> {
    if let Some(dir) = parent {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|source| ReportError::Io {
                context: format!("creating directory {}", dir.display()),
                source,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoggingConfig, OutputsConfig, ReportConfig};

    fn small_config() -> BenchConfig {
        BenchConfig {
            run_id: "unit".to_string(),
            model: ModelParams {
                n_items: 3,
                ..ModelParams::default()
            },
            report: ReportConfig {
                knowledge: Some(vec![0, 9]),
                top_k: 2,
                sweep: vec![0.6, 0.9],
            },
            outputs: OutputsConfig {
                json: "out/{run_id}.json".to_string(),
                summary_md: "out/{run_id}.md".to_string(),
            },
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn report_has_one_row_per_config_and_question() {
        let report = Report::build(&small_config()).expect("report");
        assert_eq!(report.n_worlds, 8);
        assert_eq!(report.n_configs, 10);
        assert_eq!(report.respondents.len(), 4);
        assert!(report.respondents.iter().all(|row| row.top.len() == 2));
        assert_eq!(report.respondents[2].label, "(3, 0, 0)");
        assert_eq!(report.sweep.len(), 2);
    }

    #[test]
    fn text_rendering_lists_every_section() {
        let report = Report::build(&small_config()).expect("report");
        let text = report.render_text();
        assert!(text.starts_with("Wh-Questions Model: 3 vials, 8 worlds, 10 knowledge configs"));
        assert!(text.contains("  (0, 0, 3):"));
        assert!(text.contains("WHICH_CONTAMINATED: '"));
        assert!(text.contains("FIND_CLEAN: P(Which cont?)="));
        assert!(text.contains("P_CONFIDENT"));
    }

    #[test]
    fn markdown_rendering_has_tables() {
        let report = Report::build(&small_config()).expect("report");
        let md = report.render_markdown();
        assert!(md.contains("# Wh-question model run `unit`"));
        assert!(md.contains("| goal | P(which contaminated) | P(which uncontaminated) |"));
        assert!(md.contains("## Confidence sweep"));
    }
}
