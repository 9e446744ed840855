use crate::dist::DivergenceUnit;
use crate::domain::MAX_ITEMS;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

const DEFAULT_ITEMS: usize = 5;
const DEFAULT_CONTAMINATION_RATE: f64 = 0.5;
const DEFAULT_CONFIDENCE: f64 = 0.9;
const DEFAULT_ALPHA_R: f64 = 5.0;
const DEFAULT_ALPHA_POLICY: f64 = 10.0;
const DEFAULT_ALPHA_Q: f64 = 5.0;
const DEFAULT_LENGTH_COST: f64 = 0.1;

/// Constants shared by every layer of the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelParams {
    /// Number of vials; worlds and responses range over `2^n_items` subsets.
    pub n_items: usize,
    /// Prior probability that any single vial is contaminated.
    pub contamination_rate: f64,
    /// How sure the respondent is about the vials it claims to know.
    pub confidence: f64,
    /// Respondent softmax temperature.
    pub alpha_r: f64,
    /// Temperature of the questioner's downstream vial choice.
    pub alpha_policy: f64,
    /// Questioner softmax temperature.
    pub alpha_q: f64,
    /// Penalty per mentioned vial.
    pub length_cost: f64,
    /// Log base of the respondent's KL objective.
    pub divergence_unit: DivergenceUnit,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            n_items: DEFAULT_ITEMS,
            contamination_rate: DEFAULT_CONTAMINATION_RATE,
            confidence: DEFAULT_CONFIDENCE,
            alpha_r: DEFAULT_ALPHA_R,
            alpha_policy: DEFAULT_ALPHA_POLICY,
            alpha_q: DEFAULT_ALPHA_Q,
            length_cost: DEFAULT_LENGTH_COST,
            divergence_unit: DivergenceUnit::default(),
        }
    }
}

impl ModelParams {
    /// Defaults overridden by `WHQ_*` environment variables, then validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = Self::default();
        let params = Self {
            n_items: parse_env("WHQ_ITEMS", base.n_items)?,
            contamination_rate: parse_env("WHQ_CONTAMINATION_RATE", base.contamination_rate)?,
            confidence: parse_env("WHQ_CONFIDENCE", base.confidence)?,
            alpha_r: parse_env("WHQ_ALPHA_R", base.alpha_r)?,
            alpha_policy: parse_env("WHQ_ALPHA_POLICY", base.alpha_policy)?,
            alpha_q: parse_env("WHQ_ALPHA_Q", base.alpha_q)?,
            length_cost: parse_env("WHQ_LENGTH_COST", base.length_cost)?,
            divergence_unit: match env::var("WHQ_DIVERGENCE_UNIT").ok().as_deref() {
                None => base.divergence_unit,
                Some("bits") => DivergenceUnit::Bits,
                Some("nats") => DivergenceUnit::Nats,
                Some(other) => {
                    return Err(ConfigError::InvalidField {
                        field: "WHQ_DIVERGENCE_UNIT".to_string(),
                        message: format!("expected 'bits' or 'nats', got '{other}'"),
                    });
                }
            },
        };
        params.validate()?;
        Ok(params)
    }

    /// Copy with a different respondent confidence, validated.
    pub fn with_confidence(&self, confidence: f64) -> Result<Self, ConfigError> {
        let params = Self {
            confidence,
            ..*self
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_items == 0 || self.n_items > MAX_ITEMS {
            return Err(ConfigError::InvalidField {
                field: "n_items".to_string(),
                message: format!("item count must be between 1 and {MAX_ITEMS}"),
            });
        }

        for (field, value) in [
            ("contamination_rate", self.contamination_rate),
            ("confidence", self.confidence),
        ] {
            if !value.is_finite() || value <= 0.0 || value >= 1.0 {
                return Err(ConfigError::InvalidField {
                    field: field.to_string(),
                    message: format!("{value} must lie strictly between 0 and 1"),
                });
            }
        }

        for (field, value) in [
            ("alpha_r", self.alpha_r),
            ("alpha_policy", self.alpha_policy),
            ("alpha_q", self.alpha_q),
            ("length_cost", self.length_cost),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidField {
                    field: field.to_string(),
                    message: format!("{value} must be finite and non-negative"),
                });
            }
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, fallback: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidField {
            field: key.to_string(),
            message: format!("could not parse '{raw}'"),
        }),
        Err(_) => Ok(fallback),
    }
}

/// Rejected model constants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
