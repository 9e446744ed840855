//! Summaries built on top of the query interface.

use crate::config::ModelParams;
use crate::domain::{Goal, KnowledgeId, Question, Response};
use crate::model::{Model, ModelError};
use serde::Serialize;

/// A respondent answer with its probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedResponse {
    pub response: Response,
    pub probability: f64,
}

/// Q1 for one goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuestionPreference {
    pub goal: Goal,
    pub which_contaminated: f64,
    pub which_uncontaminated: f64,
}

/// Q1 for the goal-matching question at one confidence level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub confidence: f64,
    /// `Q1(FIND_CLEAN, WHICH_UNCONTAMINATED)`.
    pub find_clean: f64,
    /// `Q1(AVOID_CONTAMINATION, WHICH_CONTAMINATED)`.
    pub avoid_contamination: f64,
}

/// The `k` most probable answers; ties favour the smaller bitmask.
pub fn top_responses(
    model: &Model,
    question: Question,
    knowledge: KnowledgeId,
    k: usize,
) -> Result<Vec<RankedResponse>, ModelError> {
    let answers = model.respondent(question, knowledge)?;
    let mut ranked: Vec<RankedResponse> = answers
        .iter()
        .map(|(response, probability)| RankedResponse {
            response,
            probability,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.probability
            .total_cmp(&a.probability)
            .then(a.response.cmp(&b.response))
    });
    ranked.truncate(k);
    Ok(ranked)
}

pub fn question_preferences(model: &Model) -> Result<Vec<QuestionPreference>, ModelError> {
    Goal::ALL
        .into_iter()
        .map(|goal| -> Result<QuestionPreference, ModelError> {
            let questions = model.questioner(goal)?;
            Ok(QuestionPreference {
                goal,
                which_contaminated: questions.prob(Question::WhichContaminated),
                which_uncontaminated: questions.prob(Question::WhichUncontaminated),
            })
        })
        .collect()
}

/// Rebuilds the model at each confidence level; no state is shared between points.
pub fn confidence_sweep(
    params: &ModelParams,
    confidences: &[f64],
) -> Result<Vec<SweepPoint>, ModelError> {
    confidences
        .iter()
        .map(|&confidence| -> Result<SweepPoint, ModelError> {
            let model = Model::new(params.with_confidence(confidence)?)?;
            Ok(SweepPoint {
                confidence,
                find_clean: model.q1(Goal::FindClean, Question::WhichUncontaminated)?,
                avoid_contamination: model
                    .q1(Goal::AvoidContamination, Question::WhichContaminated)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_responses_are_sorted_and_truncated() {
        let model = Model::new(ModelParams::default()).expect("params");
        let knowledge = model.domain().knowledge_id(14).expect("index 14");
        let ranked = top_responses(&model, Question::WhichContaminated, knowledge, 3)
            .expect("ranked");
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].response, Response::from_bits(0b00011));
        assert!(ranked.windows(2).all(|w| w[0].probability >= w[1].probability));
    }

    #[test]
    fn preferences_cover_both_goals() {
        let model = Model::new(ModelParams::default()).expect("params");
        let prefs = question_preferences(&model).expect("prefs");
        assert_eq!(prefs.len(), 2);
        for pref in prefs {
            assert!((pref.which_contaminated + pref.which_uncontaminated - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn sweep_rejects_invalid_confidence() {
        let err = confidence_sweep(&ModelParams::default(), &[0.7, 1.0]).expect_err("invalid");
        assert!(matches!(err, ModelError::Config(_)));
    }
}
