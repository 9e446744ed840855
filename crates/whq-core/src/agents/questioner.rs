use crate::dist::{Distribution, Softmax, imagine};
use crate::domain::semantics::decision_value;
use crate::domain::{Goal, KnowledgeId, Question, World};
use crate::model::{Model, ModelError};
use tracing::debug;

/// The questioner's prior over the respondent's knowledge: uniform.
pub fn knowledge_prior(_knowledge: KnowledgeId) -> f64 {
    1.0
}

impl Model {
    /// Worlds the questioner expects to believe in after asking `question`, marginal over
    /// the respondent's knowledge and answer.
    pub fn scenario(&self, question: Question) -> Result<Distribution<World>, ModelError> {
        let knowledge = Distribution::choose(self.domain.knowledge().ids(), knowledge_prior)?;
        let answers = knowledge.try_bind_ref(|knowledge| self.respondent(question, knowledge))?;
        answers.try_bind_ref(|response| self.listener(question, response))
    }

    /// Decision value of every world for `goal`, indexed by world bits.
    pub fn decision_values(&self, goal: Goal) -> Result<Vec<f64>, ModelError> {
        let n_items = self.domain.n_items();
        self.domain
            .worlds()
            .map(|world| {
                decision_value(goal, world, n_items, self.params.alpha_policy)
                    .map_err(ModelError::from)
            })
            .collect()
    }

    /// Expected decision value of asking `question` while pursuing `goal`.
    pub fn question_value(&self, goal: Goal, question: Question) -> Result<f64, ModelError> {
        let values = self.decision_values(goal)?;
        self.expected_decision_value(question, &values)
    }

    fn expected_decision_value(
        &self,
        question: Question,
        values: &[f64],
    ) -> Result<f64, ModelError> {
        imagine(
            || self.scenario(question),
            |worlds| worlds.expectation(|world| values[self.domain.world_slot(world)]),
        )
    }

    /// Q1 table for `goal`, built on first use.
    pub fn questioner(&self, goal: Goal) -> Result<&Distribution<Question>, ModelError> {
        self.questioner_tables[goal.index()].get_or_try_init(|| {
            let values = self.decision_values(goal)?;
            let questions = Softmax::natural(self.params.alpha_q)
                .choose(Question::ALL, |question| {
                    self.expected_decision_value(question, &values)
                })?;
            debug!(
                %goal,
                confidence = self.params.confidence,
                p_contaminated = questions.prob(Question::WhichContaminated),
                p_uncontaminated = questions.prob(Question::WhichUncontaminated),
                "built questioner table"
            );
            Ok(questions)
        })
    }
}
