use crate::dist::{Distribution, Softmax, imagine, kl_divergence};
use crate::domain::semantics::{response_length, speaker_belief};
use crate::domain::{KnowledgeId, Question, Response, World};
use crate::model::{Model, ModelError};
use tracing::debug;

impl Model {
    /// Respondent's own belief over worlds for a knowledge configuration.
    pub fn respondent_belief(
        &self,
        knowledge: KnowledgeId,
    ) -> Result<Distribution<World>, ModelError> {
        let config = self.domain.knowledge_config(knowledge)?;
        let n_items = self.domain.n_items();
        let confidence = self.params.confidence;
        Ok(Distribution::choose(self.domain.worlds(), |world| {
            speaker_belief(world, n_items, config, confidence)
        })?)
    }

    /// Utility of `response`: negative divergence of the imagined listener from `belief`,
    /// minus the brevity cost.
    pub fn response_utility(
        &self,
        question: Question,
        response: Response,
        belief: &Distribution<World>,
    ) -> Result<f64, ModelError> {
        let divergence = imagine(
            || self.listener(question, response),
            |listener| kl_divergence(*listener, belief, self.params.divergence_unit),
        )?;
        Ok(-divergence - self.params.length_cost * f64::from(response_length(response)))
    }

    /// R0 table for `(question, knowledge)`, built on first use.
    pub fn respondent(
        &self,
        question: Question,
        knowledge: KnowledgeId,
    ) -> Result<&Distribution<Response>, ModelError> {
        let config = self.domain.knowledge_config(knowledge)?;
        let slot = question.index() * self.domain.knowledge().len() + knowledge.index();
        self.respondent_tables[slot].get_or_try_init(|| {
            let belief = self.respondent_belief(knowledge)?;
            let answers = Softmax::natural(self.params.alpha_r)
                .choose(self.domain.responses(), |response| {
                    self.response_utility(question, response, &belief)
                })?;
            debug!(
                %question,
                %knowledge,
                config = %config.label(self.domain.n_items()),
                top = ?answers.mode().map(|(response, p)| (response.bits(), p)),
                "built respondent table"
            );
            Ok(answers)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ModelParams;
    use crate::domain::{DomainError, KnowledgeConfig, Question, Response};
    use crate::model::{Model, ModelError};

    fn model() -> Model {
        Model::new(ModelParams::default()).expect("default params")
    }

    #[test]
    fn confident_respondent_names_known_contaminated_items() {
        let model = model();
        let knowledge = model
            .domain()
            .knowledge()
            .find(KnowledgeConfig::new(1, 1))
            .expect("config exists");

        let contaminated = model
            .respondent(Question::WhichContaminated, knowledge)
            .expect("table");
        let (top, p) = contaminated.mode().expect("non-empty");
        assert_eq!(top, Response::from_bits(0b00001));
        assert!(p > 0.9);

        let clean = model
            .respondent(Question::WhichUncontaminated, knowledge)
            .expect("table");
        assert_eq!(clean.mode().map(|(r, _)| r), Some(Response::from_bits(0b00010)));
    }

    #[test]
    fn exhaustive_answer_beats_empty_answer_for_full_knowledge() {
        let model = model();
        let knowledge = model
            .domain()
            .knowledge()
            .find(KnowledgeConfig::new(5, 0))
            .expect("config exists");
        let belief = model.respondent_belief(knowledge).expect("belief");
        let full = model
            .response_utility(Question::WhichContaminated, Response::from_bits(0b11111), &belief)
            .expect("utility");
        let empty = model
            .response_utility(Question::WhichContaminated, Response::from_bits(0), &belief)
            .expect("utility");
        assert!(full > empty);
    }

    #[test]
    fn ignorant_respondent_mostly_stays_silent() {
        let model = model();
        let knowledge = model.domain().knowledge_id(0).expect("index 0");
        let answers = model
            .respondent(Question::WhichUncontaminated, knowledge)
            .expect("table");
        let (top, p) = answers.mode().expect("non-empty");
        assert_eq!(top, Response::from_bits(0));
        assert!(p > 0.9);
    }

    #[test]
    fn length_cost_shifts_mass_toward_shorter_answers() {
        let cheap = model();
        let pricey = Model::new(ModelParams {
            length_cost: 1.0,
            ..ModelParams::default()
        })
        .expect("params");
        let knowledge = cheap.domain().knowledge_id(20).expect("index 20");
        let full = Response::from_bits(0b11111);
        let p_cheap = cheap
            .respondent(Question::WhichContaminated, knowledge)
            .expect("table")
            .prob(full);
        let p_pricey = pricey
            .respondent(Question::WhichContaminated, knowledge)
            .expect("table")
            .prob(full);
        assert!(p_pricey < p_cheap);
    }

    #[test]
    fn knowledge_key_from_a_larger_model_is_rejected() {
        let big = model();
        let small = Model::new(ModelParams {
            n_items: 3,
            ..ModelParams::default()
        })
        .expect("params");
        let foreign = big.domain().knowledge_id(15).expect("index 15");

        assert!(matches!(
            small.respondent(Question::WhichContaminated, foreign),
            Err(ModelError::Domain(DomainError::ForeignKnowledge {
                index: 15,
                id_items: 5,
                n_items: 3,
            }))
        ));
        assert!(matches!(
            small.respondent_belief(foreign),
            Err(ModelError::Domain(DomainError::ForeignKnowledge { .. }))
        ));
    }
}
