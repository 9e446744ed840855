use crate::config::ModelParams;
use crate::dist::{DistError, Distribution};
use crate::domain::semantics::{meaning, world_prior};
use crate::domain::{Domain, Question, Response, World};
use crate::model::{Model, ModelError};
use tracing::trace;

/// Posterior over worlds for a listener who only trusts the literal content of `response`.
pub fn literal_posterior(
    domain: &Domain,
    params: &ModelParams,
    question: Question,
    response: Response,
) -> Result<Distribution<World>, DistError> {
    let n_items = domain.n_items();
    let prior = Distribution::choose(domain.worlds(), |world| {
        world_prior(world, n_items, params.contamination_rate)
    })?;
    prior.condition(|world| meaning(question, response, world, n_items))
}

impl Model {
    /// L0 table for `(question, response)`, built on first use.
    ///
    /// Responses outside the model's item range are rejected rather than mapped onto
    /// another question's slot.
    pub fn listener(
        &self,
        question: Question,
        response: Response,
    ) -> Result<&Distribution<World>, ModelError> {
        let offset = self.domain.response_slot(response)?;
        let slot = question.index() * self.domain.n_worlds() + offset;
        self.listener_tables[slot].get_or_try_init(|| {
            let posterior = literal_posterior(&self.domain, &self.params, question, response)?;
            trace!(
                %question,
                %response,
                support = posterior.len(),
                "built literal listener table"
            );
            Ok(posterior)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    fn model() -> Model {
        Model::new(ModelParams::default()).expect("default params")
    }

    #[test]
    fn empty_answer_leaves_prior_untouched() {
        let model = model();
        let posterior = model
            .listener(Question::WhichContaminated, Response::from_bits(0))
            .expect("posterior");
        assert_eq!(posterior.len(), 32);
        for (_, p) in posterior.iter() {
            assert!((p - 1.0 / 32.0).abs() < 1e-12);
        }
    }

    #[test]
    fn full_answer_pins_a_single_world() {
        let model = model();
        let contaminated = model
            .listener(Question::WhichContaminated, Response::from_bits(0b11111))
            .expect("posterior");
        assert_eq!(contaminated.mode(), Some((World::from_bits(0), 1.0)));

        let clean = model
            .listener(Question::WhichUncontaminated, Response::from_bits(0b11111))
            .expect("posterior");
        assert_eq!(clean.mode(), Some((World::from_bits(0b11111), 1.0)));
    }

    #[test]
    fn posterior_respects_biased_prior() {
        let params = ModelParams {
            contamination_rate: 0.2,
            ..ModelParams::default()
        };
        let domain = Domain::new(params.n_items);
        let posterior = literal_posterior(
            &domain,
            &params,
            Question::WhichUncontaminated,
            Response::from_bits(0b00001),
        )
        .expect("posterior");
        assert_eq!(posterior.len(), 16);
        let p_item_one_clean = posterior.probability(|world| world.is_clean(1));
        assert!((p_item_one_clean - 0.8).abs() < 1e-12);
        assert_eq!(posterior.probability(|world| !world.is_clean(0)), 0.0);
    }

    #[test]
    fn repeated_queries_reuse_the_memoized_table() {
        let model = model();
        let first = model
            .listener(Question::WhichContaminated, Response::from_bits(3))
            .expect("posterior") as *const _;
        let second = model
            .listener(Question::WhichContaminated, Response::from_bits(3))
            .expect("posterior") as *const _;
        assert_eq!(first, second);
    }

    #[test]
    fn out_of_range_response_never_reads_the_other_question() {
        let model = Model::new(ModelParams {
            n_items: 3,
            ..ModelParams::default()
        })
        .expect("params");
        model
            .listener(Question::WhichUncontaminated, Response::from_bits(3))
            .expect("posterior");

        let aliased = model.listener(Question::WhichContaminated, Response::from_bits(8 + 3));
        assert!(matches!(
            aliased,
            Err(ModelError::Domain(DomainError::Response { bits: 11, limit: 8, .. }))
        ));
    }
}
