//! Memoized three-level model and its query interface.

use crate::config::{ConfigError, ModelParams};
use crate::dist::{DistError, Distribution};
use crate::domain::{Domain, DomainError, Goal, Question, Response, World};
use once_cell::unsync::OnceCell;
use std::array;
use thiserror::Error;
use tracing::debug;

/// Failures surfaced by model queries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("invalid model configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("degenerate distribution: {0}")]
    Distribution(#[from] DistError),
}

/// One parameterization of the questioner/respondent/listener hierarchy.
///
/// Every table is keyed by its exact input tuple and filled lazily. The constants are
/// fixed for the lifetime of a `Model`; use [`Model::with_confidence`] (or
/// [`Model::new`]) to get fresh tables for different constants.
#[derive(Debug)]
pub struct Model {
    pub(crate) params: ModelParams,
    pub(crate) domain: Domain,
    pub(crate) listener_tables: Vec<OnceCell<Distribution<World>>>,
    pub(crate) respondent_tables: Vec<OnceCell<Distribution<Response>>>,
    pub(crate) questioner_tables: [OnceCell<Distribution<Question>>; 2],
}

impl Model {
    pub fn new(params: ModelParams) -> Result<Self, ConfigError> {
        params.validate()?;
        let domain = Domain::new(params.n_items);
        let listener_slots = Question::ALL.len() * domain.n_worlds();
        let respondent_slots = Question::ALL.len() * domain.knowledge().len();
        debug!(
            n_items = domain.n_items(),
            worlds = domain.n_worlds(),
            configs = domain.knowledge().len(),
            confidence = params.confidence,
            "model initialised"
        );
        Ok(Self {
            params,
            domain,
            listener_tables: (0..listener_slots).map(|_| OnceCell::new()).collect(),
            respondent_tables: (0..respondent_slots).map(|_| OnceCell::new()).collect(),
            questioner_tables: array::from_fn(|_| OnceCell::new()),
        })
    }

    /// Same constants with a different respondent confidence, with empty tables.
    pub fn with_confidence(&self, confidence: f64) -> Result<Self, ConfigError> {
        Self::new(self.params.with_confidence(confidence)?)
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// `Pr(world | question, response)` under the literal listener.
    pub fn l0(&self, question: Question, response: u32, world: u32) -> Result<f64, ModelError> {
        let response = self.domain.response(response)?;
        let world = self.domain.world(world)?;
        Ok(self.listener(question, response)?.prob(world))
    }

    /// `Pr(response | question, knowledge)` under the respondent.
    pub fn r0(
        &self,
        question: Question,
        knowledge: usize,
        response: u32,
    ) -> Result<f64, ModelError> {
        let knowledge = self.domain.knowledge_id(knowledge)?;
        let response = self.domain.response(response)?;
        Ok(self.respondent(question, knowledge)?.prob(response))
    }

    /// `Pr(question | goal)` under the questioner.
    pub fn q1(&self, goal: Goal, question: Question) -> Result<f64, ModelError> {
        Ok(self.questioner(goal)?.prob(question))
    }

    /// Eagerly fills every table.
    pub fn precompute(&self) -> Result<(), ModelError> {
        for goal in Goal::ALL {
            self.questioner(goal)?;
        }
        Ok(())
    }
}
