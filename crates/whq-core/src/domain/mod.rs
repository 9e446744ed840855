//! Enumerable domains of the vial scenario and their truth-conditional semantics.
//!
//! This module is composed of:
//! - `items`: bitmask encodings for worlds and responses.
//! - `question`: the two questions and the two goals.
//! - `knowledge`: the dense table of respondent knowledge configurations.
//! - `semantics`: pure meaning, prior, belief and utility functions.

mod items;
mod knowledge;
mod question;
pub mod semantics;

pub use items::{ItemSet, Response, World};
pub use knowledge::{KnowledgeConfig, KnowledgeId, KnowledgeTable};
pub use question::{Goal, Question};

use thiserror::Error;

/// Largest supported item count; the response and world domains grow as `2^N`.
pub const MAX_ITEMS: usize = 10;

/// Rejected indices at the query boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid response index {bits}: expected a subset of {n_items} items (< {limit})")]
    Response {
        bits: u32,
        n_items: usize,
        limit: u32,
    },
    #[error("invalid world index {bits}: expected a subset of {n_items} items (< {limit})")]
    World {
        bits: u32,
        n_items: usize,
        limit: u32,
    },
    #[error("invalid action index {action}: expected an item below {n_items}")]
    Action { action: usize, n_items: usize },
    #[error("invalid knowledge config index {index}: table holds {len} entries")]
    Knowledge { index: usize, len: usize },
    #[error("knowledge config k{index} was issued for {id_items} items, model has {n_items}")]
    ForeignKnowledge {
        index: usize,
        id_items: usize,
        n_items: usize,
    },
}

/// Fixed domains derived from a single item count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    n_items: usize,
    knowledge: KnowledgeTable,
}

impl Domain {
    /// Builds the domains for `n_items` items; the caller guarantees `n_items <= MAX_ITEMS`.
    pub fn new(n_items: usize) -> Self {
        Self {
            n_items,
            knowledge: KnowledgeTable::new(n_items),
        }
    }

    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// `2^N`, shared by the world and response domains.
    pub fn n_worlds(&self) -> usize {
        1 << self.n_items
    }

    pub fn knowledge(&self) -> &KnowledgeTable {
        &self.knowledge
    }

    pub fn worlds(&self) -> impl Iterator<Item = World> + use<> {
        (0..self.n_worlds() as u32).map(World::from_bits)
    }

    pub fn responses(&self) -> impl Iterator<Item = Response> + use<> {
        (0..self.n_worlds() as u32).map(Response::from_bits)
    }

    pub fn actions(&self) -> std::ops::Range<usize> {
        0..self.n_items
    }

    pub fn response(&self, bits: u32) -> Result<Response, DomainError> {
        let limit = self.n_worlds() as u32;
        if bits >= limit {
            return Err(DomainError::Response {
                bits,
                n_items: self.n_items,
                limit,
            });
        }
        Ok(Response::from_bits(bits))
    }

    pub fn world(&self, bits: u32) -> Result<World, DomainError> {
        let limit = self.n_worlds() as u32;
        if bits >= limit {
            return Err(DomainError::World {
                bits,
                n_items: self.n_items,
                limit,
            });
        }
        Ok(World::from_bits(bits))
    }

    pub fn action(&self, action: usize) -> Result<usize, DomainError> {
        if action >= self.n_items {
            return Err(DomainError::Action {
                action,
                n_items: self.n_items,
            });
        }
        Ok(action)
    }

    pub fn knowledge_id(&self, index: usize) -> Result<KnowledgeId, DomainError> {
        self.knowledge.id(index).ok_or(DomainError::Knowledge {
            index,
            len: self.knowledge.len(),
        })
    }

    /// Configuration behind `id`, refusing keys issued for another item count.
    pub fn knowledge_config(&self, id: KnowledgeId) -> Result<KnowledgeConfig, DomainError> {
        if id.n_items() != self.n_items {
            return Err(DomainError::ForeignKnowledge {
                index: id.index(),
                id_items: id.n_items(),
                n_items: self.n_items,
            });
        }
        self.knowledge.get(id).ok_or(DomainError::Knowledge {
            index: id.index(),
            len: self.knowledge.len(),
        })
    }

    /// Dense slot for per-response tables; out-of-domain responses are rejected.
    pub(crate) fn response_slot(&self, response: Response) -> Result<usize, DomainError> {
        self.response(response.bits()).map(|response| response.bits() as usize)
    }

    /// Dense slot for per-world tables.
    pub(crate) fn world_slot(&self, world: World) -> usize {
        world.bits() as usize
    }
}
