//! Dense enumeration of the respondent's possible knowledge states.

use core::fmt;
use serde::Serialize;

/// How many items the respondent is confident about in each direction.
///
/// Items `0..n_cont` are believed contaminated, the next `n_uncont` are believed clean and
/// the remainder are unknown. The assignment is positional by bit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct KnowledgeConfig {
    pub n_cont: usize,
    pub n_uncont: usize,
}

impl KnowledgeConfig {
    pub const fn new(n_cont: usize, n_uncont: usize) -> Self {
        Self { n_cont, n_uncont }
    }

    /// Items left unknown; zero when the pair already covers more than `n_items`.
    pub const fn n_unknown(self, n_items: usize) -> usize {
        n_items.saturating_sub(self.n_cont + self.n_uncont)
    }

    /// Renders as `(n_cont, n_uncont, n_unknown)`.
    pub fn label(self, n_items: usize) -> String {
        format!(
            "({}, {}, {})",
            self.n_cont,
            self.n_uncont,
            self.n_unknown(n_items)
        )
    }
}

/// Opaque key addressing one entry of a [`KnowledgeTable`].
///
/// The key remembers the item count of the table that issued it, so a table for a
/// different item count refuses it instead of reading an unrelated entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KnowledgeId {
    index: usize,
    n_items: usize,
}

impl KnowledgeId {
    pub const fn index(self) -> usize {
        self.index
    }

    /// Item count of the issuing table.
    pub const fn n_items(self) -> usize {
        self.n_items
    }
}

impl fmt::Display for KnowledgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k{}", self.index)
    }
}

/// Bijection between dense indices and `(n_cont, n_uncont)` pairs.
///
/// Entries are listed by increasing `n_cont`, then increasing `n_uncont`, giving
/// `(N + 1)(N + 2) / 2` configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeTable {
    n_items: usize,
    configs: Vec<KnowledgeConfig>,
}

impl KnowledgeTable {
    pub fn new(n_items: usize) -> Self {
        let configs = (0..=n_items)
            .flat_map(|n_cont| {
                (0..=n_items - n_cont).map(move |n_uncont| KnowledgeConfig::new(n_cont, n_uncont))
            })
            .collect();
        Self { n_items, configs }
    }

    pub const fn expected_len(n_items: usize) -> usize {
        (n_items + 1) * (n_items + 2) / 2
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Resolves a raw index; `None` when it falls outside the table.
    pub fn id(&self, index: usize) -> Option<KnowledgeId> {
        (index < self.configs.len()).then_some(self.key(index))
    }

    /// Reverse lookup of a structured pair.
    pub fn find(&self, config: KnowledgeConfig) -> Option<KnowledgeId> {
        self.configs
            .iter()
            .position(|candidate| *candidate == config)
            .map(|index| self.key(index))
    }

    /// Entry for `id`; `None` when `id` was issued by a table for another item count.
    pub fn get(&self, id: KnowledgeId) -> Option<KnowledgeConfig> {
        if id.n_items != self.n_items {
            return None;
        }
        self.configs.get(id.index).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = KnowledgeId> + use<> {
        let n_items = self.n_items;
        (0..self.configs.len()).map(move |index| KnowledgeId { index, n_items })
    }

    fn key(&self, index: usize) -> KnowledgeId {
        KnowledgeId {
            index,
            n_items: self.n_items,
        }
    }
}
