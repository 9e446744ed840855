//! The three reasoning layers, each a memoized table on [`crate::Model`].
//!
//! - `listener`: L0, Bayesian update over worlds given a literal answer.
//! - `respondent`: R0, answer choice by a partially informed speaker.
//! - `questioner`: Q1, question choice by a goal-directed asker.

mod listener;
mod questioner;
mod respondent;

pub use listener::literal_posterior;
pub use questioner::knowledge_prior;
