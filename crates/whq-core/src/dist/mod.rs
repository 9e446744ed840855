//! Finite probability tables over enumerable domains.
//!
//! This module is composed of:
//! - `Distribution`: a normalized table with conditioning, expectation and composition.
//! - `divergence`: KL divergence between two tables.
//! - `softmax`: the `exp(alpha * utility)` decision rule used by every agent.
//! - [`imagine`]: evaluates a nested hypothetical model and keeps only its result.

mod divergence;
mod softmax;

pub use divergence::{DivergenceUnit, kl_divergence};
pub use softmax::Softmax;

use std::collections::BTreeMap;
use thiserror::Error;

/// Failures raised while building or combining distributions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistError {
    #[error("distribution has no support (all weights are zero)")]
    EmptySupport,
    #[error("weight {weight} is negative or not finite")]
    InvalidWeight { weight: f64 },
    #[error("softmax utilities are degenerate (no finite maximum)")]
    DegenerateUtility,
}

/// Normalized probability table over a finite domain.
///
/// Entries are kept sorted by value and only strictly positive masses are stored, so the
/// entry list is exactly the support.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution<T> {
    entries: Vec<(T, f64)>,
}

impl<T: Copy + Ord> Distribution<T> {
    /// Builds a distribution proportional to `weight(v)` for every `v` in `domain`.
    ///
    /// Repeated domain values accumulate their weights.
    pub fn choose<I, F>(domain: I, mut weight: F) -> Result<Self, DistError>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(T) -> f64,
    {
        Self::try_choose(domain, |value| Ok::<_, DistError>(weight(value)))
    }

    /// Fallible variant of [`Distribution::choose`]; errors from `weight` propagate as-is.
    pub fn try_choose<I, F, E>(domain: I, mut weight: F) -> Result<Self, E>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(T) -> Result<f64, E>,
        E: From<DistError>,
    {
        let pairs = domain
            .into_iter()
            .map(|value| weight(value).map(|w| (value, w)))
            .collect::<Result<Vec<_>, E>>()?;
        Ok(Self::from_weights(pairs)?)
    }

    /// Builds a distribution from explicit `(value, weight)` pairs.
    pub fn from_weights<I>(pairs: I) -> Result<Self, DistError>
    where
        I: IntoIterator<Item = (T, f64)>,
    {
        let mut table = BTreeMap::new();
        for (value, w) in pairs {
            if !w.is_finite() || w < 0.0 {
                return Err(DistError::InvalidWeight { weight: w });
            }
            *table.entry(value).or_insert(0.0) += w;
        }
        Self::normalize(table)
    }

    /// Uniform distribution over the (deduplicated) domain.
    pub fn uniform<I>(domain: I) -> Result<Self, DistError>
    where
        I: IntoIterator<Item = T>,
    {
        Self::choose(domain, |_| 1.0)
    }

    /// Distribution placing all mass on `value`.
    pub fn point(value: T) -> Self {
        Self {
            entries: vec![(value, 1.0)],
        }
    }

    fn normalize(table: BTreeMap<T, f64>) -> Result<Self, DistError> {
        let total: f64 = table.values().sum();
        if !(total > 0.0) || !total.is_finite() {
            return Err(DistError::EmptySupport);
        }
        let entries = table
            .into_iter()
            .filter(|(_, w)| *w > 0.0)
            .map(|(value, w)| (value, w / total))
            .collect();
        Ok(Self { entries })
    }

    /// Restricts the support to values where `pred` holds and renormalizes.
    pub fn condition<P>(&self, mut pred: P) -> Result<Self, DistError>
    where
        P: FnMut(T) -> bool,
    {
        let table = self
            .entries
            .iter()
            .filter(|(value, _)| pred(*value))
            .map(|&(value, p)| (value, p))
            .collect();
        Self::normalize(table)
    }

    /// Probability mass assigned to `value` (zero outside the support).
    pub fn prob(&self, value: T) -> f64 {
        self.entries
            .binary_search_by(|(v, _)| v.cmp(&value))
            .map(|idx| self.entries[idx].1)
            .unwrap_or(0.0)
    }

    /// Total mass of the values matching `event`.
    pub fn probability<P>(&self, mut event: P) -> f64
    where
        P: FnMut(T) -> bool,
    {
        self.entries
            .iter()
            .filter(|(value, _)| event(*value))
            .map(|(_, p)| p)
            .sum()
    }

    /// `Σ p(v) * f(v)` over the support.
    pub fn expectation<F>(&self, mut f: F) -> f64
    where
        F: FnMut(T) -> f64,
    {
        self.entries.iter().map(|&(value, p)| p * f(value)).sum()
    }

    /// Composes `self` with a conditional distribution and marginalizes out `T`.
    pub fn try_bind<U, F, E>(&self, mut kernel: F) -> Result<Distribution<U>, E>
    where
        U: Copy + Ord,
        F: FnMut(T) -> Result<Distribution<U>, E>,
        E: From<DistError>,
    {
        let mut table = BTreeMap::new();
        for &(value, p) in &self.entries {
            accumulate(&mut table, p, &kernel(value)?);
        }
        Ok(Distribution::normalize(table)?)
    }

    /// [`Distribution::try_bind`] for kernels that lend tables they already hold.
    pub fn try_bind_ref<'a, U, F, E>(&self, mut kernel: F) -> Result<Distribution<U>, E>
    where
        U: Copy + Ord + 'a,
        F: FnMut(T) -> Result<&'a Distribution<U>, E>,
        E: From<DistError>,
    {
        let mut table = BTreeMap::new();
        for &(value, p) in &self.entries {
            accumulate(&mut table, p, kernel(value)?);
        }
        Ok(Distribution::normalize(table)?)
    }

    /// Pushes the distribution through `f`, merging values that collide.
    pub fn map<U, F>(&self, mut f: F) -> Distribution<U>
    where
        U: Copy + Ord,
        F: FnMut(T) -> U,
    {
        let mut table = BTreeMap::new();
        for &(value, p) in &self.entries {
            *table.entry(f(value)).or_insert(0.0) += p;
        }
        Distribution {
            entries: table.into_iter().collect(),
        }
    }

    /// Most probable value; ties resolve to the smallest value.
    pub fn mode(&self) -> Option<(T, f64)> {
        self.entries
            .iter()
            .copied()
            .fold(None, |best: Option<(T, f64)>, (value, p)| match best {
                Some((_, best_p)) if best_p >= p => best,
                _ => Some((value, p)),
            })
    }
}

impl<T: Copy> Distribution<T> {
    pub fn iter(&self) -> impl Iterator<Item = (T, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn support(&self) -> impl Iterator<Item = T> + '_ {
        self.entries.iter().map(|(value, _)| *value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn accumulate<U>(table: &mut BTreeMap<U, f64>, weight: f64, inner: &Distribution<U>)
where
    U: Copy + Ord,
{
    for (next, q) in inner.iter() {
        *table.entry(next).or_insert(0.0) += weight * q;
    }
}

/// Evaluates a hypothetical model built by `build` and returns only `eval`'s result.
///
/// The scenario may be a fresh table or one borrowed from a cache. Either way it is
/// released before returning, so none of its random choices leak into the caller's table.
pub fn imagine<D, R, E, B, V>(build: B, eval: V) -> Result<R, E>
where
    B: FnOnce() -> Result<D, E>,
    V: FnOnce(&D) -> R,
{
    let scenario = build()?;
    Ok(eval(&scenario))
}
