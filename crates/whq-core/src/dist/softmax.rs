use super::{DistError, Distribution};

/// Softmax decision rule: `P(v) ∝ base^(alpha * utility(v))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Softmax {
    pub alpha: f64,
    pub base: f64,
}

impl Softmax {
    /// Softmax with base `e`.
    pub const fn natural(alpha: f64) -> Self {
        Self {
            alpha,
            base: std::f64::consts::E,
        }
    }

    /// Chooses among `candidates` with weight `base^(alpha * utility)`.
    ///
    /// Utilities are shifted by their maximum before exponentiation. A utility of
    /// `-inf` yields zero weight; `NaN` or `+inf` is rejected.
    pub fn choose<T, I, F, E>(&self, candidates: I, mut utility: F) -> Result<Distribution<T>, E>
    where
        T: Copy + Ord,
        I: IntoIterator<Item = T>,
        F: FnMut(T) -> Result<f64, E>,
        E: From<DistError>,
    {
        let scored = candidates
            .into_iter()
            .map(|value| utility(value).map(|u| (value, u)))
            .collect::<Result<Vec<_>, E>>()?;

        if scored.iter().any(|(_, u)| u.is_nan() || *u == f64::INFINITY) {
            return Err(DistError::DegenerateUtility.into());
        }
        let max = scored
            .iter()
            .map(|(_, u)| *u)
            .fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(DistError::DegenerateUtility.into());
        }

        let rate = self.alpha * self.base.ln();
        let weighted = scored.into_iter().map(|(value, u)| {
            let w = if u == f64::NEG_INFINITY {
                0.0
            } else {
                (rate * (u - max)).exp()
            };
            (value, w)
        });
        Ok(Distribution::from_weights(weighted)?)
    }
}
