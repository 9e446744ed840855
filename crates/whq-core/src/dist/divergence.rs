use super::Distribution;
use serde::{Deserialize, Serialize};
use std::f64::consts::LN_2;

/// Logarithm base used when reporting divergences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceUnit {
    #[default]
    Bits,
    Nats,
}

impl DivergenceUnit {
    fn scale(self) -> f64 {
        match self {
            DivergenceUnit::Bits => 1.0 / LN_2,
            DivergenceUnit::Nats => 1.0,
        }
    }
}

/// `KL(p ‖ q) = Σ p(v) log(p(v) / q(v))` over the support of `p`.
///
/// Returns `f64::INFINITY` when `q` assigns zero mass to a value `p` supports.
pub fn kl_divergence<T: Copy + Ord>(
    p: &Distribution<T>,
    q: &Distribution<T>,
    unit: DivergenceUnit,
) -> f64 {
    let mut total = 0.0;
    for (value, p_v) in p.iter() {
        let q_v = q.prob(value);
        if q_v <= 0.0 {
            return f64::INFINITY;
        }
        total += p_v * (p_v / q_v).ln();
    }
    total * unit.scale()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divergence_of_identical_tables_is_zero() {
        let p = Distribution::choose(0u8..3, |v| f64::from(v) + 1.0).expect("support");
        assert!(kl_divergence(&p, &p, DivergenceUnit::Nats).abs() < 1e-12);
    }

    #[test]
    fn point_mass_against_uniform_costs_log_domain_size() {
        let p = Distribution::point(1u8);
        let q = Distribution::uniform(0u8..4).expect("uniform");
        assert!((kl_divergence(&p, &q, DivergenceUnit::Bits) - 2.0).abs() < 1e-12);
        assert!((kl_divergence(&p, &q, DivergenceUnit::Nats) - 4f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn missing_support_diverges() {
        let p = Distribution::uniform(0u8..2).expect("uniform");
        let q = Distribution::point(0u8);
        assert_eq!(kl_divergence(&p, &q, DivergenceUnit::Bits), f64::INFINITY);
        assert!(kl_divergence(&q, &p, DivergenceUnit::Bits).is_finite());
    }
}
