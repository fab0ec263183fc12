//! Age-to-age development factor estimation with credibility rules
//!
//! For each development age `a`, every origin period holding cumulative
//! values at both `a` and `a+1` contributes the individual factor
//! `v(a+1)/v(a)`. Pairs whose prior value falls below the configured volume
//! threshold are excluded (division near zero is unstable and carries no
//! credibility). Ages left with fewer than the configured minimum number of
//! pairs are marked insufficient rather than estimated: silently
//! substituting an assumption here could corrupt downstream reserves
//! without visibility.

use crate::triangle::Triangle;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Credibility thresholds for factor estimation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Minimum number of credible origin-period pairs per age
    pub min_sample_count: usize,

    /// Minimum prior-period cumulative value for a pair to count
    pub min_prior_value: Decimal,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            min_sample_count: 3,
            min_prior_value: dec!(1000),
        }
    }
}

/// Empirical factor estimate at one development age
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorEstimate {
    /// Volume-weighted average: sum(v(a) * f) / sum(v(a))
    pub volume_weighted: Decimal,

    /// Unweighted mean of individual factors (diagnostic)
    pub simple_average: Decimal,

    /// Median of individual factors (diagnostic)
    pub median: Decimal,

    /// Credible pairs that survived exclusion
    pub sample_count: usize,

    /// Sample standard deviation of individual factors (diagnostic)
    pub std_dev: f64,

    /// Pairs excluded for falling below the volume threshold
    pub excluded_pairs: usize,
}

/// Outcome of estimation at one development age
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgeDevelopment {
    /// Enough credible pairs: factor estimated
    Estimated(FactorEstimate),
    /// Too few credible pairs: explicitly undefined, never defaulted
    Insufficient {
        pairs_observed: usize,
        pairs_credible: usize,
    },
}

impl AgeDevelopment {
    pub fn estimate(&self) -> Option<&FactorEstimate> {
        match self {
            AgeDevelopment::Estimated(e) => Some(e),
            AgeDevelopment::Insufficient { .. } => None,
        }
    }
}

/// Development factors per age, with insufficient-data markers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevelopmentFactors {
    by_age: BTreeMap<u32, AgeDevelopment>,
}

impl DevelopmentFactors {
    pub fn get(&self, age: u32) -> Option<&AgeDevelopment> {
        self.by_age.get(&age)
    }

    /// Estimated factor at an age, None where absent or insufficient
    pub fn estimated(&self, age: u32) -> Option<&FactorEstimate> {
        self.by_age.get(&age).and_then(AgeDevelopment::estimate)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &AgeDevelopment)> {
        self.by_age.iter().map(|(age, dev)| (*age, dev))
    }

    pub fn is_empty(&self) -> bool {
        self.by_age.is_empty()
    }

    /// Greatest age with any empirical data, estimated or insufficient
    pub fn last_observed_age(&self) -> Option<u32> {
        self.by_age.keys().next_back().copied()
    }

    /// Ages marked insufficient, ascending
    pub fn insufficient_ages(&self) -> Vec<u32> {
        self.by_age
            .iter()
            .filter(|(_, dev)| matches!(dev, AgeDevelopment::Insufficient { .. }))
            .map(|(age, _)| *age)
            .collect()
    }
}

/// Estimate age-to-age factors from a cumulative triangle
///
/// Every age with at least one observed pair appears in the result, either
/// estimated or marked insufficient. An insufficient age never stops the
/// estimator from computing the other ages.
pub fn estimate_factors(triangle: &Triangle, config: &EstimatorConfig) -> DevelopmentFactors {
    let mut by_age = BTreeMap::new();

    let max_age = match triangle.max_observed_age() {
        Some(age) if age >= 1 => age,
        _ => return DevelopmentFactors { by_age },
    };

    for age in 1..max_age {
        let mut factors: Vec<Decimal> = Vec::new();
        let mut sum_prior = Decimal::ZERO;
        let mut sum_next = Decimal::ZERO;
        let mut pairs_observed = 0usize;
        let mut excluded = 0usize;

        for origin in triangle.origin_periods().collect::<Vec<_>>() {
            let (prior, next) = match (triangle.value(origin, age), triangle.value(origin, age + 1))
            {
                (Some(p), Some(n)) => (p, n),
                _ => continue,
            };
            pairs_observed += 1;

            // Low-credibility exclusion: also guards the division itself
            if prior < config.min_prior_value || prior <= Decimal::ZERO {
                excluded += 1;
                continue;
            }

            factors.push(next / prior);
            sum_prior += prior;
            sum_next += next;
        }

        if pairs_observed == 0 {
            continue;
        }

        if factors.len() < config.min_sample_count {
            log::debug!(
                "Age {}: {} credible pairs of {} observed, below minimum {}",
                age,
                factors.len(),
                pairs_observed,
                config.min_sample_count
            );
            by_age.insert(
                age,
                AgeDevelopment::Insufficient {
                    pairs_observed,
                    pairs_credible: factors.len(),
                },
            );
            continue;
        }

        let sample_count = factors.len();
        let volume_weighted = (sum_next / sum_prior).round_dp(6);
        let simple_average =
            (factors.iter().sum::<Decimal>() / Decimal::from(sample_count as u64)).round_dp(6);
        let median = median(&mut factors).round_dp(6);
        let std_dev = sample_std_dev(&factors);

        by_age.insert(
            age,
            AgeDevelopment::Estimated(FactorEstimate {
                volume_weighted,
                simple_average,
                median,
                sample_count,
                std_dev,
                excluded_pairs: excluded,
            }),
        );
    }

    DevelopmentFactors { by_age }
}

fn median(factors: &mut [Decimal]) -> Decimal {
    factors.sort();
    let n = factors.len();
    if n % 2 == 1 {
        factors[n / 2]
    } else {
        (factors[n / 2 - 1] + factors[n / 2]) / Decimal::TWO
    }
}

fn sample_std_dev(factors: &[Decimal]) -> f64 {
    if factors.len() < 2 {
        return 0.0;
    }
    let values: Vec<f64> = factors.iter().map(|f| f.to_f64().unwrap_or(0.0)).collect();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}
