//! Factor selection and tail policy
//!
//! Turns a possibly-gappy empirical factor mapping into a curve that is
//! total over `[1, max_age]`. This is the actuarial judgment injection
//! point: caller overrides win over everything, credible empirical factors
//! come next, gaps are smoothed by geometric decay toward 1.0, and ages
//! beyond the last anchored age take the configured tail factor.
//!
//! Smoothing rule: for an age `a` with no usable factor, anchored on the
//! nearest preceding selected age `a0` with factor `f0`,
//!
//! ```text
//! selected(a) = 1 + (f0 - 1) * decay_rate^(a - a0)
//! ```
//!
//! Ages before the first anchor extend the first anchor's value flat.

use super::estimator::DevelopmentFactors;
use crate::error::ReservingError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Selection and tail policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Tail horizon: the curve covers development ages 1..=max_age
    pub max_age: u32,

    /// Factor applied beyond the last anchored age (1.0 = no further development)
    pub tail_factor: Decimal,

    /// Geometric decay rate toward 1.0 for smoothed ages, in (0, 1)
    pub decay_rate: Decimal,

    /// Minimum empirical sample count for a factor to be selected as-is
    pub min_sample_count: usize,

    /// Explicit per-age factor overrides; take precedence over everything
    pub overrides: BTreeMap<u32, Decimal>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_age: 60,
            tail_factor: Decimal::ONE,
            decay_rate: dec!(0.5),
            min_sample_count: 3,
            overrides: BTreeMap::new(),
        }
    }
}

impl SelectionConfig {
    /// Reject invalid configuration before any computation runs
    pub fn validate(&self) -> Result<(), ReservingError> {
        if self.tail_factor <= Decimal::ZERO {
            return Err(ReservingError::InvalidTailConfig(self.tail_factor));
        }
        if self.decay_rate <= Decimal::ZERO || self.decay_rate >= Decimal::ONE {
            return Err(ReservingError::InvalidDecayRate(self.decay_rate));
        }
        if self.min_sample_count == 0 {
            return Err(ReservingError::InvalidSampleCount);
        }

        let mut prior: Option<(u32, Decimal)> = None;
        for (&age, &factor) in &self.overrides {
            if age < 1 || age > self.max_age {
                return Err(ReservingError::OverrideOutOfRange {
                    age,
                    max_age: self.max_age,
                });
            }
            if factor <= Decimal::ZERO {
                return Err(ReservingError::InvalidOverride { age, factor });
            }
            if let Some((prior_age, prior_factor)) = prior {
                // Overrides must approach 1.0 with age: no perpetual growth
                if (factor - Decimal::ONE).abs() > (prior_factor - Decimal::ONE).abs() {
                    return Err(ReservingError::NonMonotonicOverride {
                        age,
                        factor,
                        prior_age,
                    });
                }
            }
            prior = Some((age, factor));
        }

        Ok(())
    }
}

/// Where a selected factor came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactorSource {
    /// Caller-supplied override
    Override,
    /// Credible empirical volume-weighted factor
    Empirical,
    /// Geometric-decay smoothing over an undefined or sparse age
    Smoothed,
    /// Beyond the last anchored age
    Tail,
}

/// A selected factor and its provenance
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SelectedFactor {
    pub value: Decimal,
    pub source: FactorSource,
}

/// Factor curve total over development ages 1..=max_age
///
/// The factor keyed at age `n` develops cumulative losses from age `n` to
/// `n+1`. Totality is the contract the projector relies on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedFactorCurve {
    max_age: u32,
    factors: BTreeMap<u32, SelectedFactor>,
}

impl SelectedFactorCurve {
    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    pub fn get(&self, age: u32) -> Option<&SelectedFactor> {
        self.factors.get(&age)
    }

    /// Factor value at an age, None outside [1, max_age]
    pub fn factor(&self, age: u32) -> Option<Decimal> {
        self.factors.get(&age).map(|f| f.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &SelectedFactor)> {
        self.factors.iter().map(|(age, f)| (*age, f))
    }
}

/// Select a total factor curve from empirical factors and policy
///
/// Validates the configuration first; selection itself cannot fail.
pub fn select_curve(
    factors: &DevelopmentFactors,
    config: &SelectionConfig,
) -> Result<SelectedFactorCurve, ReservingError> {
    config.validate()?;

    // Anchor ages: overrides and credible empirical factors
    let mut anchors: BTreeMap<u32, Decimal> = BTreeMap::new();
    for (age, dev) in factors.iter() {
        if age > config.max_age {
            continue;
        }
        if let Some(est) = dev.estimate() {
            if est.sample_count >= config.min_sample_count {
                anchors.insert(age, est.volume_weighted);
            }
        }
    }
    // Validation guarantees every override lies in [1, max_age]
    for (&age, &factor) in &config.overrides {
        anchors.insert(age, factor);
    }

    // The tail starts beyond the last age carrying any empirical data
    // (estimated or insufficient) or any anchor; insufficient ages inside
    // that range are smoothed, not tail-filled
    let last_data_age = anchors
        .keys()
        .next_back()
        .copied()
        .max(factors.last_observed_age().map(|a| a.min(config.max_age)));

    let mut selected = BTreeMap::new();
    for age in 1..=config.max_age {
        let entry = if let Some(&factor) = config.overrides.get(&age) {
            SelectedFactor {
                value: factor,
                source: FactorSource::Override,
            }
        } else if let Some(&factor) = anchors.get(&age) {
            SelectedFactor {
                value: factor,
                source: FactorSource::Empirical,
            }
        } else if last_data_age.map_or(true, |last| age > last) {
            SelectedFactor {
                value: config.tail_factor,
                source: FactorSource::Tail,
            }
        } else {
            SelectedFactor {
                value: smoothed_value(&anchors, age, config.decay_rate),
                source: FactorSource::Smoothed,
            }
        };
        selected.insert(age, entry);
    }

    Ok(SelectedFactorCurve {
        max_age: config.max_age,
        factors: selected,
    })
}

/// Geometric decay toward 1.0 from the nearest preceding anchor
fn smoothed_value(anchors: &BTreeMap<u32, Decimal>, age: u32, decay_rate: Decimal) -> Decimal {
    if let Some((&anchor_age, &anchor)) = anchors.range(..age).next_back() {
        let mut decay = Decimal::ONE;
        for _ in 0..(age - anchor_age) {
            decay *= decay_rate;
        }
        (Decimal::ONE + (anchor - Decimal::ONE) * decay).round_dp(6)
    } else {
        // No preceding anchor: extend the first anchor flat, or 1.0 when
        // no age anchored at all (pure decay limit)
        anchors.values().next().copied().unwrap_or(Decimal::ONE)
    }
}
