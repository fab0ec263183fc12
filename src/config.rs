//! Valuation run configuration
//!
//! Everything has a default and everything is overridable by the caller.
//! Configuration errors are rejected here, before any computation runs.

use crate::claims::{Basis, SegmentFilter, ValidationMode};
use crate::error::ReservingError;
use crate::factors::{EstimatorConfig, SelectionConfig};
use serde::{Deserialize, Serialize};

/// Full configuration surface for one valuation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationConfig {
    /// Aggregation basis for the triangle
    pub basis: Basis,

    /// Optional line of business / geography restriction
    #[serde(default)]
    pub segment: SegmentFilter,

    /// Credibility thresholds for factor estimation
    #[serde(default)]
    pub estimator: EstimatorConfig,

    /// Selection and tail policy
    #[serde(default)]
    pub selection: SelectionConfig,

    /// How the loader treats malformed claim records
    #[serde(skip, default)]
    pub validation_mode: ValidationMode,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            basis: Basis::Paid,
            segment: SegmentFilter::default(),
            estimator: EstimatorConfig::default(),
            selection: SelectionConfig::default(),
            validation_mode: ValidationMode::default(),
        }
    }
}

impl ValuationConfig {
    pub fn for_basis(basis: Basis) -> Self {
        Self {
            basis,
            ..Default::default()
        }
    }

    /// Validate the whole configuration surface up front
    pub fn validate(&self) -> Result<(), ReservingError> {
        if self.estimator.min_sample_count == 0 {
            return Err(ReservingError::InvalidSampleCount);
        }
        self.selection.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_are_valid() {
        let config = ValuationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.basis, Basis::Paid);
        assert_eq!(config.estimator.min_sample_count, 3);
        assert_eq!(config.estimator.min_prior_value, dec!(1000));
        assert_eq!(config.selection.max_age, 60);
        assert_eq!(config.selection.tail_factor, dec!(1.0));
    }

    #[test]
    fn test_bad_selection_config_caught_at_validation() {
        let mut config = ValuationConfig::for_basis(Basis::Incurred);
        config.selection.tail_factor = dec!(-1.0);
        assert!(matches!(
            config.validate(),
            Err(ReservingError::InvalidTailConfig(_))
        ));
    }

    #[test]
    fn test_zero_estimator_sample_count_rejected() {
        let mut config = ValuationConfig::default();
        config.estimator.min_sample_count = 0;
        assert!(matches!(
            config.validate(),
            Err(ReservingError::InvalidSampleCount)
        ));
    }
}
