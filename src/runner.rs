//! Valuation runner wiring the four pipeline stages
//!
//! Builder -> Estimator -> Selection -> Projector, with the intermediate
//! triangle, factors, and curve exposed on the report for audit and
//! diagnostic consumption. Stages run strictly in order: the estimator
//! needs the complete triangle and the selection needs the complete factor
//! set. Each run is an independent snapshot; nothing is shared between runs.

use crate::claims::{Basis, ClaimTransaction};
use crate::config::ValuationConfig;
use crate::error::ReservingError;
use crate::factors::{estimate_factors, select_curve, DevelopmentFactors, SelectedFactorCurve};
use crate::projection::{project_all, ProjectionResult, ProjectionSummary, SkippedOrigin};
use crate::triangle::{build_triangle, Triangle};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Complete output of one valuation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationReport {
    /// Snapshot date the claims extract was taken at
    pub valuation_date: NaiveDate,

    /// Aggregation basis
    pub basis: Basis,

    /// The cumulative triangle the run was built on (audit)
    pub triangle: Triangle,

    /// Empirical factors with insufficient-data markers (audit)
    pub factors: DevelopmentFactors,

    /// The selected curve the projector consumed (audit)
    pub curve: SelectedFactorCurve,

    /// One projection per origin period, ascending
    pub projections: Vec<ProjectionResult>,

    /// Origin periods aborted by internal invariant violations
    pub skipped: Vec<SkippedOrigin>,

    /// Totals across all projected origin periods
    pub summary: ProjectionSummary,
}

/// Runs valuations against a validated configuration
///
/// Construction validates the configuration once; `run` can then be called
/// for any number of claim snapshots.
#[derive(Debug, Clone)]
pub struct ValuationRunner {
    config: ValuationConfig,
}

impl ValuationRunner {
    /// Create a runner, rejecting invalid configuration up front
    pub fn new(config: ValuationConfig) -> Result<Self, ReservingError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Run the full pipeline over one transaction snapshot
    pub fn run(
        &self,
        transactions: &[ClaimTransaction],
        valuation_date: NaiveDate,
    ) -> ValuationReport {
        let triangle = build_triangle(transactions, self.config.basis, &self.config.segment);
        log::info!(
            "Built {} triangle: {} origin periods, max observed age {:?}",
            self.config.basis,
            triangle.origin_count(),
            triangle.max_observed_age()
        );
        if let Some((origin, age)) = triangle.monotonicity_violation() {
            log::warn!(
                "Triangle not monotone at origin {} age {} (reversals exceed development)",
                origin,
                age
            );
        }

        let factors = estimate_factors(&triangle, &self.config.estimator);
        let insufficient = factors.insufficient_ages();
        if !insufficient.is_empty() {
            log::info!("Ages with insufficient data: {:?}", insufficient);
        }

        // Config was validated at construction, so selection cannot fail
        let curve = select_curve(&factors, &self.config.selection)
            .expect("selection config validated at construction");

        let (projections, skipped) = project_all(&triangle, &curve);
        let summary = ProjectionSummary::from_results(&projections, &skipped);

        ValuationReport {
            valuation_date,
            basis: self.config.basis,
            triangle,
            factors,
            curve,
            projections,
            skipped,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// A well-populated paid triangle: five origins, factor pattern
    /// 1.5 / 1.2 / 1.05 with newer origins observed at earlier ages
    fn sample_transactions() -> Vec<ClaimTransaction> {
        let pattern = [dec!(10000), dec!(15000), dec!(18000), dec!(18900)];
        let mut txns = Vec::new();
        for (i, origin) in (2020..2025).enumerate() {
            let observed = pattern.len().saturating_sub(i.saturating_sub(1));
            let mut prior = Decimal::ZERO;
            for (age0, &cumulative) in pattern.iter().take(observed.max(1)).enumerate() {
                txns.push(ClaimTransaction::new(
                    origin,
                    age0 as u32 + 1,
                    cumulative - prior,
                    Basis::Paid,
                ));
                prior = cumulative;
            }
        }
        txns
    }

    #[test]
    fn test_end_to_end_pipeline() {
        let mut config = ValuationConfig::default();
        config.estimator.min_sample_count = 2;
        config.selection.min_sample_count = 2;
        config.selection.max_age = 6;

        let runner = ValuationRunner::new(config).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let report = runner.run(&sample_transactions(), date);

        assert_eq!(report.basis, Basis::Paid);
        assert_eq!(report.projections.len(), 5);
        assert!(report.skipped.is_empty());
        assert_eq!(report.summary.origin_count, 5);

        // Fully developed origins carry no reserve beyond the tail
        let oldest = &report.projections[0];
        assert_eq!(oldest.origin_period, 2020);
        assert_eq!(oldest.reserve, dec!(0.00));

        // The newest origin develops through the whole empirical curve:
        // 10000 * 1.5 * 1.2 * 1.05 = 18900
        let newest = report.projections.last().unwrap();
        assert_eq!(newest.origin_period, 2024);
        assert_eq!(newest.latest_age, 1);
        assert_eq!(newest.ultimate_estimate, dec!(18900.00));
        assert_eq!(newest.reserve, dec!(8900.00));

        // Intermediates are exposed for audit
        assert_eq!(report.triangle.origin_count(), 5);
        assert!(report.factors.estimated(1).is_some());
        assert_eq!(report.curve.max_age(), 6);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let mut config = ValuationConfig::default();
        config.selection.tail_factor = Decimal::ZERO;
        assert!(ValuationRunner::new(config).is_err());
    }

    #[test]
    fn test_run_is_deterministic() {
        let mut config = ValuationConfig::default();
        config.estimator.min_sample_count = 2;
        config.selection.min_sample_count = 2;
        let runner = ValuationRunner::new(config).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let txns = sample_transactions();

        let a = runner.run(&txns, date);
        let b = runner.run(&txns, date);

        assert_eq!(a.projections.len(), b.projections.len());
        for (x, y) in a.projections.iter().zip(&b.projections) {
            assert_eq!(x.origin_period, y.origin_period);
            assert_eq!(x.ultimate_estimate, y.ultimate_estimate);
            assert_eq!(x.reserve, y.reserve);
        }
        assert_eq!(a.summary.total_reserve, b.summary.total_reserve);
    }
}
