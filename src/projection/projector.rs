//! Chain-ladder projection of ultimate losses and IBNR reserves
//!
//! Each origin period develops independently: take its latest observed
//! cumulative value, multiply through the selected factors from that age to
//! the tail horizon, and the difference to the latest value is the reserve.
//! Origin periods are projected in parallel; one bad period never poisons
//! the rest of the batch.

use super::results::{ProjectionResult, SkippedOrigin};
use crate::error::ReservingError;
use crate::factors::SelectedFactorCurve;
use crate::triangle::Triangle;
use rayon::prelude::*;
use rust_decimal::Decimal;

/// Project one origin period through the selected curve
///
/// Ultimate = latest value x product of selected_factor[a] for
/// a in latest_age..max_age, where the factor at age `a` develops `a -> a+1`.
/// An origin already observed at or past the tail horizon has an empty
/// product and its ultimate equals its latest value.
///
/// Returns None when the origin period has no cells at all. A gap in the
/// curve is a `MissingFactor` defect: the curve's total-function contract
/// was not honored.
pub fn project_origin(
    triangle: &Triangle,
    curve: &SelectedFactorCurve,
    origin_period: i32,
) -> Option<Result<ProjectionResult, ReservingError>> {
    let (latest_age, latest_value) = triangle.latest(origin_period)?;

    let mut ultimate = latest_value;
    for age in latest_age..curve.max_age() {
        let factor = match curve.factor(age) {
            Some(f) => f,
            None => {
                return Some(Err(ReservingError::MissingFactor {
                    origin_period,
                    age,
                }))
            }
        };
        ultimate *= factor;
    }

    let ultimate_estimate = ultimate.round_dp(2);
    let reserve = ultimate_estimate - latest_value;
    let negative_reserve = reserve < Decimal::ZERO;
    if negative_reserve {
        log::warn!(
            "Origin period {} projects a negative reserve of {} (latest {} at age {})",
            origin_period,
            reserve,
            latest_value,
            latest_age
        );
    }

    Some(Ok(ProjectionResult {
        origin_period,
        latest_age,
        latest_value,
        ultimate_estimate,
        reserve,
        negative_reserve,
    }))
}

/// Project every origin period in the triangle, in parallel
///
/// Origins that hit an internal invariant violation are reported in the
/// skipped list while the rest still project.
pub fn project_all(
    triangle: &Triangle,
    curve: &SelectedFactorCurve,
) -> (Vec<ProjectionResult>, Vec<SkippedOrigin>) {
    let origins: Vec<i32> = triangle.origin_periods().collect();

    let outcomes: Vec<_> = origins
        .par_iter()
        .filter_map(|&origin| {
            project_origin(triangle, curve, origin).map(|outcome| (origin, outcome))
        })
        .collect();

    let mut results = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();
    for (origin_period, outcome) in outcomes {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                log::error!("Skipping origin period {}: {}", origin_period, e);
                skipped.push(SkippedOrigin {
                    origin_period,
                    reason: e.to_string(),
                });
            }
        }
    }

    (results, skipped)
}
