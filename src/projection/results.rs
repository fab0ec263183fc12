//! Projection output structures

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Chain-ladder projection for one origin period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Origin period (accident year)
    pub origin_period: i32,

    /// Latest observed development age
    pub latest_age: u32,

    /// Cumulative value at the latest observed age
    pub latest_value: Decimal,

    /// Projected ultimate loss: latest value developed through the tail
    pub ultimate_estimate: Decimal,

    /// IBNR reserve: ultimate minus latest value
    pub reserve: Decimal,

    /// A negative reserve is a legitimate output of the math; it is
    /// flagged for downstream review, never clamped to zero
    pub negative_reserve: bool,
}

/// An origin period whose projection was aborted by an invariant violation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedOrigin {
    pub origin_period: i32,
    pub reason: String,
}

/// Totals across all projected origin periods
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub origin_count: usize,
    pub total_latest: Decimal,
    pub total_ultimate: Decimal,
    pub total_reserve: Decimal,
    pub negative_reserve_count: usize,
    pub skipped_count: usize,
}

impl ProjectionSummary {
    /// Aggregate per-origin results and skip records
    pub fn from_results(results: &[ProjectionResult], skipped: &[SkippedOrigin]) -> Self {
        let mut summary = ProjectionSummary {
            origin_count: results.len(),
            skipped_count: skipped.len(),
            ..Default::default()
        };
        for r in results {
            summary.total_latest += r.latest_value;
            summary.total_ultimate += r.ultimate_estimate;
            summary.total_reserve += r.reserve;
            if r.negative_reserve {
                summary.negative_reserve_count += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_summary_totals() {
        let results = vec![
            ProjectionResult {
                origin_period: 2020,
                latest_age: 3,
                latest_value: dec!(160.00),
                ultimate_estimate: dec!(160.00),
                reserve: dec!(0.00),
                negative_reserve: false,
            },
            ProjectionResult {
                origin_period: 2021,
                latest_age: 2,
                latest_value: dec!(145.00),
                ultimate_estimate: dec!(159.50),
                reserve: dec!(14.50),
                negative_reserve: false,
            },
        ];

        let summary = ProjectionSummary::from_results(&results, &[]);
        assert_eq!(summary.origin_count, 2);
        assert_eq!(summary.total_latest, dec!(305.00));
        assert_eq!(summary.total_ultimate, dec!(319.50));
        assert_eq!(summary.total_reserve, dec!(14.50));
        assert_eq!(summary.negative_reserve_count, 0);
    }
}
