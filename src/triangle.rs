//! Loss triangle construction from claim transactions
//!
//! A triangle maps (origin period, development age) to a cumulative monetary
//! total on a single basis. Cells with no transactions are absent, not zero,
//! so "no data" stays distinguishable from "zero loss". Triangles are built
//! once per analysis run and immutable afterwards.

use crate::claims::{Basis, ClaimTransaction, SegmentFilter};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cumulative loss triangle on a single basis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triangle {
    basis: Basis,
    /// Cumulative value per development age, per origin period
    cells: BTreeMap<i32, BTreeMap<u32, Decimal>>,
}

impl Triangle {
    /// Aggregation basis this triangle was built on
    pub fn basis(&self) -> Basis {
        self.basis
    }

    /// Cumulative value at a cell, or None where no transactions landed
    pub fn value(&self, origin_period: i32, development_age: u32) -> Option<Decimal> {
        self.cells.get(&origin_period)?.get(&development_age).copied()
    }

    /// Origin periods present, ascending
    pub fn origin_periods(&self) -> impl Iterator<Item = i32> + '_ {
        self.cells.keys().copied()
    }

    /// Development ages present for one origin period, ascending
    pub fn ages(&self, origin_period: i32) -> impl Iterator<Item = u32> + '_ {
        self.cells
            .get(&origin_period)
            .into_iter()
            .flat_map(|row| row.keys().copied())
    }

    /// Latest observed (development age, cumulative value) for an origin period
    pub fn latest(&self, origin_period: i32) -> Option<(u32, Decimal)> {
        self.cells
            .get(&origin_period)?
            .iter()
            .next_back()
            .map(|(age, value)| (*age, *value))
    }

    /// Greatest development age observed anywhere in the triangle
    pub fn max_observed_age(&self) -> Option<u32> {
        self.cells
            .values()
            .filter_map(|row| row.keys().next_back().copied())
            .max()
    }

    /// Number of origin periods
    pub fn origin_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Check the cumulative invariant: values non-decreasing in age per origin
    ///
    /// Holds whenever all underlying transaction amounts are non-negative.
    /// Returns the first violating (origin, age) if any.
    pub fn monotonicity_violation(&self) -> Option<(i32, u32)> {
        for (origin, row) in &self.cells {
            let mut prior: Option<Decimal> = None;
            for (age, value) in row {
                if let Some(p) = prior {
                    if *value < p {
                        return Some((*origin, *age));
                    }
                }
                prior = Some(*value);
            }
        }
        None
    }

    /// Iterate (origin period, age, cumulative value) over all cells
    pub fn iter(&self) -> impl Iterator<Item = (i32, u32, Decimal)> + '_ {
        self.cells.iter().flat_map(|(origin, row)| {
            row.iter().map(move |(age, value)| (*origin, *age, *value))
        })
    }
}

/// Builds a cumulative [`Triangle`] from additive claim transactions
///
/// Incremental amounts accumulate into cells first; `build()` then
/// prefix-sums each origin's cells in age order to produce cumulative
/// values. Transactions on the other basis, or outside the segment filter,
/// are ignored.
#[derive(Debug, Clone)]
pub struct TriangleBuilder {
    basis: Basis,
    segment: SegmentFilter,
    incremental: BTreeMap<i32, BTreeMap<u32, Decimal>>,
}

impl TriangleBuilder {
    pub fn new(basis: Basis) -> Self {
        Self {
            basis,
            segment: SegmentFilter::default(),
            incremental: BTreeMap::new(),
        }
    }

    /// Restrict aggregation to one line of business / geography segment
    pub fn with_segment(mut self, segment: SegmentFilter) -> Self {
        self.segment = segment;
        self
    }

    /// Accumulate a single transaction
    pub fn add(&mut self, txn: &ClaimTransaction) {
        if txn.basis != self.basis || !self.segment.matches(txn) {
            return;
        }
        let cell = self
            .incremental
            .entry(txn.origin_period)
            .or_default()
            .entry(txn.development_age)
            .or_insert(Decimal::ZERO);
        *cell += txn.amount;
    }

    /// Accumulate a sequence of transactions
    pub fn add_all<'a, I: IntoIterator<Item = &'a ClaimTransaction>>(&mut self, txns: I) {
        for txn in txns {
            self.add(txn);
        }
    }

    /// Finish: convert incremental cells to cumulative values
    pub fn build(self) -> Triangle {
        let cells = self
            .incremental
            .into_iter()
            .map(|(origin, row)| {
                let mut running = Decimal::ZERO;
                let cumulative = row
                    .into_iter()
                    .map(|(age, amount)| {
                        running += amount;
                        (age, running.round_dp(2))
                    })
                    .collect();
                (origin, cumulative)
            })
            .collect();

        Triangle {
            basis: self.basis,
            cells,
        }
    }
}

/// Build a cumulative triangle in one call
pub fn build_triangle(
    transactions: &[ClaimTransaction],
    basis: Basis,
    segment: &SegmentFilter,
) -> Triangle {
    let mut builder = TriangleBuilder::new(basis).with_segment(segment.clone());
    builder.add_all(transactions);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn txn(origin: i32, age: u32, amount: Decimal, basis: Basis) -> ClaimTransaction {
        ClaimTransaction::new(origin, age, amount, basis)
    }

    #[test]
    fn test_incremental_amounts_become_cumulative() {
        let txns = vec![
            txn(2020, 1, dec!(100.00), Basis::Paid),
            txn(2020, 2, dec!(45.00), Basis::Paid),
            txn(2020, 3, dec!(15.00), Basis::Paid),
        ];

        let tri = build_triangle(&txns, Basis::Paid, &SegmentFilter::default());

        assert_eq!(tri.value(2020, 1), Some(dec!(100.00)));
        assert_eq!(tri.value(2020, 2), Some(dec!(145.00)));
        assert_eq!(tri.value(2020, 3), Some(dec!(160.00)));
        assert_eq!(tri.latest(2020), Some((3, dec!(160.00))));
    }

    #[test]
    fn test_other_basis_is_ignored() {
        let txns = vec![
            txn(2020, 1, dec!(100.00), Basis::Paid),
            txn(2020, 1, dec!(500.00), Basis::Incurred),
        ];

        let tri = build_triangle(&txns, Basis::Paid, &SegmentFilter::default());
        assert_eq!(tri.value(2020, 1), Some(dec!(100.00)));
    }

    #[test]
    fn test_same_cell_transactions_accumulate() {
        let txns = vec![
            txn(2021, 1, dec!(60.00), Basis::Paid),
            txn(2021, 1, dec!(40.00), Basis::Paid),
        ];

        let tri = build_triangle(&txns, Basis::Paid, &SegmentFilter::default());
        assert_eq!(tri.value(2021, 1), Some(dec!(100.00)));
    }

    #[test]
    fn test_absent_cells_are_none_not_zero() {
        let txns = vec![
            txn(2020, 1, dec!(100.00), Basis::Paid),
            txn(2020, 3, dec!(20.00), Basis::Paid),
        ];

        let tri = build_triangle(&txns, Basis::Paid, &SegmentFilter::default());

        // Age 2 had no transactions: absent, even though cumulatively it
        // would sit between ages 1 and 3
        assert_eq!(tri.value(2020, 2), None);
        assert_eq!(tri.value(2020, 3), Some(dec!(120.00)));
        assert_eq!(tri.value(2019, 1), None);
    }

    #[test]
    fn test_reversal_reduces_cell() {
        let txns = vec![
            txn(2020, 1, dec!(100.00), Basis::Paid),
            txn(2020, 2, dec!(-30.00), Basis::Paid),
        ];

        let tri = build_triangle(&txns, Basis::Paid, &SegmentFilter::default());
        assert_eq!(tri.value(2020, 2), Some(dec!(70.00)));
        assert_eq!(tri.monotonicity_violation(), Some((2020, 2)));
    }

    #[test]
    fn test_monotone_for_nonnegative_amounts() {
        let txns: Vec<_> = (2020..2024)
            .flat_map(|origin| {
                (1..=4).map(move |age| {
                    txn(origin, age, Decimal::from(100 * age), Basis::Paid)
                })
            })
            .collect();

        let tri = build_triangle(&txns, Basis::Paid, &SegmentFilter::default());
        assert_eq!(tri.monotonicity_violation(), None);
        assert_eq!(tri.origin_count(), 4);
        assert_eq!(tri.max_observed_age(), Some(4));
    }

    #[test]
    fn test_segment_filter_restricts_cells() {
        let mut motor = txn(2020, 1, dec!(100.00), Basis::Paid);
        motor.line_of_business = Some("Motor".to_string());
        let mut property = txn(2020, 1, dec!(250.00), Basis::Paid);
        property.line_of_business = Some("Property".to_string());

        let segment = SegmentFilter {
            line_of_business: Some("Motor".to_string()),
            geography: None,
        };
        let tri = build_triangle(&[motor, property], Basis::Paid, &segment);

        assert_eq!(tri.value(2020, 1), Some(dec!(100.00)));
    }
}
