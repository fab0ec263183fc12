//! Claim transaction data structures matching the claims extract format

use crate::error::ReservingError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aggregation basis for triangle construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Basis {
    /// Cumulative paid losses
    Paid,
    /// Cumulative incurred losses (paid + outstanding reserves)
    Incurred,
}

impl Basis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Basis::Paid => "paid",
            Basis::Incurred => "incurred",
        }
    }
}

impl FromStr for Basis {
    type Err = ReservingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "paid" => Ok(Basis::Paid),
            "incurred" => Ok(Basis::Incurred),
            other => Err(ReservingError::InvalidBasis(other.to_string())),
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single additive claim transaction
///
/// Transactions carry no unique identity; amounts at the same
/// (origin period, development age) cell accumulate. A negative amount is a
/// reversal and reduces the cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimTransaction {
    /// Origin period of the loss event (accident year)
    pub origin_period: i32,

    /// Elapsed periods since origin (development month/year, >= 0)
    pub development_age: u32,

    /// Monetary amount on the transaction's basis
    pub amount: Decimal,

    /// Whether the amount is paid or incurred
    pub basis: Basis,

    /// Line of business (Motor, Property, Life, Health, Pension)
    pub line_of_business: Option<String>,

    /// Geography code (state or "Other")
    pub geography: Option<String>,
}

impl ClaimTransaction {
    /// Create a transaction with no classification dimensions
    pub fn new(origin_period: i32, development_age: u32, amount: Decimal, basis: Basis) -> Self {
        Self {
            origin_period,
            development_age,
            amount,
            basis,
            line_of_business: None,
            geography: None,
        }
    }
}

/// Optional classification filter applied before triangle aggregation
///
/// An empty filter matches every transaction. Transactions without a
/// dimension value never match a filter on that dimension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentFilter {
    pub line_of_business: Option<String>,
    pub geography: Option<String>,
}

impl SegmentFilter {
    /// Check whether a transaction belongs to this segment
    pub fn matches(&self, txn: &ClaimTransaction) -> bool {
        if let Some(lob) = &self.line_of_business {
            if txn.line_of_business.as_deref() != Some(lob.as_str()) {
                return false;
            }
        }
        if let Some(geo) = &self.geography {
            if txn.geography.as_deref() != Some(geo.as_str()) {
                return false;
            }
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.line_of_business.is_none() && self.geography.is_none()
    }
}
