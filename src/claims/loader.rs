//! Load claim transactions from a claims extract CSV

use super::{Basis, ClaimTransaction};
use crate::error::ReservingError;
use chrono::{Datelike, NaiveDate};
use csv::Reader;
use rust_decimal::Decimal;
use std::path::Path;

/// How to treat a malformed claim record during loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Skip the offending record with a warning and keep loading
    #[default]
    RejectRecord,
    /// Fail the whole batch on the first malformed record
    FailBatch,
}

/// Raw CSV row matching the claims extract columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "accident_year")]
    accident_year: Option<i64>,
    #[serde(rename = "accident_date")]
    accident_date: Option<NaiveDate>,
    #[serde(rename = "report_date")]
    report_date: Option<NaiveDate>,
    #[serde(rename = "development_month")]
    development_month: Option<i64>,
    #[serde(rename = "line_of_business")]
    line_of_business: Option<String>,
    #[serde(rename = "geography")]
    geography: Option<String>,
    #[serde(rename = "paid_amount")]
    paid_amount: Decimal,
    #[serde(rename = "incurred_amount")]
    incurred_amount: Decimal,
}

impl CsvRow {
    /// Expand one extract row into a paid and an incurred transaction
    ///
    /// `record` is the 1-based position in the file, used in error messages.
    fn to_transactions(self, record: u64) -> Result<[ClaimTransaction; 2], ReservingError> {
        let origin_period = match (self.accident_year, self.accident_date) {
            (Some(year), _) => year,
            (None, Some(date)) => date.year() as i64,
            (None, None) => {
                return Err(ReservingError::MalformedRecord {
                    record,
                    reason: "neither accident_year nor accident_date present".to_string(),
                })
            }
        };

        let development_age = match self.development_month {
            Some(age) => age,
            None => derive_development_month(record, self.accident_date, self.report_date)?,
        };

        if origin_period < 0 || development_age < 0 {
            return Err(ReservingError::InvalidPeriod {
                record,
                origin_period,
                development_age,
            });
        }
        // Extract months are 1-based; an explicit month 0 floors to 1 the
        // same way a same-month report does on the derived path
        let development_age = development_age.max(1);

        let base = ClaimTransaction {
            origin_period: origin_period as i32,
            development_age: development_age as u32,
            amount: self.paid_amount,
            basis: Basis::Paid,
            line_of_business: self.line_of_business,
            geography: self.geography,
        };

        let incurred = ClaimTransaction {
            amount: self.incurred_amount,
            basis: Basis::Incurred,
            ..base.clone()
        };

        Ok([base, incurred])
    }
}

/// Derive the development month from accident and report dates
///
/// Matches the extract convention: whole months elapsed plus one, floored at
/// month 1 (a claim reported in its accident month is development month 1).
fn derive_development_month(
    record: u64,
    accident_date: Option<NaiveDate>,
    report_date: Option<NaiveDate>,
) -> Result<i64, ReservingError> {
    let (acc, rep) = match (accident_date, report_date) {
        (Some(acc), Some(rep)) => (acc, rep),
        _ => {
            return Err(ReservingError::MalformedRecord {
                record,
                reason: "development_month absent and accident/report dates incomplete"
                    .to_string(),
            })
        }
    };

    let months =
        (rep.year() - acc.year()) as i64 * 12 + (rep.month() as i64 - acc.month() as i64);
    Ok((months + 1).max(1))
}

/// Result of loading a claims extract
#[derive(Debug, Clone)]
pub struct LoadedClaims {
    /// Paid and incurred transactions, two per extract row
    pub transactions: Vec<ClaimTransaction>,
    /// Records skipped under `ValidationMode::RejectRecord`
    pub rejected_records: u64,
}

/// Load claim transactions from a CSV file
pub fn load_claims<P: AsRef<Path>>(
    path: P,
    mode: ValidationMode,
) -> Result<LoadedClaims, ReservingError> {
    let reader = Reader::from_path(path)?;
    load_from_csv_reader(reader, mode)
}

/// Load claim transactions from any reader (e.g., string buffer, network stream)
pub fn load_claims_from_reader<R: std::io::Read>(
    reader: R,
    mode: ValidationMode,
) -> Result<LoadedClaims, ReservingError> {
    load_from_csv_reader(Reader::from_reader(reader), mode)
}

fn load_from_csv_reader<R: std::io::Read>(
    mut reader: Reader<R>,
    mode: ValidationMode,
) -> Result<LoadedClaims, ReservingError> {
    let mut transactions = Vec::new();
    let mut rejected_records: u64 = 0;

    for (idx, result) in reader.deserialize().enumerate() {
        let record = idx as u64 + 1;

        let parsed: Result<[ClaimTransaction; 2], ReservingError> = match result {
            Ok(row) => {
                let row: CsvRow = row;
                row.to_transactions(record)
            }
            Err(e) => Err(ReservingError::Csv(e)),
        };

        match parsed {
            Ok(pair) => transactions.extend(pair),
            Err(e) => match mode {
                ValidationMode::FailBatch => return Err(e),
                ValidationMode::RejectRecord => {
                    log::warn!("Skipping claim record {}: {}", record, e);
                    rejected_records += 1;
                }
            },
        }
    }

    if rejected_records > 0 {
        log::info!(
            "Loaded {} transactions, rejected {} malformed records",
            transactions.len(),
            rejected_records
        );
    }

    Ok(LoadedClaims {
        transactions,
        rejected_records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const GOOD_CSV: &str = "\
accident_year,accident_date,report_date,development_month,line_of_business,geography,paid_amount,incurred_amount
2022,2022-03-10,2022-04-02,2,Motor,TX,1200.50,1500.00
2023,2023-07-21,2023-07-29,1,Property,CA,800.00,950.25
";

    #[test]
    fn test_load_expands_paid_and_incurred() {
        let loaded =
            load_claims_from_reader(GOOD_CSV.as_bytes(), ValidationMode::FailBatch).unwrap();

        assert_eq!(loaded.transactions.len(), 4);
        assert_eq!(loaded.rejected_records, 0);

        let first = &loaded.transactions[0];
        assert_eq!(first.origin_period, 2022);
        assert_eq!(first.development_age, 2);
        assert_eq!(first.basis, Basis::Paid);
        assert_eq!(first.amount, dec!(1200.50));

        let second = &loaded.transactions[1];
        assert_eq!(second.basis, Basis::Incurred);
        assert_eq!(second.amount, dec!(1500.00));
        assert_eq!(second.line_of_business.as_deref(), Some("Motor"));
    }

    #[test]
    fn test_development_month_derived_from_dates() {
        let csv = "\
accident_year,accident_date,report_date,development_month,line_of_business,geography,paid_amount,incurred_amount
2022,2022-03-10,2022-08-02,,Motor,TX,100.00,120.00
";
        let loaded = load_claims_from_reader(csv.as_bytes(), ValidationMode::FailBatch).unwrap();

        // March to August is 5 whole months, plus one
        assert_eq!(loaded.transactions[0].development_age, 6);
    }

    #[test]
    fn test_same_month_report_is_development_month_one() {
        let csv = "\
accident_year,accident_date,report_date,development_month,line_of_business,geography,paid_amount,incurred_amount
2022,2022-03-10,2022-03-28,,Motor,TX,100.00,120.00
";
        let loaded = load_claims_from_reader(csv.as_bytes(), ValidationMode::FailBatch).unwrap();
        assert_eq!(loaded.transactions[0].development_age, 1);
    }

    #[test]
    fn test_explicit_month_zero_floors_to_one() {
        let csv = "\
accident_year,accident_date,report_date,development_month,line_of_business,geography,paid_amount,incurred_amount
2022,,,0,Motor,TX,100.00,120.00
";
        let loaded = load_claims_from_reader(csv.as_bytes(), ValidationMode::FailBatch).unwrap();

        // Same convention as the derived path: development month 1 at minimum
        assert_eq!(loaded.transactions[0].development_age, 1);
        assert_eq!(loaded.rejected_records, 0);
    }

    #[test]
    fn test_reject_record_skips_negative_age() {
        let csv = "\
accident_year,accident_date,report_date,development_month,line_of_business,geography,paid_amount,incurred_amount
2022,,,-3,Motor,TX,100.00,120.00
2023,,,1,Motor,TX,50.00,60.00
";
        let loaded = load_claims_from_reader(csv.as_bytes(), ValidationMode::RejectRecord).unwrap();

        assert_eq!(loaded.rejected_records, 1);
        assert_eq!(loaded.transactions.len(), 2);
        assert_eq!(loaded.transactions[0].origin_period, 2023);
    }

    #[test]
    fn test_fail_batch_stops_on_negative_age() {
        let csv = "\
accident_year,accident_date,report_date,development_month,line_of_business,geography,paid_amount,incurred_amount
2022,,,-3,Motor,TX,100.00,120.00
";
        let err = load_claims_from_reader(csv.as_bytes(), ValidationMode::FailBatch).unwrap_err();
        assert!(matches!(err, ReservingError::InvalidPeriod { .. }));
    }
}
