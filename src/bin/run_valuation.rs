//! Run a full valuation over a claims extract CSV
//!
//! Outputs per-origin projections as CSV and, optionally, the complete
//! report (triangle, factors, curve, projections) as JSON for audit.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use loss_development::claims::{load_claims, SegmentFilter, ValidationMode};
use loss_development::{Basis, ValuationConfig, ValuationRunner};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "run_valuation", about = "Chain-ladder valuation over a claims extract")]
struct Args {
    /// Path to the claims extract CSV
    #[arg(long, default_value = "claims.csv")]
    claims: PathBuf,

    /// Aggregation basis: paid or incurred
    #[arg(long, default_value = "paid")]
    basis: String,

    /// Valuation snapshot date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    valuation_date: Option<NaiveDate>,

    /// Restrict to one line of business
    #[arg(long)]
    line_of_business: Option<String>,

    /// Restrict to one geography
    #[arg(long)]
    geography: Option<String>,

    /// Minimum credible origin-period pairs per development age
    #[arg(long, default_value_t = 3)]
    min_sample_count: usize,

    /// Minimum prior cumulative value for a pair to count
    #[arg(long, default_value = "1000")]
    min_prior_value: Decimal,

    /// Tail horizon in development periods
    #[arg(long, default_value_t = 60)]
    max_age: u32,

    /// Tail factor beyond observed development
    #[arg(long, default_value = "1.0")]
    tail_factor: Decimal,

    /// Geometric decay rate for smoothed factors
    #[arg(long, default_value = "0.5")]
    decay_rate: Decimal,

    /// Per-age factor override, repeatable (e.g. --override 3=1.05)
    #[arg(long = "override", value_name = "AGE=FACTOR", value_parser = parse_override)]
    overrides: Vec<(u32, Decimal)>,

    /// Fail the whole batch on the first malformed record
    #[arg(long)]
    strict: bool,

    /// Projections CSV output path
    #[arg(long, default_value = "valuation_output.csv")]
    output: PathBuf,

    /// Optional full-report JSON output path
    #[arg(long)]
    json: Option<PathBuf>,
}

fn parse_override(s: &str) -> std::result::Result<(u32, Decimal), String> {
    let (age, factor) = s
        .split_once('=')
        .ok_or_else(|| format!("expected AGE=FACTOR, got '{}'", s))?;
    let age = age
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid age '{}': {}", age, e))?;
    let factor = factor
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("invalid factor '{}': {}", factor, e))?;
    Ok((age, factor))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();

    let basis: Basis = args.basis.parse()?;
    let mut config = ValuationConfig::for_basis(basis);
    config.segment = SegmentFilter {
        line_of_business: args.line_of_business.clone(),
        geography: args.geography.clone(),
    };
    config.estimator.min_sample_count = args.min_sample_count;
    config.estimator.min_prior_value = args.min_prior_value;
    config.selection.min_sample_count = args.min_sample_count;
    config.selection.max_age = args.max_age;
    config.selection.tail_factor = args.tail_factor;
    config.selection.decay_rate = args.decay_rate;
    config.selection.overrides = args.overrides.iter().copied().collect();
    config.validation_mode = if args.strict {
        ValidationMode::FailBatch
    } else {
        ValidationMode::RejectRecord
    };

    let runner = ValuationRunner::new(config)?;

    println!("Loading claims from {}...", args.claims.display());
    let loaded = load_claims(&args.claims, runner.config().validation_mode)
        .with_context(|| format!("failed to load {}", args.claims.display()))?;
    println!(
        "Loaded {} transactions ({} records rejected) in {:?}",
        loaded.transactions.len(),
        loaded.rejected_records,
        start.elapsed()
    );

    let valuation_date = args
        .valuation_date
        .unwrap_or_else(|| Local::now().date_naive());

    println!("Running {} valuation as of {}...", basis, valuation_date);
    let run_start = Instant::now();
    let report = runner.run(&loaded.transactions, valuation_date);
    println!(
        "Projected {} origin periods in {:?}",
        report.summary.origin_count,
        run_start.elapsed()
    );

    // Write projections CSV
    let mut file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    writeln!(
        file,
        "Origin,LatestAge,LatestValue,Ultimate,Reserve,NegativeReserve"
    )?;
    for p in &report.projections {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            p.origin_period,
            p.latest_age,
            p.latest_value,
            p.ultimate_estimate,
            p.reserve,
            p.negative_reserve,
        )?;
    }
    println!("Projections written to {}", args.output.display());

    // Optional full JSON report for audit
    if let Some(json_path) = &args.json {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(json_path, json)
            .with_context(|| format!("failed to write {}", json_path.display()))?;
        println!("Full report written to {}", json_path.display());
    }

    // Print summary
    let summary = &report.summary;
    println!("\nValuation Summary ({} basis):", report.basis);
    println!("  Origin Periods: {}", summary.origin_count);
    println!("  Total Latest: ${:.2}", summary.total_latest);
    println!("  Total Ultimate: ${:.2}", summary.total_ultimate);
    println!("  Total IBNR Reserve: ${:.2}", summary.total_reserve);
    if summary.negative_reserve_count > 0 {
        println!(
            "  Negative Reserves: {} origin periods flagged for review",
            summary.negative_reserve_count
        );
    }
    for s in &report.skipped {
        println!("  SKIPPED origin {}: {}", s.origin_period, s.reason);
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_override_accepts_age_factor_pairs() {
        assert_eq!(parse_override("3=1.05").unwrap(), (3, dec!(1.05)));
        assert_eq!(parse_override(" 12 = 1.001 ").unwrap(), (12, dec!(1.001)));
    }

    #[test]
    fn test_parse_override_rejects_malformed_input() {
        assert!(parse_override("3").is_err());
        assert!(parse_override("x=1.05").is_err());
        assert!(parse_override("3=abc").is_err());
    }

    #[test]
    fn test_override_args_reach_the_selection_config() {
        let args = Args::parse_from([
            "run_valuation",
            "--override",
            "2=1.20",
            "--override",
            "5=1.02",
        ]);
        let overrides: std::collections::BTreeMap<u32, Decimal> =
            args.overrides.iter().copied().collect();
        assert_eq!(overrides[&2], dec!(1.20));
        assert_eq!(overrides[&5], dec!(1.02));
    }
}
