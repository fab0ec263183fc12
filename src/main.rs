//! Loss Development CLI
//!
//! Demo run of the full reserving pipeline on a small synthetic claim set

use chrono::NaiveDate;
use loss_development::{
    Basis, ClaimTransaction, ValuationConfig, ValuationRunner,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fs::File;
use std::io::Write;

/// Synthetic paid development: five accident years with a
/// 1.45 / 1.10 / 1.03 pattern, newer years observed at earlier ages
fn demo_transactions() -> Vec<ClaimTransaction> {
    let cumulative = [dec!(100000), dec!(145000), dec!(159500), dec!(164285)];
    let mut txns = Vec::new();

    for (i, origin) in (2020..2025).enumerate() {
        let observed = cumulative.len() - i.min(cumulative.len() - 1);
        let mut prior = Decimal::ZERO;
        for (age0, &value) in cumulative.iter().take(observed).enumerate() {
            txns.push(ClaimTransaction::new(
                origin,
                age0 as u32 + 1,
                value - prior,
                Basis::Paid,
            ));
            prior = value;
        }
    }

    txns
}

fn main() {
    env_logger::init();

    println!("Loss Development v0.1.0");
    println!("=======================\n");

    let transactions = demo_transactions();
    println!("Claim transactions: {}", transactions.len());

    let mut config = ValuationConfig::default();
    config.selection.max_age = 6;
    println!("Basis: {}", config.basis);
    println!("Credibility: min {} pairs, min prior value {}",
        config.estimator.min_sample_count,
        config.estimator.min_prior_value);
    println!("Tail horizon: age {}, tail factor {}\n",
        config.selection.max_age,
        config.selection.tail_factor);

    let runner = ValuationRunner::new(config).expect("default config is valid");
    let valuation_date = NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date");
    let report = runner.run(&transactions, valuation_date);

    // Print the triangle
    println!("Cumulative paid triangle:");
    let max_age = report.triangle.max_observed_age().unwrap_or(0);
    print!("{:>8}", "Origin");
    for age in 1..=max_age {
        print!("{:>14}", format!("Age {}", age));
    }
    println!();
    for origin in report.triangle.origin_periods().collect::<Vec<_>>() {
        print!("{:>8}", origin);
        for age in 1..=max_age {
            match report.triangle.value(origin, age) {
                Some(v) => print!("{:>14.2}", v),
                None => print!("{:>14}", "-"),
            }
        }
        println!();
    }

    // Print the factor curve
    println!("\nSelected development factors:");
    println!("{:>5} {:>12} {:>10}", "Age", "Factor", "Source");
    for (age, factor) in report.curve.iter() {
        println!("{:>5} {:>12.6} {:>10}", age, factor.value, format!("{:?}", factor.source));
    }

    // Print projections
    println!("\nProjection results:");
    println!("{:>8} {:>10} {:>14} {:>14} {:>14}",
        "Origin", "LatestAge", "Latest", "Ultimate", "Reserve");
    for p in &report.projections {
        println!("{:>8} {:>10} {:>14.2} {:>14.2} {:>14.2}{}",
            p.origin_period,
            p.latest_age,
            p.latest_value,
            p.ultimate_estimate,
            p.reserve,
            if p.negative_reserve { "  (negative)" } else { "" },
        );
    }

    // Write full results to CSV
    let csv_path = "projection_output.csv";
    let mut file = File::create(csv_path).expect("Unable to create CSV file");

    writeln!(file, "Origin,LatestAge,LatestValue,Ultimate,Reserve,NegativeReserve").unwrap();
    for p in &report.projections {
        writeln!(file, "{},{},{},{},{},{}",
            p.origin_period,
            p.latest_age,
            p.latest_value,
            p.ultimate_estimate,
            p.reserve,
            p.negative_reserve,
        ).unwrap();
    }

    println!("\nFull results written to: {}", csv_path);

    // Print summary
    let summary = &report.summary;
    println!("\nSummary:");
    println!("  Origin Periods: {}", summary.origin_count);
    println!("  Total Latest: ${:.2}", summary.total_latest);
    println!("  Total Ultimate: ${:.2}", summary.total_ultimate);
    println!("  Total IBNR Reserve: ${:.2}", summary.total_reserve);
    println!("  Negative Reserves: {}", summary.negative_reserve_count);
    if !report.skipped.is_empty() {
        println!("  Skipped Origins: {}", report.skipped.len());
        for s in &report.skipped {
            println!("    {}: {}", s.origin_period, s.reason);
        }
    }
}
