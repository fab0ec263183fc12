//! Loss Development - triangle and chain-ladder reserving engine
//!
//! This library provides:
//! - Cumulative loss triangle construction from additive claim transactions
//! - Age-to-age development factor estimation with credibility rules
//! - Factor selection with smoothing, tail policy, and caller overrides
//! - Chain-ladder projection of ultimate losses and IBNR reserves
//! - CSV claims ingestion and a batch valuation runner

pub mod claims;
pub mod config;
pub mod error;
pub mod factors;
pub mod projection;
pub mod runner;
pub mod triangle;

// Re-export commonly used types
pub use claims::{Basis, ClaimTransaction, SegmentFilter, ValidationMode};
pub use config::ValuationConfig;
pub use error::ReservingError;
pub use factors::{DevelopmentFactors, EstimatorConfig, SelectedFactorCurve, SelectionConfig};
pub use projection::{ProjectionResult, ProjectionSummary};
pub use runner::{ValuationReport, ValuationRunner};
pub use triangle::{Triangle, TriangleBuilder};
