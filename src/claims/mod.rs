//! Claim transaction inputs and CSV ingestion

mod data;
pub mod loader;

pub use data::{Basis, ClaimTransaction, SegmentFilter};
pub use loader::{load_claims, load_claims_from_reader, LoadedClaims, ValidationMode};
