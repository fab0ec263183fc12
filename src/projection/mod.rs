//! Chain-ladder projection over selected factor curves

mod projector;
mod results;

pub use projector::{project_all, project_origin};
pub use results::{ProjectionResult, ProjectionSummary, SkippedOrigin};
