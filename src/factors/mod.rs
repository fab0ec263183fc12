//! Development factor estimation and selection

mod estimator;
mod selection;

pub use estimator::{
    estimate_factors, AgeDevelopment, DevelopmentFactors, EstimatorConfig, FactorEstimate,
};
pub use selection::{
    select_curve, FactorSource, SelectedFactor, SelectedFactorCurve, SelectionConfig,
};
