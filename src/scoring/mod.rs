//! Scoring Pipeline
//!
//! Turns one telemetry sample into a health report for engine, battery and
//! brake. Data flows strictly downward:
//!
//! ```text
//! TelemetrySample
//!   → FeatureAssembler     (fill gaps from the baseline)
//!   → Predictor            (RUL regression | failure classification)
//!   → DeviationScorer      (distance from baseline, classification only)
//!   → HealthAggregator     (health %, status, recommendation)
//!   → Orchestrator         (one report per subsystem)
//! ```
//!
//! Everything here is synchronous and CPU-bound. Baselines and models are
//! loaded once by [`Orchestrator::from_config`] and only read afterwards.

mod assembler;
mod deviation;
mod health;
mod orchestrator;
mod predictor;
mod recommendation;

pub use assembler::{AssembledFeatures, FeatureAssembler};
pub use deviation::{deviation_health, deviation_score};
pub use health::{rul_health, rul_status, to_percent, HealthAggregator};
pub use orchestrator::{Orchestrator, StartupError, SubsystemPipeline};
pub use predictor::{
    clamp_rul, load_predictor, ClassificationPredictor, EstimateSource, Prediction,
    PredictionFailure, Predictor, RegressionPredictor, RiskEstimate, RulEstimate,
};
pub use recommendation::{
    binary_recommendation, unavailable_recommendation, BatteryReadings, BatteryRecommendation,
};

/// Round half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
