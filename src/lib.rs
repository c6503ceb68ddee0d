//! Vehicle Health: telemetry snapshot → per-subsystem health assessment
//!
//! Scores engine, battery and brake from a single, possibly partial,
//! telemetry sample.
//!
//! ## Architecture
//!
//! - **Types**: telemetry sample, subsystem identity, report shapes
//! - **Baseline**: per-subsystem reference statistics (defaults, deviation)
//! - **Models**: opaque estimators/classifiers loaded from JSON artifacts
//! - **Scoring**: feature assembly, prediction, health aggregation
//! - **API**: `/predict` and `/health` over HTTP

pub mod api;
pub mod baseline;
pub mod config;
pub mod models;
pub mod scoring;
pub mod types;

// Re-export configuration
pub use config::{FailurePolicy, ServiceConfig};

// Re-export commonly used types
pub use types::{
    ErrorEnvelope, HealthReport, StatusLabel, Strategy, Subsystem, SubsystemReport,
    TelemetrySample,
};

// Re-export baseline components
pub use baseline::{BaselineError, BaselineRegistry, BaselineStats, DefaultMode, FeatureStats};

// Re-export scoring components
pub use scoring::{Orchestrator, PredictionFailure, StartupError};

// Re-export API entry points
pub use api::{create_app, ApiState};
