//! Core data types shared by the scoring pipeline and the HTTP layer.

mod report;
mod subsystem;
mod telemetry;

pub use report::{ErrorEnvelope, HealthReport, RiskReport, RulReport, SubsystemReport};
pub use subsystem::{StatusLabel, Strategy, Subsystem};
pub use telemetry::{
    is_recognized, ParsedSample, SampleError, TelemetrySample, RECOGNIZED_FEATURES, RUL_FEATURES,
};
