//! Service Configuration Module
//!
//! Scoring thresholds, predictor wiring and server settings, loaded from a
//! TOML file with built-in defaults for every value.
//!
//! ## Loading Order
//!
//! 1. `--config <path>` on the command line
//! 2. `VEHICLE_HEALTH_CONFIG` environment variable
//! 3. `vehicle_health.toml` in the current working directory
//! 4. Built-in defaults
//!
//! The loaded config is passed by reference into startup code; nothing reads
//! it through a global.

pub mod defaults;
mod service_config;
pub mod validation;

pub use service_config::*;
