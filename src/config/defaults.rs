//! System-wide default constants.
//!
//! Grouped by concern so the numeric contracts of the scoring pipeline are
//! discoverable in one place.

// ============================================================================
// RUL
// ============================================================================

/// Lower bound of a RUL estimate (km).
pub const RUL_MIN_KM: f64 = 0.0;

/// Upper bound of a RUL estimate (km). Health saturates at 100 here.
pub const RUL_MAX_KM: f64 = 120.0;

/// RUL substituted when the regression model cannot be invoked (km).
pub const FALLBACK_RUL_KM: f64 = 50.0;

/// RUL at or below which a subsystem is Critical (km).
pub const CRITICAL_RUL_KM: f64 = 10.0;

/// RUL at or below which a subsystem needs attention soon (km).
pub const ATTENTION_RUL_KM: f64 = 40.0;

// ============================================================================
// Classification
// ============================================================================

/// Probability strictly above which a failure is flagged as imminent.
pub const FAILURE_PROBABILITY_THRESHOLD: f64 = 0.5;

/// Probability strictly above which a battery is critically unstable.
pub const BATTERY_UNSTABLE_PROBABILITY: f64 = 0.85;

/// Health strictly below which a battery is critically unstable.
pub const BATTERY_UNSTABLE_HEALTH: f64 = 40.0;

/// Battery voltage below which the voltage is reported low (V).
pub const BATTERY_LOW_VOLTAGE_V: f64 = 12.0;

/// Alternator output below which charging is reported weak (V).
pub const ALTERNATOR_WEAK_OUTPUT_V: f64 = 13.0;

/// Battery temperature above which the battery is overheating (°C).
pub const BATTERY_OVERHEAT_C: f64 = 50.0;

/// Charge level below which the battery charge is low (%).
pub const BATTERY_LOW_CHARGE_PERCENT: f64 = 25.0;

// ============================================================================
// Baseline
// ============================================================================

/// Standard deviation substituted for zero (or near-zero) baseline spread.
pub const STD_EPSILON: f64 = 1e-6;

// ============================================================================
// Server
// ============================================================================

/// HTTP bind address.
pub const SERVER_ADDR: &str = "0.0.0.0:8000";

/// Maximum accepted request body (bytes).
pub const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "VEHICLE_HEALTH_CONFIG";

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "vehicle_health.toml";
