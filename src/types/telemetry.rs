//! Telemetry sample: one snapshot of vehicle sensor readings.
//!
//! Every recognized feature is a named optional field. Absent readings are
//! expected (the FeatureAssembler substitutes baseline defaults), so a sample
//! with no fields at all is still valid.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while turning a raw JSON `data` object into a sample.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SampleError {
    #[error("feature '{0}' must be a number, got {1}")]
    NotNumeric(String, &'static str),

    #[error("feature '{0}' is not a finite number")]
    NonFinite(String),

    #[error("unrecognized feature(s): {}", .0.join(", "))]
    Unrecognized(Vec<String>),
}

macro_rules! telemetry_sample {
    ($($field:ident),+ $(,)?) => {
        /// Partial set of sensor readings keyed by recognized feature name.
        #[derive(Debug, Clone, Default, PartialEq, Serialize)]
        pub struct TelemetrySample {
            $(
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $field: Option<f64>,
            )+
        }

        /// Every feature name the service understands.
        pub const RECOGNIZED_FEATURES: &[&str] = &[$(stringify!($field)),+];

        impl TelemetrySample {
            /// Reading for `name`, if the feature is recognized and present.
            pub fn get(&self, name: &str) -> Option<f64> {
                match name {
                    $(stringify!($field) => self.$field,)+
                    _ => None,
                }
            }

            /// Set a recognized feature. Returns `false` for unknown names.
            pub fn set(&mut self, name: &str, value: f64) -> bool {
                match name {
                    $(stringify!($field) => {
                        self.$field = Some(value);
                        true
                    })+
                    _ => false,
                }
            }

            /// Number of features present in this sample.
            pub fn present_count(&self) -> usize {
                [$(self.$field.is_some()),+].iter().filter(|p| **p).count()
            }
        }
    };
}

telemetry_sample! {
    // Engine / shared
    engine_temp_c,
    engine_rpm,
    coolant_temp_c,
    fuel_level_percent,
    engine_load_percent,
    throttle_pos_percent,
    air_flow_rate_gps,
    vehicle_speed_kph,
    ambient_temp_c,
    battery_voltage_v,
    // Battery
    alternator_output_v,
    battery_temp_c,
    battery_charge_percent,
    battery_current_a,
    // Brake
    brake_pad_thickness_mm,
    brake_fluid_temp_c,
    brake_pressure_bar,
    brake_disc_temp_c,
    wheel_speed_variance,
}

/// The ten features consumed by the legacy RUL models, in model order.
pub const RUL_FEATURES: [&str; 10] = [
    "engine_temp_c",
    "engine_rpm",
    "coolant_temp_c",
    "fuel_level_percent",
    "engine_load_percent",
    "throttle_pos_percent",
    "air_flow_rate_gps",
    "vehicle_speed_kph",
    "ambient_temp_c",
    "battery_voltage_v",
];

/// Whether `name` is a recognized feature.
pub fn is_recognized(name: &str) -> bool {
    RECOGNIZED_FEATURES.contains(&name)
}

/// Result of parsing a raw `data` object.
#[derive(Debug, Clone, Default)]
pub struct ParsedSample {
    pub sample: TelemetrySample,
    /// Keys present in the payload that are not recognized features.
    pub unrecognized: Vec<String>,
}

impl ParsedSample {
    /// Fail if the payload carried unrecognized keys.
    pub fn reject_unrecognized(self) -> Result<TelemetrySample, SampleError> {
        if self.unrecognized.is_empty() {
            Ok(self.sample)
        } else {
            Err(SampleError::Unrecognized(self.unrecognized))
        }
    }
}

impl TelemetrySample {
    /// Build a sample from a JSON object.
    ///
    /// `null` values are treated as absent. Recognized keys with a non-numeric
    /// value are an error; unrecognized keys are collected, not rejected.
    pub fn from_json_map(map: &Map<String, Value>) -> Result<ParsedSample, SampleError> {
        let mut parsed = ParsedSample::default();
        for (key, value) in map {
            if !is_recognized(key) {
                parsed.unrecognized.push(key.clone());
                continue;
            }
            let number = match value {
                Value::Null => continue,
                Value::Number(n) => n
                    .as_f64()
                    .ok_or_else(|| SampleError::NonFinite(key.clone()))?,
                other => return Err(SampleError::NotNumeric(key.clone(), json_kind(other))),
            };
            if !number.is_finite() {
                return Err(SampleError::NonFinite(key.clone()));
            }
            parsed.sample.set(key, number);
        }
        parsed.unrecognized.sort();
        Ok(parsed)
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
