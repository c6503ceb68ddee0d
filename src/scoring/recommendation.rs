//! Human-readable recommendations for classification-risk reports.
//!
//! Battery uses an ordered, first-match rule chain over the failure
//! probability, the deviation health and four sensor readings. Engine and
//! brake use a binary message keyed on the failure flag.

use super::assembler::FeatureAssembler;
use crate::config::defaults::{
    ALTERNATOR_WEAK_OUTPUT_V, BATTERY_LOW_CHARGE_PERCENT, BATTERY_LOW_VOLTAGE_V,
    BATTERY_OVERHEAT_C, BATTERY_UNSTABLE_HEALTH, BATTERY_UNSTABLE_PROBABILITY,
};
use crate::types::{Subsystem, TelemetrySample};

/// Battery sensor readings the rule chain looks at.
///
/// `None` means neither the sample nor the baseline knows the value; a rule
/// over an unknown reading never matches.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatteryReadings {
    pub voltage: Option<f64>,
    pub alternator_output: Option<f64>,
    pub temperature: Option<f64>,
    pub charge_percent: Option<f64>,
}

impl BatteryReadings {
    /// Resolve each reading from the sample, else the baseline default.
    pub fn resolve(assembler: &FeatureAssembler<'_>, sample: &TelemetrySample) -> Self {
        Self {
            voltage: assembler.resolve(sample, "battery_voltage_v"),
            alternator_output: assembler.resolve(sample, "alternator_output_v"),
            temperature: assembler.resolve(sample, "battery_temp_c"),
            charge_percent: assembler.resolve(sample, "battery_charge_percent"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryRecommendation {
    CriticallyUnstable,
    LowVoltage,
    WeakCharging,
    Overheating,
    LowCharge,
    Normal,
}

impl BatteryRecommendation {
    /// First matching rule wins.
    pub fn evaluate(probability: f64, health: f64, readings: &BatteryReadings) -> Self {
        let below = |v: Option<f64>, limit: f64| v.is_some_and(|v| v < limit);
        let above = |v: Option<f64>, limit: f64| v.is_some_and(|v| v > limit);

        if probability > BATTERY_UNSTABLE_PROBABILITY || health < BATTERY_UNSTABLE_HEALTH {
            Self::CriticallyUnstable
        } else if below(readings.voltage, BATTERY_LOW_VOLTAGE_V) {
            Self::LowVoltage
        } else if below(readings.alternator_output, ALTERNATOR_WEAK_OUTPUT_V) {
            Self::WeakCharging
        } else if above(readings.temperature, BATTERY_OVERHEAT_C) {
            Self::Overheating
        } else if below(readings.charge_percent, BATTERY_LOW_CHARGE_PERCENT) {
            Self::LowCharge
        } else {
            Self::Normal
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::CriticallyUnstable => "Battery critically unstable",
            Self::LowVoltage => "Low battery voltage",
            Self::WeakCharging => "Weak charging system",
            Self::Overheating => "Battery overheating",
            Self::LowCharge => "Battery charge low",
            Self::Normal => "Battery normal",
        }
    }
}

/// "<Subsystem> risk detected" or "<Subsystem> normal".
pub fn binary_recommendation(subsystem: Subsystem, failure_imminent: bool) -> String {
    if failure_imminent {
        format!("{} risk detected", subsystem.title())
    } else {
        format!("{} normal", subsystem.title())
    }
}

/// Recommendation for a report whose classifier could not be invoked.
pub fn unavailable_recommendation(subsystem: Subsystem) -> String {
    format!("{} prediction unavailable", subsystem.title())
}
