//! Health aggregation: raw predictions → bounded health, status, recommendation.
//!
//! RUL mapping is piecewise and continuous at 10 km (health 20) and 40 km
//! (health 70):
//!
//! | RUL (km)        | Status        | Health                                   |
//! |-----------------|---------------|------------------------------------------|
//! | `rul <= 10`     | Critical      | `rul / 10 * 20`                          |
//! | `10 < rul <= 40`| AttentionSoon | `20 + (rul - 10) * 50/30`                |
//! | `rul > 40`      | Healthy       | `70 + min(rul - 40, 80) * 30/80`         |
//!
//! Every health value is rounded and clamped to [0, 100].

use super::deviation::deviation_health;
use super::predictor::{EstimateSource, PredictionFailure, RiskEstimate, RulEstimate};
use super::recommendation::{
    binary_recommendation, unavailable_recommendation, BatteryReadings, BatteryRecommendation,
};
use super::round_to;
use crate::config::defaults::{ATTENTION_RUL_KM, CRITICAL_RUL_KM};
use crate::types::{RiskReport, RulReport, StatusLabel, Subsystem};

fn critical_piece(rul: f64) -> f64 {
    rul / CRITICAL_RUL_KM * 20.0
}

fn attention_piece(rul: f64) -> f64 {
    20.0 + (rul - CRITICAL_RUL_KM) * 50.0 / 30.0
}

fn healthy_piece(rul: f64) -> f64 {
    70.0 + (rul - ATTENTION_RUL_KM).min(80.0) * 30.0 / 80.0
}

/// Round to the nearest integer and clamp to [0, 100]. NaN maps to 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_percent(health: f64) -> u8 {
    if health.is_nan() {
        return 0;
    }
    health.round().clamp(0.0, 100.0) as u8
}

/// Status bucket for a RUL estimate.
pub fn rul_status(rul_km: f64) -> StatusLabel {
    if rul_km <= CRITICAL_RUL_KM {
        StatusLabel::Critical
    } else if rul_km <= ATTENTION_RUL_KM {
        StatusLabel::AttentionSoon
    } else {
        StatusLabel::Healthy
    }
}

/// Health percent and status for a RUL estimate.
pub fn rul_health(rul_km: f64) -> (u8, StatusLabel) {
    let status = rul_status(rul_km);
    let raw = match status {
        StatusLabel::Critical => critical_piece(rul_km),
        StatusLabel::AttentionSoon => attention_piece(rul_km),
        StatusLabel::Healthy => healthy_piece(rul_km),
    };
    (to_percent(raw), status)
}

/// Turns one subsystem's prediction into its report.
#[derive(Debug, Clone, Copy)]
pub struct HealthAggregator {
    subsystem: Subsystem,
    deviation_scale: f64,
}

impl HealthAggregator {
    pub const fn new(subsystem: Subsystem, deviation_scale: f64) -> Self {
        Self {
            subsystem,
            deviation_scale,
        }
    }

    pub fn rul_report(&self, estimate: &RulEstimate) -> RulReport {
        let (health_percent, status) = rul_health(estimate.rul_km);
        RulReport {
            rul_km: estimate.rul_km,
            health_percent,
            status,
            recommendation: status.recommendation().to_string(),
            fallback: matches!(estimate.source, EstimateSource::Fallback { .. }),
        }
    }

    /// Classification report. Health comes from the deviation score; the
    /// battery recommendation also reads `readings`.
    pub fn risk_report(
        &self,
        estimate: RiskEstimate,
        deviation: f64,
        readings: &BatteryReadings,
    ) -> RiskReport {
        let health = deviation_health(deviation, self.deviation_scale);
        let recommendation = match self.subsystem {
            Subsystem::Battery => {
                BatteryRecommendation::evaluate(estimate.probability, health, readings)
                    .message()
                    .to_string()
            }
            Subsystem::Engine | Subsystem::Brake => {
                binary_recommendation(self.subsystem, estimate.failure_imminent)
            }
        };
        RiskReport {
            failure_imminent: Some(estimate.failure_imminent),
            probability: Some(round_to(estimate.probability, 4)),
            deviation_score: round_to(deviation, 4),
            health_percent: to_percent(health),
            recommendation,
            error: None,
        }
    }

    /// Report for a classifier that could not be invoked.
    pub fn degraded_report(&self, deviation: f64, failure: &PredictionFailure) -> RiskReport {
        RiskReport {
            failure_imminent: None,
            probability: None,
            deviation_score: round_to(deviation, 4),
            health_percent: to_percent(deviation_health(deviation, self.deviation_scale)),
            recommendation: unavailable_recommendation(self.subsystem),
            error: Some(failure.to_string()),
        }
    }
}
