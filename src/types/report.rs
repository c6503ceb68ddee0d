//! Per-subsystem prediction results and the unified response shapes.

use serde::Serialize;

use super::{StatusLabel, Subsystem};

/// Result of the RUL-regression strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulReport {
    /// Remaining useful life in km, clamped to [0, 120], 2 decimals.
    pub rul_km: f64,
    pub health_percent: u8,
    pub status: StatusLabel,
    pub recommendation: String,
    /// Set when the model failed and the fixed fallback RUL was used.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

/// Result of the classification-risk strategy.
///
/// `failure_imminent` and `probability` are `null` when the classifier could
/// not be invoked; health then rests on the deviation score alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub failure_imminent: Option<bool>,
    /// Failure probability in [0, 1], 4 decimals.
    pub probability: Option<f64>,
    pub deviation_score: f64,
    pub health_percent: u8,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Final per-subsystem output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SubsystemReport {
    Rul(RulReport),
    Risk(RiskReport),
}

impl SubsystemReport {
    pub const fn health_percent(&self) -> u8 {
        match self {
            Self::Rul(r) => r.health_percent,
            Self::Risk(r) => r.health_percent,
        }
    }

    pub fn recommendation(&self) -> &str {
        match self {
            Self::Rul(r) => &r.recommendation,
            Self::Risk(r) => &r.recommendation,
        }
    }

    /// Whether the report was produced without a working model call.
    pub const fn is_degraded(&self) -> bool {
        match self {
            Self::Rul(r) => r.fallback,
            Self::Risk(r) => r.error.is_some(),
        }
    }
}

/// Successful response: one report per subsystem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub engine: SubsystemReport,
    pub battery: SubsystemReport,
    pub brake: SubsystemReport,
}

impl HealthReport {
    pub const fn get(&self, subsystem: Subsystem) -> &SubsystemReport {
        match subsystem {
            Subsystem::Engine => &self.engine,
            Subsystem::Battery => &self.battery,
            Subsystem::Brake => &self.brake,
        }
    }
}

/// Request-level failure: `{"error": ..., "engine": null, "battery": null, "brake": null}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub engine: Option<SubsystemReport>,
    pub battery: Option<SubsystemReport>,
    pub brake: Option<SubsystemReport>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            engine: None,
            battery: None,
            brake: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rul_report_omits_fallback_when_false() {
        let report = SubsystemReport::Rul(RulReport {
            rul_km: 5.0,
            health_percent: 10,
            status: StatusLabel::Critical,
            recommendation: "Immediate service required".into(),
            fallback: false,
        });
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(
            v,
            json!({
                "rul_km": 5.0,
                "health_percent": 10,
                "status": "Critical",
                "recommendation": "Immediate service required"
            })
        );
    }

    #[test]
    fn test_degraded_risk_report_keeps_null_probability() {
        let report = SubsystemReport::Risk(RiskReport {
            failure_imminent: None,
            probability: None,
            deviation_score: 0.5,
            health_percent: 95,
            recommendation: "Battery prediction unavailable".into(),
            error: Some("model exploded".into()),
        });
        assert!(report.is_degraded());
        let v = serde_json::to_value(&report).unwrap();
        assert!(v["probability"].is_null());
        assert!(v["failure_imminent"].is_null());
        assert_eq!(v["error"], "model exploded");
    }

    #[test]
    fn test_error_envelope_shape() {
        let v = serde_json::to_value(ErrorEnvelope::new("bad payload")).unwrap();
        assert_eq!(
            v,
            json!({"error": "bad payload", "engine": null, "battery": null, "brake": null})
        );
    }
}
