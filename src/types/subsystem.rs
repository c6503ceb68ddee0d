//! Subsystem identity, prediction strategy and status labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three monitored vehicle subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    Engine,
    Battery,
    Brake,
}

impl Subsystem {
    /// All subsystems in response order.
    pub const ALL: [Self; 3] = [Self::Engine, Self::Battery, Self::Brake];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Engine => "engine",
            Self::Battery => "battery",
            Self::Brake => "brake",
        }
    }

    /// Capitalised name used in recommendation texts.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Engine => "Engine",
            Self::Battery => "Battery",
            Self::Brake => "Brake",
        }
    }

    /// Default multiplier applied to the deviation score when deriving health.
    pub const fn default_deviation_scale(self) -> f64 {
        match self {
            Self::Engine => 12.0,
            Self::Battery | Self::Brake => 10.0,
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subsystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "engine" => Ok(Self::Engine),
            "battery" => Ok(Self::Battery),
            "brake" => Ok(Self::Brake),
            other => Err(format!("unknown subsystem '{other}' (expected engine, battery or brake)")),
        }
    }
}

/// Prediction strategy configured per subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Continuous remaining-useful-life regression (km).
    RegressionRul,
    /// Binary failure-probability classification backed by a deviation score.
    ClassificationRisk,
}

impl Strategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RegressionRul => "regression_rul",
            Self::ClassificationRisk => "classification_risk",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete risk bucket derived from a RUL estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusLabel {
    /// RUL <= 10 km
    Critical,
    /// 10 km < RUL <= 40 km
    AttentionSoon,
    /// RUL > 40 km
    Healthy,
}

impl StatusLabel {
    /// Recommendation text attached to RUL-strategy reports.
    pub const fn recommendation(self) -> &'static str {
        match self {
            Self::Critical => "Immediate service required",
            Self::AttentionSoon => "Service soon",
            Self::Healthy => "No action needed",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "Critical"),
            Self::AttentionSoon => write!(f, "AttentionSoon"),
            Self::Healthy => write!(f, "Healthy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsystem_parse_roundtrip() {
        for s in Subsystem::ALL {
            assert_eq!(s.as_str().parse::<Subsystem>().unwrap(), s);
        }
        assert_eq!(" Battery ".parse::<Subsystem>().unwrap(), Subsystem::Battery);
        assert!("gearbox".parse::<Subsystem>().is_err());
    }

    #[test]
    fn test_status_label_serializes_as_variant_name() {
        let json = serde_json::to_string(&StatusLabel::AttentionSoon).unwrap();
        assert_eq!(json, "\"AttentionSoon\"");
    }

    #[test]
    fn test_strategy_snake_case() {
        let s: Strategy = serde_json::from_str("\"classification_risk\"").unwrap();
        assert_eq!(s, Strategy::ClassificationRisk);
    }
}
