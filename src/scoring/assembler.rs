//! Feature assembly: partial sample + required feature order → complete vector.

use tracing::debug;

use crate::baseline::BaselineStats;
use crate::types::TelemetrySample;

/// A complete, ordered feature vector ready for model invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledFeatures {
    pub names: Vec<String>,
    pub values: Vec<f64>,
    /// Features that were absent from the sample and got a substitute.
    pub defaulted: Vec<String>,
}

impl AssembledFeatures {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names.iter().map(String::as_str).zip(self.values.iter().copied())
    }
}

/// Fills gaps in a telemetry sample from a subsystem's baseline.
///
/// Missing readings are expected, never an error: a feature absent from the
/// sample takes the baseline default, and a feature absent from the baseline
/// too takes `0.0`.
#[derive(Debug, Clone, Copy)]
pub struct FeatureAssembler<'a> {
    baseline: &'a BaselineStats,
}

impl<'a> FeatureAssembler<'a> {
    pub const fn new(baseline: &'a BaselineStats) -> Self {
        Self { baseline }
    }

    /// Sample reading for `name`, else its baseline default.
    pub fn resolve(&self, sample: &TelemetrySample, name: &str) -> Option<f64> {
        sample.get(name).or_else(|| self.baseline.default_for(name))
    }

    /// Build the vector for `required` (in that order).
    pub fn assemble(&self, sample: &TelemetrySample, required: &[String]) -> AssembledFeatures {
        let mut values = Vec::with_capacity(required.len());
        let mut defaulted = Vec::new();

        for name in required {
            let value = match sample.get(name) {
                Some(v) => v,
                None => {
                    defaulted.push(name.clone());
                    self.baseline.default_for(name).unwrap_or(0.0)
                }
            };
            values.push(value);
        }

        if !defaulted.is_empty() {
            debug!(
                subsystem = %self.baseline.subsystem(),
                defaulted = ?defaulted,
                "Substituted baseline defaults for missing features"
            );
        }

        AssembledFeatures {
            names: required.to_vec(),
            values,
            defaulted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::{DefaultMode, FeatureStats};
    use crate::types::{Subsystem, RUL_FEATURES};

    fn baseline() -> BaselineStats {
        BaselineStats::new(
            Subsystem::Engine,
            DefaultMode::Median,
            vec![
                FeatureStats::new("engine_temp_c", 90.0, Some(88.0), 5.0),
                FeatureStats::new("engine_rpm", 2200.0, Some(2100.0), 400.0),
            ],
        )
        .unwrap()
    }

    fn required() -> Vec<String> {
        RUL_FEATURES.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_length_matches_required() {
        let b = baseline();
        let assembled = FeatureAssembler::new(&b).assemble(&TelemetrySample::default(), &required());
        assert_eq!(assembled.len(), RUL_FEATURES.len());
        assert_eq!(assembled.defaulted.len(), RUL_FEATURES.len());
    }

    #[test]
    fn test_missing_features_take_baseline_then_zero() {
        let b = baseline();
        let sample = TelemetrySample {
            engine_rpm: Some(3000.0),
            ..Default::default()
        };
        let assembled = FeatureAssembler::new(&b).assemble(&sample, &required());

        let by_name: std::collections::HashMap<_, _> = assembled.iter().collect();
        assert_eq!(by_name["engine_temp_c"], 88.0);
        assert_eq!(by_name["engine_rpm"], 3000.0);
        assert_eq!(by_name["coolant_temp_c"], 0.0);
        assert!(!assembled.defaulted.contains(&"engine_rpm".to_string()));
    }

    #[test]
    fn test_order_follows_required() {
        let b = baseline();
        let sample = TelemetrySample {
            engine_temp_c: Some(1.0),
            engine_rpm: Some(2.0),
            ..Default::default()
        };
        let order = vec!["engine_rpm".to_string(), "engine_temp_c".to_string()];
        let assembled = FeatureAssembler::new(&b).assemble(&sample, &order);
        assert_eq!(assembled.values, vec![2.0, 1.0]);
    }

    #[test]
    fn test_resolve() {
        let b = baseline();
        let a = FeatureAssembler::new(&b);
        let sample = TelemetrySample {
            engine_rpm: Some(900.0),
            ..Default::default()
        };
        assert_eq!(a.resolve(&sample, "engine_rpm"), Some(900.0));
        assert_eq!(a.resolve(&sample, "engine_temp_c"), Some(88.0));
        assert_eq!(a.resolve(&sample, "battery_temp_c"), None);
    }
}
