//! Deviation scoring - model-agnostic distance from the baseline.
//!
//! `deviation = mean_i(|x_i - mean_i| / std_i)` over the features that have
//! baseline statistics, with `std_i` floored at the baseline epsilon.
//! Health follows as `clamp(round(100 - deviation * scale, 1), 0, 100)`.

use super::assembler::AssembledFeatures;
use super::round_to;
use crate::baseline::BaselineStats;

/// Mean absolute z-score of the assembled vector. Zero for an empty set.
#[allow(clippy::cast_precision_loss)]
pub fn deviation_score(baseline: &BaselineStats, features: &AssembledFeatures) -> f64 {
    let (sum, count) = features
        .iter()
        .filter_map(|(name, value)| baseline.abs_z(name, value))
        .fold((0.0, 0usize), |(sum, n), z| (sum + z, n + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Health (one decimal, within [0, 100]) from a deviation score.
pub fn deviation_health(deviation: f64, scale: f64) -> f64 {
    let health = round_to(100.0 - deviation * scale, 1);
    if health.is_nan() {
        return 0.0;
    }
    health.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::{DefaultMode, FeatureStats};
    use crate::scoring::FeatureAssembler;
    use crate::types::{Subsystem, TelemetrySample};

    fn baseline() -> BaselineStats {
        BaselineStats::new(
            Subsystem::Battery,
            DefaultMode::Mean,
            vec![
                FeatureStats::new("battery_voltage_v", 12.6, None, 0.2),
                FeatureStats::new("battery_temp_c", 30.0, None, 5.0),
                FeatureStats::new("alternator_output_v", 14.0, None, 0.0),
            ],
        )
        .unwrap()
    }

    fn names(b: &BaselineStats) -> Vec<String> {
        b.feature_names().map(str::to_string).collect()
    }

    #[test]
    fn test_zero_deviation_at_baseline_mean() {
        let b = baseline();
        let assembled = FeatureAssembler::new(&b).assemble(&TelemetrySample::default(), &names(&b));
        let d = deviation_score(&b, &assembled);
        assert_eq!(d, 0.0);
        assert_eq!(deviation_health(d, 10.0), 100.0);
    }

    #[test]
    fn test_mean_of_abs_z() {
        let b = baseline();
        let sample = TelemetrySample {
            battery_voltage_v: Some(12.2), // z = 2
            battery_temp_c: Some(20.0),    // z = 2
            alternator_output_v: Some(14.0),
            ..Default::default()
        };
        let assembled = FeatureAssembler::new(&b).assemble(&sample, &names(&b));
        let d = deviation_score(&b, &assembled);
        assert!((d - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(deviation_health(d, 10.0), 86.7);
    }

    #[test]
    fn test_zero_std_does_not_fault() {
        let b = baseline();
        let sample = TelemetrySample {
            alternator_output_v: Some(13.0),
            ..Default::default()
        };
        let assembled = FeatureAssembler::new(&b).assemble(&sample, &names(&b));
        let d = deviation_score(&b, &assembled);
        assert!(d.is_finite());
        assert_eq!(deviation_health(d, 10.0), 0.0);
    }

    #[test]
    fn test_features_without_baseline_are_skipped() {
        let b = baseline();
        let required = vec!["battery_voltage_v".to_string(), "engine_rpm".to_string()];
        let sample = TelemetrySample {
            battery_voltage_v: Some(13.0),
            engine_rpm: Some(99_999.0),
            ..Default::default()
        };
        let assembled = FeatureAssembler::new(&b).assemble(&sample, &required);
        assert!((deviation_score(&b, &assembled) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_feature_set() {
        let b = baseline();
        let assembled = FeatureAssembler::new(&b).assemble(&TelemetrySample::default(), &[]);
        assert_eq!(deviation_score(&b, &assembled), 0.0);
    }

    #[test]
    fn test_health_bounds() {
        for d in [0.0, 0.5, 3.3, 10.0, 1e9, f64::INFINITY] {
            let h = deviation_health(d, 12.0);
            assert!((0.0..=100.0).contains(&h), "d={d} h={h}");
        }
    }
}
