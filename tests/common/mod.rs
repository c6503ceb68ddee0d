//! Shared fixtures: baseline tables and model artifacts written to a temp
//! directory, plus a `ServiceConfig` pointing at them.

#![allow(dead_code)]

use std::path::PathBuf;
use tempfile::TempDir;

use vehicle_health::baseline::{BaselineStats, DefaultMode, FeatureStats};
use vehicle_health::config::{FailurePolicy, ServiceConfig, SubsystemConfig};
use vehicle_health::models::{
    DecisionTree, LinearModel, ModelArtifact, TreeEnsemble, TreeNode,
};
use vehicle_health::types::{Strategy, Subsystem, RUL_FEATURES};

/// (feature, mean, median, std) for the ten RUL features.
pub const ENGINE_STATS: [(&str, f64, f64, f64); 10] = [
    ("engine_temp_c", 92.0, 91.0, 6.0),
    ("engine_rpm", 2200.0, 2100.0, 450.0),
    ("coolant_temp_c", 88.0, 88.0, 5.0),
    ("fuel_level_percent", 60.0, 62.0, 20.0),
    ("engine_load_percent", 45.0, 44.0, 12.0),
    ("throttle_pos_percent", 25.0, 22.0, 10.0),
    ("air_flow_rate_gps", 12.0, 11.5, 4.0),
    ("vehicle_speed_kph", 60.0, 58.0, 25.0),
    ("ambient_temp_c", 22.0, 21.0, 7.0),
    ("battery_voltage_v", 12.6, 12.6, 0.2),
];

pub const BATTERY_FEATURES: [&str; 4] = [
    "battery_voltage_v",
    "alternator_output_v",
    "battery_temp_c",
    "battery_charge_percent",
];

fn table(subsystem: Subsystem, rows: &[(&str, f64, f64, f64)]) -> BaselineStats {
    BaselineStats::new(
        subsystem,
        DefaultMode::Median,
        rows.iter()
            .map(|(name, mean, median, std)| FeatureStats::new(*name, *mean, Some(*median), *std))
            .collect(),
    )
    .unwrap()
}

pub fn engine_baseline() -> BaselineStats {
    table(Subsystem::Engine, &ENGINE_STATS)
}

pub fn battery_baseline() -> BaselineStats {
    table(
        Subsystem::Battery,
        &[
            ("battery_voltage_v", 12.6, 12.6, 0.2),
            ("alternator_output_v", 14.0, 14.1, 0.3),
            ("battery_temp_c", 30.0, 29.0, 5.0),
            ("battery_charge_percent", 80.0, 82.0, 10.0),
            ("battery_current_a", -2.0, -2.0, 5.0),
        ],
    )
}

pub fn brake_baseline() -> BaselineStats {
    table(
        Subsystem::Brake,
        &[
            ("brake_pad_thickness_mm", 9.0, 9.5, 1.5),
            ("brake_fluid_temp_c", 60.0, 58.0, 10.0),
            ("brake_pressure_bar", 40.0, 40.0, 8.0),
            ("brake_disc_temp_c", 150.0, 140.0, 40.0),
            ("wheel_speed_variance", 0.3, 0.25, 0.1),
        ],
    )
}

fn names(features: &[&str]) -> Vec<String> {
    features.iter().map(|s| (*s).to_string()).collect()
}

/// Linear model over the RUL features that always returns `rul_km`.
pub fn constant_rul(rul_km: f64) -> ModelArtifact {
    ModelArtifact::Linear(LinearModel {
        features: names(&RUL_FEATURES),
        weights: vec![0.0; RUL_FEATURES.len()],
        intercept: rul_km,
    })
}

/// Linear model `rul = weight * x[feature]` over the RUL features.
pub fn rul_from(feature: &str, weight: f64) -> ModelArtifact {
    ModelArtifact::Linear(LinearModel {
        features: names(&RUL_FEATURES),
        weights: RUL_FEATURES
            .iter()
            .map(|f| if *f == feature { weight } else { 0.0 })
            .collect(),
        intercept: 0.0,
    })
}

/// Logistic model with zero weights: probability `σ(logit)` everywhere.
pub fn constant_risk(features: &[&str], logit: f64) -> ModelArtifact {
    ModelArtifact::Logistic(LinearModel {
        features: names(features),
        weights: vec![0.0; features.len()],
        intercept: logit,
    })
}

/// One-stump forest on pad thickness: `<= 3 mm` → `worn`, else `fine`.
pub fn brake_stump(worn: f64, fine: f64) -> ModelArtifact {
    ModelArtifact::ForestClassifier(TreeEnsemble {
        features: names(&["brake_pad_thickness_mm", "brake_fluid_temp_c"]),
        trees: vec![DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 3.0,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: worn },
                TreeNode::Leaf { value: fine },
            ],
        }],
    })
}

pub struct Fixture {
    pub dir: TempDir,
    pub config: ServiceConfig,
}

impl Fixture {
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Write baselines and the given models, and configure every subsystem.
pub fn fixture(
    engine: (Strategy, ModelArtifact),
    battery: (Strategy, ModelArtifact),
    brake: (Strategy, ModelArtifact),
    policy: FailurePolicy,
) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ServiceConfig::default();
    config.scoring.failure_policy = policy;

    let entries = [
        (Subsystem::Engine, engine_baseline(), engine),
        (Subsystem::Battery, battery_baseline(), battery),
        (Subsystem::Brake, brake_baseline(), brake),
    ];
    for (subsystem, baseline, (strategy, model)) in entries {
        let baseline_path = dir.path().join(format!("{subsystem}_baseline.json"));
        baseline.save_to_file(&baseline_path).unwrap();

        let model_path = dir.path().join(format!("{subsystem}_model.json"));
        std::fs::write(&model_path, serde_json::to_string_pretty(&model).unwrap()).unwrap();

        let sub = SubsystemConfig {
            strategy,
            model_path: Some(model_path),
            baseline_path: Some(baseline_path),
            deviation_scale: None,
        };
        match subsystem {
            Subsystem::Engine => config.subsystems.engine = sub,
            Subsystem::Battery => config.subsystems.battery = sub,
            Subsystem::Brake => config.subsystems.brake = sub,
        }
    }

    Fixture { dir, config }
}

/// Engine RUL, battery and brake classification.
pub fn default_fixture(engine_rul_km: f64) -> Fixture {
    fixture(
        (Strategy::RegressionRul, constant_rul(engine_rul_km)),
        (Strategy::ClassificationRisk, constant_risk(&BATTERY_FEATURES, -3.0)),
        (Strategy::ClassificationRisk, brake_stump(0.9, 0.1)),
        FailurePolicy::Isolate,
    )
}
