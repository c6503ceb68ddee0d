//! Config Validation Tests
//!
//! Typo detection and range validation for `ServiceConfig`, exercised
//! independently from the scoring pipeline.

use std::io::Write;

use vehicle_health::config::validation::{known_config_keys, suggest_correction, validate_unknown_keys};
use vehicle_health::config::{ConfigError, FailurePolicy, LogFormat, ServiceConfig};
use vehicle_health::types::{Strategy, Subsystem};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_scoring_key_warns_with_suggestion() {
    let toml_str = r#"
[scoring]
fallback_rul_kms = 40.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].path.contains("fallback_rul_kms"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("scoring.fallback_rul_km")
    );
}

#[test]
fn typo_in_subsystem_table_warns() {
    let toml_str = r#"
[subsystems.brake]
stratgy = "classification_risk"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("subsystems.brake.strategy")
    );
}

#[test]
fn unknown_keys_do_not_fail_the_load() {
    let config = ServiceConfig::from_toml_str(
        r#"
[server]
adress = "127.0.0.1:9000"
"#,
    )
    .unwrap();
    assert_eq!(config.server.addr, "0.0.0.0:8000");
}

#[test]
fn far_off_keys_get_no_suggestion() {
    let known = known_config_keys();
    assert!(suggest_correction("completely_unrelated_section", &known).is_none());
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[server]
addr = "127.0.0.1:9000"
cors_origins = ["http://localhost:19006"]
body_limit_bytes = 32768

[logging]
format = "json"

[request]
reject_unrecognized = true

[scoring]
failure_policy = "fail_request"
fallback_rul_km = 45.0
std_epsilon = 1e-5

[subsystems.engine]
strategy = "regression_rul"
model_path = "models/engine_rul.json"

[subsystems.battery]
strategy = "classification_risk"
baseline_path = "baseline/battery.json"
deviation_scale = 8.0

[subsystems.brake]
strategy = "classification_risk"
"#;
    assert!(validate_unknown_keys(toml_str).is_empty());

    let config = ServiceConfig::from_toml_str(toml_str).unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(config.request.reject_unrecognized);
    assert_eq!(config.scoring.failure_policy, FailurePolicy::FailRequest);
    assert_eq!(config.subsystems.battery.strategy, Strategy::ClassificationRisk);
    assert_eq!(config.subsystems.battery.deviation_scale(Subsystem::Battery), 8.0);
    assert_eq!(config.subsystems.brake.deviation_scale(Subsystem::Brake), 10.0);
    assert_eq!(
        config.subsystems.brake.model_path(Subsystem::Brake),
        std::path::PathBuf::from("models/brake_risk.json")
    );
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn out_of_range_values_fail_validation() {
    let err = ServiceConfig::from_toml_str(
        r#"
[scoring]
fallback_rul_km = 150.0
std_epsilon = 0.0

[subsystems.engine]
deviation_scale = -1.0
"#,
    )
    .unwrap_err();

    let ConfigError::Validation(errors) = err else {
        panic!("expected a validation error");
    };
    assert_eq!(errors.len(), 3, "{errors:?}");
    assert!(errors.iter().any(|e| e.contains("fallback_rul_km")));
    assert!(errors.iter().any(|e| e.contains("std_epsilon")));
    assert!(errors.iter().any(|e| e.contains("subsystems.engine.deviation_scale")));
}

#[test]
fn unknown_enum_value_is_a_parse_error() {
    let err = ServiceConfig::from_toml_str(
        r#"
[scoring]
failure_policy = "ignore"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_, _)));
}

#[test]
fn explicit_config_file_must_exist() {
    let err = ServiceConfig::load(Some(std::path::Path::new("/nonexistent/vehicle_health.toml")))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Io(_, _)));
}

#[test]
fn explicit_config_file_is_loaded() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "[server]\naddr = \"127.0.0.1:8123\"").unwrap();

    let config = ServiceConfig::load(Some(f.path())).unwrap();
    assert_eq!(config.server.addr, "127.0.0.1:8123");
}
