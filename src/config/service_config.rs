//! Service configuration - every tunable of the scoring service as TOML values.
//!
//! Each struct implements `Default` with the built-in values, so the service
//! runs unchanged when no config file is present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;
use crate::types::{Strategy, Subsystem};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration of the scoring service.
///
/// Load with [`ServiceConfig::load`], which searches:
/// 1. an explicit path (CLI `--config`)
/// 2. `$VEHICLE_HEALTH_CONFIG`
/// 3. `./vehicle_health.toml`
/// 4. built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub request: RequestConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub subsystems: SubsystemsConfig,
}

impl ServiceConfig {
    /// Load configuration using the standard search order.
    ///
    /// A file named explicitly (argument or env var) must load; a failing
    /// `./vehicle_health.toml` only warns and falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            let config = Self::load_from_file(path)?;
            info!(path = %path.display(), "Loaded service config");
            return Ok(config);
        }

        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            if !path.is_empty() {
                let p = PathBuf::from(&path);
                let config = Self::load_from_file(&p)?;
                info!(path = %p.display(), "Loaded service config from {}", defaults::CONFIG_ENV_VAR);
                return Ok(config);
            }
        }

        let local = PathBuf::from(defaults::CONFIG_FILE_NAME);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded service config from ./{}", defaults::CONFIG_FILE_NAME);
                    return Ok(config);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", defaults::CONFIG_FILE_NAME);
                }
            }
        }

        info!("No {} found, using built-in defaults", defaults::CONFIG_FILE_NAME);
        Ok(Self::default())
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys only warn.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check all values for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.addr.trim().is_empty() {
            errors.push("server.addr must not be empty".to_string());
        }
        if self.server.body_limit_bytes == 0 {
            errors.push("server.body_limit_bytes must be > 0".to_string());
        }

        let s = &self.scoring;
        if !s.std_epsilon.is_finite() || s.std_epsilon <= 0.0 {
            errors.push(format!("scoring.std_epsilon must be > 0 (got {})", s.std_epsilon));
        }
        if !(defaults::RUL_MIN_KM..=defaults::RUL_MAX_KM).contains(&s.fallback_rul_km) {
            errors.push(format!(
                "scoring.fallback_rul_km must be within [{}, {}] (got {})",
                defaults::RUL_MIN_KM,
                defaults::RUL_MAX_KM,
                s.fallback_rul_km
            ));
        }

        for subsystem in Subsystem::ALL {
            let sub = self.subsystems.get(subsystem);
            let scale = sub.deviation_scale(subsystem);
            if !scale.is_finite() || scale <= 0.0 {
                errors.push(format!(
                    "subsystems.{subsystem}.deviation_scale must be > 0 (got {scale})"
                ));
            }
            if sub.model_path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
                errors.push(format!("subsystems.{subsystem}.model_path must not be empty"));
            }
            if sub.baseline_path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
                errors.push(format!("subsystems.{subsystem}.baseline_path must not be empty"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Allowed CORS origins; `"*"` allows any origin.
    pub cors_origins: Vec<String>,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: defaults::SERVER_ADDR.to_string(),
            cors_origins: vec!["*".to_string()],
            body_limit_bytes: defaults::BODY_LIMIT_BYTES,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

/// Request payload handling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Reject payloads carrying keys outside the recognized feature list.
    pub reject_unrecognized: bool,
}

/// How a classification prediction failure is surfaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Degrade only the failing subsystem; the request still succeeds.
    #[default]
    Isolate,
    /// Abort the whole request with the error envelope.
    FailRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub failure_policy: FailurePolicy,
    pub fallback_rul_km: f64,
    pub std_epsilon: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            fallback_rul_km: defaults::FALLBACK_RUL_KM,
            std_epsilon: defaults::STD_EPSILON,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsystemsConfig {
    pub engine: SubsystemConfig,
    pub battery: SubsystemConfig,
    pub brake: SubsystemConfig,
}

impl SubsystemsConfig {
    pub const fn get(&self, subsystem: Subsystem) -> &SubsystemConfig {
        match subsystem {
            Subsystem::Engine => &self.engine,
            Subsystem::Battery => &self.battery,
            Subsystem::Brake => &self.brake,
        }
    }
}

/// Per-subsystem predictor wiring. Unset paths and scales resolve to
/// subsystem-specific defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsystemConfig {
    pub strategy: Strategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviation_scale: Option<f64>,
}

impl Default for SubsystemConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::RegressionRul,
            model_path: None,
            baseline_path: None,
            deviation_scale: None,
        }
    }
}

impl SubsystemConfig {
    /// `models/<subsystem>_rul.json` or `models/<subsystem>_risk.json` unless set.
    pub fn model_path(&self, subsystem: Subsystem) -> PathBuf {
        self.model_path.clone().unwrap_or_else(|| {
            let suffix = match self.strategy {
                Strategy::RegressionRul => "rul",
                Strategy::ClassificationRisk => "risk",
            };
            PathBuf::from(format!("models/{subsystem}_{suffix}.json"))
        })
    }

    /// `baseline/<subsystem>.json` unless set.
    pub fn baseline_path(&self, subsystem: Subsystem) -> PathBuf {
        self.baseline_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("baseline/{subsystem}.json")))
    }

    pub fn deviation_scale(&self, subsystem: Subsystem) -> f64 {
        self.deviation_scale
            .unwrap_or_else(|| subsystem.default_deviation_scale())
    }
}
