//! Baseline Statistics Module - per-subsystem reference distributions
//!
//! Each subsystem carries a table of per-feature reference statistics (mean,
//! optional median, standard deviation). The tables serve two purposes:
//!
//! - **Defaulting**: a feature missing from a telemetry sample is replaced by
//!   its baseline median (or mean, per table configuration).
//! - **Deviation scoring**: the distance `|value - mean| / std` of each feature
//!   feeds a model-agnostic health signal.
//!
//! Tables are loaded once at startup into a [`BaselineRegistry`] and never
//! mutated afterwards, so they are shared across requests without locking.
//!
//! ## File format
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "subsystem": "engine",
//!   "default_mode": "median",
//!   "features": [
//!     { "name": "engine_temp_c", "mean": 92.1, "median": 91.5, "std": 6.3 }
//!   ]
//! }
//! ```

mod reference;

pub use reference::derive_from_csv;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::defaults::STD_EPSILON;
use crate::types::{is_recognized, Subsystem};

/// Schema version for baseline files.
pub const SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("Baseline file I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Baseline file parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Schema version mismatch: file has v{0}, expected v{1}")]
    SchemaMismatch(u32, u32),

    #[error("Baseline for {expected} contains a table for {found}")]
    SubsystemMismatch { expected: Subsystem, found: Subsystem },

    #[error("Unknown feature in baseline: {0}")]
    UnknownFeature(String),

    #[error("Duplicate feature in baseline: {0}")]
    DuplicateFeature(String),

    #[error("Invalid statistic for {feature}: {reason}")]
    InvalidStat { feature: String, reason: String },

    #[error("No baseline loaded for subsystem {0}")]
    Missing(Subsystem),

    #[error("Reference dataset error: {0}")]
    Reference(String),
}

// ============================================================================
// Feature Statistics
// ============================================================================

/// Which statistic substitutes a missing reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultMode {
    #[default]
    Median,
    Mean,
}

/// Reference statistics of one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    pub name: String,
    pub mean: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    pub std: f64,
}

impl FeatureStats {
    pub fn new(name: impl Into<String>, mean: f64, median: Option<f64>, std: f64) -> Self {
        Self {
            name: name.into(),
            mean,
            median,
            std,
        }
    }

    /// Value substituted for a missing reading. Median falls back to mean.
    pub fn default_value(&self, mode: DefaultMode) -> f64 {
        match mode {
            DefaultMode::Median => self.median.unwrap_or(self.mean),
            DefaultMode::Mean => self.mean,
        }
    }

    fn validate(&self) -> Result<(), BaselineError> {
        let invalid = |reason: &str| BaselineError::InvalidStat {
            feature: self.name.clone(),
            reason: reason.to_string(),
        };
        if !self.mean.is_finite() {
            return Err(invalid("mean is not finite"));
        }
        if self.median.is_some_and(|m| !m.is_finite()) {
            return Err(invalid("median is not finite"));
        }
        if !self.std.is_finite() {
            return Err(invalid("std is not finite"));
        }
        if self.std < 0.0 {
            return Err(invalid("std is negative"));
        }
        Ok(())
    }
}

// ============================================================================
// Baseline Stats (one subsystem)
// ============================================================================

/// On-disk representation of a baseline table.
#[derive(Debug, Serialize, Deserialize)]
struct BaselineFile {
    schema_version: u32,
    subsystem: Subsystem,
    #[serde(default)]
    default_mode: DefaultMode,
    features: Vec<FeatureStats>,
}

/// Validated, immutable reference distribution of one subsystem.
#[derive(Debug, Clone)]
pub struct BaselineStats {
    subsystem: Subsystem,
    default_mode: DefaultMode,
    features: Vec<FeatureStats>,
    index: HashMap<String, usize>,
    epsilon: f64,
}

impl BaselineStats {
    /// Build a table, rejecting unknown or duplicate features and invalid stats.
    pub fn new(
        subsystem: Subsystem,
        default_mode: DefaultMode,
        features: Vec<FeatureStats>,
    ) -> Result<Self, BaselineError> {
        let mut index = HashMap::with_capacity(features.len());
        for (i, f) in features.iter().enumerate() {
            if !is_recognized(&f.name) {
                return Err(BaselineError::UnknownFeature(f.name.clone()));
            }
            f.validate()?;
            if index.insert(f.name.clone(), i).is_some() {
                return Err(BaselineError::DuplicateFeature(f.name.clone()));
            }
        }
        Ok(Self {
            subsystem,
            default_mode,
            features,
            index,
            epsilon: STD_EPSILON,
        })
    }

    /// Override the floor substituted for zero standard deviations.
    #[must_use]
    pub const fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub const fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    pub const fn default_mode(&self) -> DefaultMode {
        self.default_mode
    }

    pub const fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Feature statistics in table order.
    pub fn features(&self) -> &[FeatureStats] {
        &self.features
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&FeatureStats> {
        self.index.get(name).map(|&i| &self.features[i])
    }

    /// Substitute for a missing reading, if the feature has a baseline.
    pub fn default_for(&self, name: &str) -> Option<f64> {
        self.get(name).map(|f| f.default_value(self.default_mode))
    }

    /// Standard deviation with the epsilon floor applied.
    pub fn effective_std(&self, stats: &FeatureStats) -> f64 {
        if stats.std > self.epsilon {
            stats.std
        } else {
            self.epsilon
        }
    }

    /// Absolute z-score of `value` for `name`, if the feature has a baseline.
    pub fn abs_z(&self, name: &str, value: f64) -> Option<f64> {
        self.get(name)
            .map(|stats| (value - stats.mean).abs() / self.effective_std(stats))
    }

    /// Load and validate a table from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self, BaselineError> {
        let json =
            std::fs::read_to_string(path).map_err(|e| BaselineError::Io(path.to_path_buf(), e))?;
        let file: BaselineFile =
            serde_json::from_str(&json).map_err(|e| BaselineError::Parse(path.to_path_buf(), e))?;
        if file.schema_version != SCHEMA_VERSION {
            return Err(BaselineError::SchemaMismatch(file.schema_version, SCHEMA_VERSION));
        }
        let stats = Self::new(file.subsystem, file.default_mode, file.features)?;
        info!(
            path = %path.display(),
            subsystem = %stats.subsystem,
            features = stats.features.len(),
            mode = ?stats.default_mode,
            "Baseline loaded"
        );
        Ok(stats)
    }

    /// Write the table as pretty JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<(), BaselineError> {
        let file = BaselineFile {
            schema_version: SCHEMA_VERSION,
            subsystem: self.subsystem,
            default_mode: self.default_mode,
            features: self.features.clone(),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| BaselineError::Io(parent.to_path_buf(), e))?;
        }
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(path, json).map_err(|e| BaselineError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), features = self.features.len(), "Baseline saved");
        Ok(())
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Process-wide, read-only set of baseline tables (one per subsystem).
#[derive(Debug, Clone)]
pub struct BaselineRegistry {
    tables: HashMap<Subsystem, Arc<BaselineStats>>,
}

impl BaselineRegistry {
    /// Build from one table per subsystem. Every subsystem must be covered.
    pub fn from_tables(
        tables: impl IntoIterator<Item = BaselineStats>,
    ) -> Result<Self, BaselineError> {
        let mut map = HashMap::new();
        for table in tables {
            let subsystem = table.subsystem;
            if map.insert(subsystem, Arc::new(table)).is_some() {
                debug!(%subsystem, "Duplicate baseline table, keeping the last one");
            }
        }
        let seen: HashSet<_> = map.keys().copied().collect();
        if let Some(missing) = Subsystem::ALL.into_iter().find(|s| !seen.contains(s)) {
            return Err(BaselineError::Missing(missing));
        }
        Ok(Self { tables: map })
    }

    /// Load each subsystem's table from its configured path.
    pub fn load(
        paths: impl IntoIterator<Item = (Subsystem, PathBuf)>,
        epsilon: f64,
    ) -> Result<Self, BaselineError> {
        let mut tables = Vec::new();
        for (subsystem, path) in paths {
            let table = BaselineStats::load_from_file(&path)?.with_epsilon(epsilon);
            if table.subsystem != subsystem {
                return Err(BaselineError::SubsystemMismatch {
                    expected: subsystem,
                    found: table.subsystem,
                });
            }
            tables.push(table);
        }
        Self::from_tables(tables)
    }

    pub fn get(&self, subsystem: Subsystem) -> Result<Arc<BaselineStats>, BaselineError> {
        self.tables
            .get(&subsystem)
            .cloned()
            .ok_or(BaselineError::Missing(subsystem))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_stats() -> BaselineStats {
        BaselineStats::new(
            Subsystem::Engine,
            DefaultMode::Median,
            vec![
                FeatureStats::new("engine_temp_c", 90.0, Some(88.0), 5.0),
                FeatureStats::new("engine_rpm", 2200.0, None, 400.0),
                FeatureStats::new("ambient_temp_c", 20.0, Some(21.0), 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_default_prefers_median_then_mean() {
        let stats = engine_stats();
        assert_eq!(stats.default_for("engine_temp_c"), Some(88.0));
        assert_eq!(stats.default_for("engine_rpm"), Some(2200.0));
        assert_eq!(stats.default_for("coolant_temp_c"), None);
    }

    #[test]
    fn test_mean_mode_ignores_median() {
        let stats = BaselineStats::new(
            Subsystem::Engine,
            DefaultMode::Mean,
            vec![FeatureStats::new("engine_temp_c", 90.0, Some(88.0), 5.0)],
        )
        .unwrap();
        assert_eq!(stats.default_for("engine_temp_c"), Some(90.0));
    }

    #[test]
    fn test_zero_std_uses_epsilon() {
        let stats = engine_stats();
        let ambient = stats.get("ambient_temp_c").unwrap();
        assert_eq!(stats.effective_std(ambient), STD_EPSILON);

        let z = stats.abs_z("ambient_temp_c", 20.0).unwrap();
        assert_eq!(z, 0.0);
        let z = stats.abs_z("ambient_temp_c", 21.0).unwrap();
        assert!(z.is_finite());
    }

    #[test]
    fn test_unknown_feature_rejected() {
        let err = BaselineStats::new(
            Subsystem::Brake,
            DefaultMode::Median,
            vec![FeatureStats::new("flux_capacitor", 1.0, None, 1.0)],
        )
        .unwrap_err();
        assert!(matches!(err, BaselineError::UnknownFeature(_)));
    }

    #[test]
    fn test_duplicate_feature_rejected() {
        let err = BaselineStats::new(
            Subsystem::Brake,
            DefaultMode::Median,
            vec![
                FeatureStats::new("brake_pressure_bar", 1.0, None, 1.0),
                FeatureStats::new("brake_pressure_bar", 2.0, None, 1.0),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, BaselineError::DuplicateFeature(_)));
    }

    #[test]
    fn test_negative_std_rejected() {
        let err = BaselineStats::new(
            Subsystem::Brake,
            DefaultMode::Median,
            vec![FeatureStats::new("brake_pressure_bar", 1.0, None, -1.0)],
        )
        .unwrap_err();
        assert!(matches!(err, BaselineError::InvalidStat { .. }));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baseline/engine.json");
        engine_stats().save_to_file(&path).unwrap();

        let loaded = BaselineStats::load_from_file(&path).unwrap();
        assert_eq!(loaded.subsystem(), Subsystem::Engine);
        assert_eq!(loaded.features(), engine_stats().features());
    }

    #[test]
    fn test_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(
            &path,
            r#"{"schema_version": 99, "subsystem": "engine", "features": []}"#,
        )
        .unwrap();
        let err = BaselineStats::load_from_file(&path).unwrap_err();
        assert!(matches!(err, BaselineError::SchemaMismatch(99, 1)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = BaselineStats::load_from_file(Path::new("/nonexistent/engine.json")).unwrap_err();
        assert!(matches!(err, BaselineError::Io(_, _)));
    }

    #[test]
    fn test_registry_requires_every_subsystem() {
        let err = BaselineRegistry::from_tables(vec![engine_stats()]).unwrap_err();
        assert!(matches!(err, BaselineError::Missing(Subsystem::Battery)));
    }

    #[test]
    fn test_registry_rejects_mislabelled_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("battery.json");
        engine_stats().save_to_file(&path).unwrap();

        let err = BaselineRegistry::load(vec![(Subsystem::Battery, path)], STD_EPSILON).unwrap_err();
        assert!(matches!(
            err,
            BaselineError::SubsystemMismatch {
                expected: Subsystem::Battery,
                found: Subsystem::Engine
            }
        ));
    }
}
