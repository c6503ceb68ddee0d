//! JSON model artifacts, tagged by `"kind"`.
//!
//! ```json
//! { "kind": "linear", "features": ["engine_temp_c", "engine_rpm"],
//!   "weights": [-0.4, 0.002], "intercept": 95.0 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use super::forest::{ForestClassifier, ForestRegressor, TreeEnsemble};
use super::linear::{LinearModel, LinearRegressor, LogisticClassifier};
use super::{Classifier, Estimator, ModelError};
use crate::types::is_recognized;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearModel),
    Logistic(LinearModel),
    ForestRegressor(TreeEnsemble),
    ForestClassifier(TreeEnsemble),
}

impl ModelArtifact {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Linear(_) => "linear",
            Self::Logistic(_) => "logistic",
            Self::ForestRegressor(_) => "forest_regressor",
            Self::ForestClassifier(_) => "forest_classifier",
        }
    }

    pub fn features(&self) -> &[String] {
        match self {
            Self::Linear(m) | Self::Logistic(m) => &m.features,
            Self::ForestRegressor(e) | Self::ForestClassifier(e) => &e.features,
        }
    }

    /// Structural checks: coefficient counts, tree links, recognized features.
    pub fn validate(&self) -> Result<(), ModelError> {
        if let Some(unknown) = self.features().iter().find(|f| !is_recognized(f)) {
            return Err(ModelError::UnknownFeature(unknown.clone()));
        }
        match self {
            Self::Linear(m) | Self::Logistic(m) => m.validate(),
            Self::ForestRegressor(e) | Self::ForestClassifier(e) => e.validate(),
        }
    }

    /// Read, parse and validate an artifact file.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let json =
            std::fs::read_to_string(path).map_err(|e| ModelError::Io(path.to_path_buf(), e))?;
        let artifact: Self =
            serde_json::from_str(&json).map_err(|e| ModelError::Parse(path.to_path_buf(), e))?;
        artifact.validate()?;
        info!(
            path = %path.display(),
            kind = artifact.kind(),
            features = artifact.features().len(),
            "Model artifact loaded"
        );
        Ok(artifact)
    }

    /// Continuous estimator, for the RUL-regression strategy.
    pub fn into_estimator(self) -> Result<Box<dyn Estimator>, ModelError> {
        match self {
            Self::Linear(m) => Ok(Box::new(LinearRegressor(m))),
            Self::ForestRegressor(e) => Ok(Box::new(ForestRegressor(e))),
            other => Err(ModelError::WrongKind {
                expected: "regression",
                found: other.kind(),
            }),
        }
    }

    /// Probability classifier, for the classification-risk strategy.
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, ModelError> {
        match self {
            Self::Logistic(m) => Ok(Box::new(LogisticClassifier(m))),
            Self::ForestClassifier(e) => Ok(Box::new(ForestClassifier(e))),
            other => Err(ModelError::WrongKind {
                expected: "classification",
                found: other.kind(),
            }),
        }
    }
}
