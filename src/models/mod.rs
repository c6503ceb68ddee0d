//! Predictive model capabilities and their concrete artifacts.
//!
//! The scoring pipeline treats models as black boxes behind two traits:
//!
//! - [`Estimator`]: continuous output (remaining useful life in km)
//! - [`Classifier`]: probability of failure in [0, 1]
//!
//! Concrete implementations are loaded from JSON artifacts (see
//! [`ModelArtifact`]). Every artifact declares its ordered input features,
//! which is the vector layout the FeatureAssembler produces.

mod artifact;
mod forest;
mod linear;

pub use artifact::ModelArtifact;
pub use forest::{DecisionTree, ForestClassifier, ForestRegressor, TreeEnsemble, TreeNode};
pub use linear::{LinearModel, LinearRegressor, LogisticClassifier};

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("feature length mismatch: got {got}, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("model produced a non-finite output")]
    NonFiniteOutput,

    #[error("input feature {0} is not a finite number")]
    NonFiniteInput(usize),

    #[error("malformed model: {0}")]
    Malformed(String),

    #[error("unknown input feature in model: {0}")]
    UnknownFeature(String),

    #[error("model artifact is a {found} model, expected {expected}")]
    WrongKind { expected: &'static str, found: &'static str },

    #[error("model artifact I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("model artifact parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("model invocation failed: {0}")]
    Invocation(String),
}

/// Continuous predictor, e.g. remaining useful life in km.
pub trait Estimator: Send + Sync + fmt::Debug {
    /// Ordered input feature names.
    fn features(&self) -> &[String];

    fn estimate(&self, x: &[f64]) -> Result<f64, ModelError>;
}

/// Binary failure classifier.
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Ordered input feature names.
    fn features(&self) -> &[String];

    /// Probability that the subsystem fails.
    fn failure_probability(&self, x: &[f64]) -> Result<f64, ModelError>;
}

/// Shared input validation for the bundled model kinds.
pub(crate) fn check_input(x: &[f64], expected: usize) -> Result<(), ModelError> {
    if x.len() != expected {
        return Err(ModelError::DimensionMismatch {
            expected,
            got: x.len(),
        });
    }
    if let Some(i) = x.iter().position(|v| !v.is_finite()) {
        return Err(ModelError::NonFiniteInput(i));
    }
    Ok(())
}
