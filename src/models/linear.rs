//! Linear and logistic models.
//!
//! `linear`: `y = intercept + Σ wᵢxᵢ`
//! `logistic`: `p = σ(intercept + Σ wᵢxᵢ)`

use serde::{Deserialize, Serialize};

use super::{check_input, Classifier, Estimator, ModelError};

/// Weights and intercept over an ordered feature list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub features: Vec<String>,
    pub weights: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if self.weights.len() != self.features.len() {
            return Err(ModelError::Malformed(format!(
                "{} weights for {} features",
                self.weights.len(),
                self.features.len()
            )));
        }
        if !self.intercept.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(ModelError::Malformed("non-finite coefficient".to_string()));
        }
        Ok(())
    }

    fn linear_term(&self, x: &[f64]) -> Result<f64, ModelError> {
        check_input(x, self.features.len())?;
        let z = self.intercept + self.weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>();
        if z.is_finite() {
            Ok(z)
        } else {
            Err(ModelError::NonFiniteOutput)
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Linear regression used as an [`Estimator`].
#[derive(Debug, Clone)]
pub struct LinearRegressor(pub LinearModel);

impl Estimator for LinearRegressor {
    fn features(&self) -> &[String] {
        &self.0.features
    }

    fn estimate(&self, x: &[f64]) -> Result<f64, ModelError> {
        self.0.linear_term(x)
    }
}

/// Logistic regression used as a [`Classifier`].
#[derive(Debug, Clone)]
pub struct LogisticClassifier(pub LinearModel);

impl Classifier for LogisticClassifier {
    fn features(&self) -> &[String] {
        &self.0.features
    }

    fn failure_probability(&self, x: &[f64]) -> Result<f64, ModelError> {
        self.0.linear_term(x).map(sigmoid)
    }
}
