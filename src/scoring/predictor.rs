//! Subsystem predictors: the two interchangeable prediction strategies.
//!
//! - [`RegressionPredictor`] never fails: a model error is replaced by the
//!   configured fallback RUL and reported as such.
//! - [`ClassificationPredictor`] has no fallback: a model error or an
//!   out-of-range probability is returned as a [`PredictionFailure`].

use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use super::round_to;
use crate::config::defaults::{FAILURE_PROBABILITY_THRESHOLD, RUL_MAX_KM, RUL_MIN_KM};
use crate::models::{Classifier, Estimator, ModelArtifact, ModelError};
use crate::types::{Strategy, Subsystem};

#[derive(Debug, Error)]
pub enum PredictionFailure {
    #[error("{subsystem} model failed: {source}")]
    Model {
        subsystem: Subsystem,
        #[source]
        source: ModelError,
    },

    #[error("{subsystem} model returned probability {value}, outside [0, 1]")]
    InvalidProbability { subsystem: Subsystem, value: f64 },
}

impl PredictionFailure {
    pub const fn subsystem(&self) -> Subsystem {
        match self {
            Self::Model { subsystem, .. } | Self::InvalidProbability { subsystem, .. } => *subsystem,
        }
    }
}

/// Where a RUL estimate came from.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimateSource {
    Model,
    /// The model failed; `reason` is the failure message.
    Fallback { reason: String },
}

/// Clamped, rounded remaining useful life.
#[derive(Debug, Clone, PartialEq)]
pub struct RulEstimate {
    pub rul_km: f64,
    pub source: EstimateSource,
}

/// Failure probability and the derived flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskEstimate {
    pub probability: f64,
    pub failure_imminent: bool,
}

impl RiskEstimate {
    /// Flag is `probability > 0.5`, strictly.
    pub fn from_probability(probability: f64) -> Self {
        Self {
            probability,
            failure_imminent: probability > FAILURE_PROBABILITY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    Rul(RulEstimate),
    Risk(RiskEstimate),
}

/// Clamp a raw RUL to [0, 120] km and round to 2 decimals.
pub fn clamp_rul(raw_km: f64) -> f64 {
    round_to(raw_km.clamp(RUL_MIN_KM, RUL_MAX_KM), 2)
}

/// Prediction capability of one subsystem, independent of the model type.
pub trait Predictor: Send + Sync + fmt::Debug {
    fn strategy(&self) -> Strategy;

    /// Input features in the order `predict` expects them.
    fn required_features(&self) -> &[String];

    fn predict(&self, subsystem: Subsystem, x: &[f64]) -> Result<Prediction, PredictionFailure>;
}

/// Remaining-useful-life regression with a fixed fallback.
#[derive(Debug)]
pub struct RegressionPredictor {
    model: Box<dyn Estimator>,
    fallback_rul_km: f64,
}

impl RegressionPredictor {
    pub fn new(model: Box<dyn Estimator>, fallback_rul_km: f64) -> Self {
        Self {
            model,
            fallback_rul_km,
        }
    }

    /// Always yields an estimate; model errors become the fallback.
    pub fn estimate(&self, subsystem: Subsystem, x: &[f64]) -> RulEstimate {
        let raw = self.model.estimate(x).and_then(|v| {
            if v.is_finite() {
                Ok(v)
            } else {
                Err(ModelError::NonFiniteOutput)
            }
        });
        match raw {
            Ok(v) => RulEstimate {
                rul_km: clamp_rul(v),
                source: EstimateSource::Model,
            },
            Err(e) => {
                warn!(%subsystem, error = %e, fallback_km = self.fallback_rul_km, "RUL prediction failed, using fallback");
                RulEstimate {
                    rul_km: clamp_rul(self.fallback_rul_km),
                    source: EstimateSource::Fallback {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }
}

impl Predictor for RegressionPredictor {
    fn strategy(&self) -> Strategy {
        Strategy::RegressionRul
    }

    fn required_features(&self) -> &[String] {
        self.model.features()
    }

    fn predict(&self, subsystem: Subsystem, x: &[f64]) -> Result<Prediction, PredictionFailure> {
        Ok(Prediction::Rul(self.estimate(subsystem, x)))
    }
}

/// Failure-probability classification; failures propagate.
#[derive(Debug)]
pub struct ClassificationPredictor {
    model: Box<dyn Classifier>,
}

impl ClassificationPredictor {
    pub fn new(model: Box<dyn Classifier>) -> Self {
        Self { model }
    }
}

impl Predictor for ClassificationPredictor {
    fn strategy(&self) -> Strategy {
        Strategy::ClassificationRisk
    }

    fn required_features(&self) -> &[String] {
        self.model.features()
    }

    fn predict(&self, subsystem: Subsystem, x: &[f64]) -> Result<Prediction, PredictionFailure> {
        let probability = self
            .model
            .failure_probability(x)
            .map_err(|source| PredictionFailure::Model { subsystem, source })?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(PredictionFailure::InvalidProbability {
                subsystem,
                value: probability,
            });
        }
        Ok(Prediction::Risk(RiskEstimate::from_probability(probability)))
    }
}

/// Load the artifact at `path` and wrap it in the predictor for `strategy`.
pub fn load_predictor(
    strategy: Strategy,
    path: &Path,
    fallback_rul_km: f64,
) -> Result<Box<dyn Predictor>, ModelError> {
    let artifact = ModelArtifact::load(path)?;
    Ok(match strategy {
        Strategy::RegressionRul => Box::new(RegressionPredictor::new(
            artifact.into_estimator()?,
            fallback_rul_km,
        )),
        Strategy::ClassificationRisk => {
            Box::new(ClassificationPredictor::new(artifact.into_classifier()?))
        }
    })
}
