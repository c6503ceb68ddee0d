//! Orchestrator - runs the scoring pipeline for all three subsystems.
//!
//! Each subsystem owns a [`SubsystemPipeline`]:
//!
//! ```text
//! sample → FeatureAssembler → Predictor ─┬→ HealthAggregator → SubsystemReport
//!                           └→ deviation ┘
//! ```
//!
//! Pipelines share nothing mutable, so [`Orchestrator::score`] takes `&self`
//! and can run concurrently from any number of request handlers.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::assembler::FeatureAssembler;
use super::deviation::deviation_score;
use super::health::HealthAggregator;
use super::predictor::{load_predictor, Prediction, PredictionFailure, Predictor};
use super::recommendation::BatteryReadings;
use crate::baseline::{BaselineError, BaselineRegistry, BaselineStats};
use crate::config::{FailurePolicy, ServiceConfig};
use crate::models::ModelError;
use crate::types::{HealthReport, Strategy, Subsystem, SubsystemReport, TelemetrySample};

/// Conditions that keep the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("baseline unavailable: {0}")]
    Baseline(#[from] BaselineError),

    #[error("{subsystem} model unavailable ({}): {source}", .path.display())]
    Model {
        subsystem: Subsystem,
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error("pipeline for {0} configured more than once")]
    DuplicatePipeline(Subsystem),

    #[error("no pipeline configured for {0}")]
    MissingPipeline(Subsystem),
}

/// Baseline, predictor and aggregation settings for one subsystem.
#[derive(Debug)]
pub struct SubsystemPipeline {
    subsystem: Subsystem,
    baseline: Arc<BaselineStats>,
    predictor: Box<dyn Predictor>,
    aggregator: HealthAggregator,
}

impl SubsystemPipeline {
    pub fn new(
        subsystem: Subsystem,
        baseline: Arc<BaselineStats>,
        predictor: Box<dyn Predictor>,
        deviation_scale: f64,
    ) -> Self {
        Self {
            subsystem,
            baseline,
            predictor,
            aggregator: HealthAggregator::new(subsystem, deviation_scale),
        }
    }

    pub const fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    pub fn strategy(&self) -> Strategy {
        self.predictor.strategy()
    }

    /// Score one sample. Only a classification failure under
    /// [`FailurePolicy::FailRequest`] is returned as an error.
    pub fn score(
        &self,
        sample: &TelemetrySample,
        policy: FailurePolicy,
    ) -> Result<SubsystemReport, PredictionFailure> {
        let subsystem = self.subsystem;
        let assembler = FeatureAssembler::new(&self.baseline);
        let assembled = assembler.assemble(sample, self.predictor.required_features());

        match self.predictor.predict(subsystem, &assembled.values) {
            Ok(Prediction::Rul(estimate)) => {
                let report = self.aggregator.rul_report(&estimate);
                info!(
                    %subsystem,
                    rul_km = report.rul_km,
                    health = report.health_percent,
                    status = %report.status,
                    fallback = report.fallback,
                    "Subsystem scored"
                );
                Ok(SubsystemReport::Rul(report))
            }
            Ok(Prediction::Risk(estimate)) => {
                let deviation = deviation_score(&self.baseline, &assembled);
                let readings = match subsystem {
                    Subsystem::Battery => BatteryReadings::resolve(&assembler, sample),
                    Subsystem::Engine | Subsystem::Brake => BatteryReadings::default(),
                };
                let report = self.aggregator.risk_report(estimate, deviation, &readings);
                info!(
                    %subsystem,
                    probability = estimate.probability,
                    deviation,
                    health = report.health_percent,
                    "Subsystem scored"
                );
                Ok(SubsystemReport::Risk(report))
            }
            Err(failure) => match policy {
                FailurePolicy::Isolate => {
                    warn!(%subsystem, error = %failure, "Prediction failed, reporting deviation health only");
                    let deviation = deviation_score(&self.baseline, &assembled);
                    Ok(SubsystemReport::Risk(
                        self.aggregator.degraded_report(deviation, &failure),
                    ))
                }
                FailurePolicy::FailRequest => {
                    warn!(%subsystem, error = %failure, "Prediction failed, aborting request");
                    Err(failure)
                }
            },
        }
    }
}

/// Runs all three subsystem pipelines for a sample.
#[derive(Debug)]
pub struct Orchestrator {
    engine: SubsystemPipeline,
    battery: SubsystemPipeline,
    brake: SubsystemPipeline,
    policy: FailurePolicy,
}

impl Orchestrator {
    /// Requires exactly one pipeline per subsystem.
    pub fn new(
        pipelines: impl IntoIterator<Item = SubsystemPipeline>,
        policy: FailurePolicy,
    ) -> Result<Self, StartupError> {
        let mut engine = None;
        let mut battery = None;
        let mut brake = None;

        for pipeline in pipelines {
            let slot = match pipeline.subsystem {
                Subsystem::Engine => &mut engine,
                Subsystem::Battery => &mut battery,
                Subsystem::Brake => &mut brake,
            };
            if slot.is_some() {
                return Err(StartupError::DuplicatePipeline(pipeline.subsystem));
            }
            *slot = Some(pipeline);
        }

        Ok(Self {
            engine: engine.ok_or(StartupError::MissingPipeline(Subsystem::Engine))?,
            battery: battery.ok_or(StartupError::MissingPipeline(Subsystem::Battery))?,
            brake: brake.ok_or(StartupError::MissingPipeline(Subsystem::Brake))?,
            policy,
        })
    }

    /// Load baselines and model artifacts named by `config`.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, StartupError> {
        let registry = BaselineRegistry::load(
            Subsystem::ALL.map(|s| (s, config.subsystems.get(s).baseline_path(s))),
            config.scoring.std_epsilon,
        )?;

        let mut pipelines = Vec::with_capacity(Subsystem::ALL.len());
        for subsystem in Subsystem::ALL {
            let sub = config.subsystems.get(subsystem);
            let path = sub.model_path(subsystem);
            let predictor = load_predictor(sub.strategy, &path, config.scoring.fallback_rul_km)
                .map_err(|source| StartupError::Model {
                    subsystem,
                    path: path.clone(),
                    source,
                })?;
            let baseline = registry.get(subsystem)?;

            let uncovered: Vec<&str> = predictor
                .required_features()
                .iter()
                .filter(|f| baseline.get(f).is_none())
                .map(String::as_str)
                .collect();
            if !uncovered.is_empty() {
                warn!(
                    %subsystem,
                    features = ?uncovered,
                    "Model features without baseline stats will default to 0.0 when missing"
                );
            }

            info!(
                %subsystem,
                strategy = %sub.strategy,
                model = %path.display(),
                features = predictor.required_features().len(),
                "Subsystem pipeline ready"
            );
            pipelines.push(SubsystemPipeline::new(
                subsystem,
                baseline,
                predictor,
                sub.deviation_scale(subsystem),
            ));
        }

        Self::new(pipelines, config.scoring.failure_policy)
    }

    pub const fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub const fn pipeline(&self, subsystem: Subsystem) -> &SubsystemPipeline {
        match subsystem {
            Subsystem::Engine => &self.engine,
            Subsystem::Battery => &self.battery,
            Subsystem::Brake => &self.brake,
        }
    }

    /// Configured strategy per subsystem, in response order.
    pub fn strategies(&self) -> impl Iterator<Item = (Subsystem, Strategy)> + '_ {
        Subsystem::ALL
            .into_iter()
            .map(|s| (s, self.pipeline(s).strategy()))
    }

    /// Score all three subsystems independently.
    pub fn score(&self, sample: &TelemetrySample) -> Result<HealthReport, PredictionFailure> {
        Ok(HealthReport {
            engine: self.engine.score(sample, self.policy)?,
            battery: self.battery.score(sample, self.policy)?,
            brake: self.brake.score(sample, self.policy)?,
        })
    }
}
