//! API route handlers
//!
//! - `POST /predict`: score one telemetry sample
//! - `GET /health`: liveness probe

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::envelope::RequestError;
use crate::scoring::Orchestrator;
use crate::types::{HealthReport, Strategy, Subsystem, TelemetrySample};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Debug, Clone)]
pub struct ApiState {
    /// Scoring pipeline, loaded once at startup
    pub orchestrator: Arc<Orchestrator>,
    /// Reject payloads with keys outside the recognized feature list
    pub reject_unrecognized: bool,
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl ApiState {
    pub fn new(orchestrator: Arc<Orchestrator>, reject_unrecognized: bool) -> Self {
        Self {
            orchestrator,
            reject_unrecognized,
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }
}

// ============================================================================
// Predict
// ============================================================================

/// Extract the telemetry sample from a `{"data": {...}}` payload.
pub fn sample_from_payload(
    payload: &Value,
    reject_unrecognized: bool,
) -> Result<TelemetrySample, RequestError> {
    let data = payload
        .get("data")
        .and_then(Value::as_object)
        .ok_or(RequestError::MissingData)?;

    let parsed = TelemetrySample::from_json_map(data)?;
    if reject_unrecognized {
        return Ok(parsed.reject_unrecognized()?);
    }
    if !parsed.unrecognized.is_empty() {
        debug!(keys = ?parsed.unrecognized, "Ignoring unrecognized telemetry keys");
    }
    Ok(parsed.sample)
}

/// POST /predict
pub async fn predict(
    State(state): State<ApiState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<HealthReport>, RequestError> {
    let payload: Value = serde_json::from_slice(&body?)?;
    let sample = sample_from_payload(&payload, state.reject_unrecognized)?;
    info!(fields = sample.present_count(), "Received prediction request");

    let report = state.orchestrator.score(&sample)?;
    for subsystem in Subsystem::ALL {
        if report.get(subsystem).is_degraded() {
            warn!(%subsystem, "Responding with a degraded subsystem report");
        }
    }
    Ok(Json(report))
}

// ============================================================================
// Liveness
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: &'static str,
    pub models_loaded: bool,
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub subsystems: BTreeMap<Subsystem, Strategy>,
}

/// GET /health
///
/// The service only starts serving once every model is loaded, so
/// `models_loaded` is always true here.
pub async fn health_check(State(state): State<ApiState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok",
        models_loaded: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: state.started_at,
        uptime_seconds: state.started.elapsed().as_secs(),
        subsystems: state.orchestrator.strategies().collect(),
    })
}
