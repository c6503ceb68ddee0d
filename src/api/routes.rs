//! API route definitions
//!
//! - /predict - score one telemetry sample (POST)
//! - /health - liveness probe (GET)

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, ApiState};

pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health_check))
        .with_state(state)
}
