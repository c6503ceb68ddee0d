//! REST API module using Axum
//!
//! Serves the scoring pipeline to a dashboard or monitoring client:
//! - `POST /predict` with `{"data": {<feature>: <number>, ...}}`
//! - `GET /health` liveness probe

pub mod envelope;
pub mod handlers;
mod routes;

pub use envelope::RequestError;
pub use handlers::{sample_from_payload, ApiState};

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;

/// Build the CORS layer from the configured origins.
///
/// `"*"` anywhere in the list allows any origin; otherwise only the listed
/// origins are allowed. Unparsable entries are skipped with a warning.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.iter().any(|o| o.trim() == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    info!(origins = ?origins, "CORS: allowing configured origins");
    base.allow_origin(AllowOrigin::list(allowed))
}

/// Create the complete application router.
///
/// The body limit is enforced by the `Bytes` extractor so an oversized
/// `/predict` body is rejected through the error envelope.
pub fn create_app(state: ApiState, server: &ServerConfig) -> Router {
    routes::api_routes(state)
        .layer(DefaultBodyLimit::max(server.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&server.cors_origins))
}
