//! Request-level failures and the error envelope they render to.
//!
//! Every failure that prevents a `/predict` response is reported as
//! `{"error": "...", "engine": null, "battery": null, "brake": null}`, never as
//! a bare transport error.

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::warn;

use crate::scoring::PredictionFailure;
use crate::types::{ErrorEnvelope, SampleError};

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request body exceeds the configured size limit")]
    BodyTooLarge,

    #[error("failed to read request body: {0}")]
    UnreadableBody(String),

    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("request body must be an object with a 'data' object")]
    MissingData,

    #[error(transparent)]
    InvalidSample(#[from] SampleError),

    #[error(transparent)]
    Prediction(#[from] PredictionFailure),
}

impl RequestError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnreadableBody(_)
            | Self::MalformedBody(_)
            | Self::MissingData
            | Self::InvalidSample(_) => StatusCode::BAD_REQUEST,
            Self::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BytesRejection> for RequestError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::BodyTooLarge
        } else {
            Self::UnreadableBody(rejection.body_text())
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(status = status.as_u16(), error = %self, "Predict request failed");
        (status, Json(ErrorEnvelope::new(self.to_string()))).into_response()
    }
}
