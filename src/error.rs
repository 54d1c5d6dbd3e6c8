use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures surfaced by the chat and translation paths.
///
/// Every variant renders as `{"error": "<message>"}`; only
/// [`RelayError::InvalidArgument`] maps to a client error status.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{service} unavailable: {reason}")]
    ServiceUnavailable {
        service: &'static str,
        reason: String,
    },

    #[error("{provider} API error: {detail}")]
    Upstream {
        provider: &'static str,
        status: Option<u16>,
        detail: String,
    },

    #[error("Failed to parse {source_name} response: {reason}")]
    UpstreamParse {
        source_name: &'static str,
        reason: String,
    },

    #[error("{0} returned no response candidates")]
    EmptyResponse(&'static str),

    #[error("Unexpected reply shape from {provider}: {reason}")]
    UnexpectedReplyShape {
        provider: &'static str,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, RelayError>;

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
