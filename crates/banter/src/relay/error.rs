//! Relay error responses
//!
//! The relay does not classify upstream failures; its own faults map onto a
//! small set of JSON error responses and everything else is relayed as-is.

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Faults raised by the relay itself (never by the upstream).
#[derive(Debug, Error)]
pub enum RelayError {
    /// The upstream target URL could not be assembled from the request path.
    #[error("invalid relay target: {0}")]
    Target(String),

    /// The upstream could not be reached or did not answer.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// The relayed response could not be assembled.
    #[error("relay internal error: {0}")]
    Internal(String),
}

impl RelayError {
    fn status(&self) -> StatusCode {
        match self {
            RelayError::Target(_) => StatusCode::BAD_REQUEST,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            RelayError::Target(_) => "invalid_target",
            RelayError::Upstream(_) => "upstream_unreachable",
            RelayError::Internal(_) => "relay_internal",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": {
                "type": self.error_type(),
                "message": self.to_string(),
            }
        });

        Response::builder()
            .status(self.status())
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}
