//! HTTP error mapping
//!
//! Only request-fatal conditions reach here. Per-page failures are part of a
//! 200 payload and never become an `ApiError`.

use crate::ScoutError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    /// The crate-level failure behind the request
    Scout(ScoutError),

    /// The route exists but not for this method
    MethodNotAllowed(&'static str),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Scout(ScoutError::BadRequest(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Scout(ScoutError::BadRequest(_)) => StatusCode::BAD_REQUEST,
            Self::Scout(ScoutError::Provider(_)) => StatusCode::BAD_GATEWAY,
            Self::Scout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ScoutError> for ApiError {
    fn from(error: ScoutError) -> Self {
        Self::Scout(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::MethodNotAllowed(allowed) => json!({ "error": format!("{} only", allowed) }),
            Self::Scout(ScoutError::Provider(e)) => {
                json!({ "error": "Search provider fetch failed", "detail": e.to_string() })
            }
            Self::Scout(e) => json!({ "error": e.to_string() }),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = ?self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = ?self, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}
