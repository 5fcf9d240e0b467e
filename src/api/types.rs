//! Request and error types for the HTTP API.

use crate::dispatch::{DispatchFailure, FailureKind};
use crate::evaluation::RequestError;
use crate::upstream::FatalKind;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/score`.
///
/// Fields are optional at the serde level so a missing field yields a
/// 400 with a field name instead of a generic deserialization error.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    #[serde(default)]
    pub target: Option<String>,
    /// Bare base64 or a `data:<mime>;base64,` URI.
    #[serde(default)]
    pub image_data: Option<String>,
    /// Used when `imageData` has no data-URI prefix.
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// API error response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    fn with(message: &str, r#type: &str, code: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.to_string(),
                r#type: r#type.to_string(),
                code: Some(code.to_string()),
            },
        }
    }

    /// Create a bad request error (400).
    pub fn bad_request(message: &str) -> Self {
        Self::with(message, "invalid_request_error", "invalid_request_error")
    }

    /// Create a rate limit error (429).
    pub fn rate_limited(message: &str) -> Self {
        Self::with(message, "rate_limit_error", "rate_limited")
    }

    /// Create an internal server error (500).
    pub fn internal(message: &str) -> Self {
        Self::with(message, "server_error", "internal_error")
    }

    /// Create a malformed model response error (500).
    pub fn malformed_response(message: &str) -> Self {
        Self::with(message, "server_error", "malformed_response")
    }

    /// Create a bad gateway error (502).
    pub fn bad_gateway(message: &str) -> Self {
        Self::with(message, "server_error", "bad_gateway")
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.error.code.as_deref() {
            Some("invalid_request_error") => StatusCode::BAD_REQUEST,
            Some("rate_limited") => StatusCode::TOO_MANY_REQUESTS,
            Some("bad_gateway") => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

impl From<RequestError> for ApiError {
    fn from(e: RequestError) -> Self {
        ApiError::bad_request(&e.to_string())
    }
}

impl From<DispatchFailure> for ApiError {
    fn from(failure: DispatchFailure) -> Self {
        match failure.kind {
            FailureKind::Exhausted => ApiError::rate_limited(&format!(
                "All {} credentials are rate limited, try again later",
                failure.attempt_count()
            )),
            FailureKind::Malformed => ApiError::malformed_response(&format!(
                "Model reply could not be evaluated: {}",
                failure.last_reason
            )),
            FailureKind::Fatal(FatalKind::Unreachable | FatalKind::InvalidEnvelope) => {
                ApiError::bad_gateway(&failure.last_reason)
            }
            FailureKind::Fatal(FatalKind::Rejected { status }) if status >= 500 => {
                ApiError::bad_gateway(&failure.last_reason)
            }
            FailureKind::Fatal(FatalKind::Rejected { .. }) => {
                ApiError::internal(&failure.last_reason)
            }
        }
    }
}
