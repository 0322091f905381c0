//! HTTP error response conversion
//!
//! Converts [`AppError`] into the JSON error body served to the wizard
//! frontend. Every failure carries a machine-readable `code` from the fixed
//! taxonomy plus a human-readable `message`; upstream AI server errors also
//! echo the upstream status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use postcraft_core::{AppError, ErrorMetadata, LogLevel};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Upstream status, present only for AI_SERVER_ERROR
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from postcraft-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

/// Helper function to log errors based on their log level
fn log_error(error: &AppError) {
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, code = code, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, code = code, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, code = code, "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = Json(ErrorResponse {
            error: app_error.client_message(),
            message: app_error.client_detail(),
            code: app_error.error_code().to_string(),
            status: app_error.upstream_status(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_into_response() {
        let response =
            HttpAppError(AppError::Validation("Prompt cannot be empty".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_rejected_forwards_upstream_status() {
        let response = HttpAppError(AppError::UpstreamRejected {
            status: 429,
            body: String::new(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_status_field_skipped_when_absent() {
        let body = ErrorResponse {
            error: "x".into(),
            message: "y".into(),
            code: "TIMEOUT".into(),
            status: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("status").is_none());
    }

    #[test]
    fn test_status_field_present_for_upstream_error() {
        let body = ErrorResponse {
            error: "x".into(),
            message: "y".into(),
            code: "AI_SERVER_ERROR".into(),
            status: Some(502),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], 502);
    }
}
