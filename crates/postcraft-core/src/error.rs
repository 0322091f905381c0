//! Error types module
//!
//! All failures surfaced to API callers are unified under [`AppError`]. Each
//! variant maps to exactly one machine-readable code and HTTP status; the
//! `AI_SERVER_ERROR` variant instead forwards the upstream's own status.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for upstream conditions outside our control
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented.
/// This trait allows errors to self-describe their HTTP response characteristics.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "AI_SERVER_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing summary (the `error` field of the JSON body)
    fn client_message(&self) -> String;

    /// Client-facing explanation (the `message` field of the JSON body)
    fn client_detail(&self) -> String;

    /// Upstream status to echo in the body, when one exists
    fn upstream_status(&self) -> Option<u16>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("AI server URL is not configured")]
    UpstreamNotConfigured,

    #[error("AI server URL is not valid")]
    UpstreamInvalidUrl,

    #[error("Request to the AI server timed out")]
    UpstreamTimeout,

    #[error("Could not connect to the AI server: {0}")]
    UpstreamUnreachable(String),

    #[error("AI server returned status {status}")]
    UpstreamRejected { status: u16, body: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Pulls a human-readable message out of an upstream error body.
///
/// The upstream may answer with a JSON object carrying an `error` or
/// `message` field; anything else (HTML, plain text, truncated JSON) falls
/// back to the generic message. This must never fail.
fn extract_upstream_message(body: &str) -> String {
    const FALLBACK: &str = "Failed to communicate with the AI server";

    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| FALLBACK.to_string())
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::UpstreamNotConfigured => 503,
            AppError::UpstreamInvalidUrl => 503,
            AppError::UpstreamTimeout => 504,
            AppError::UpstreamUnreachable(_) => 503,
            AppError::UpstreamRejected { status, .. } => *status,
            AppError::Internal(_) => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::UpstreamNotConfigured => "AI_SERVER_NOT_CONFIGURED",
            AppError::UpstreamInvalidUrl => "AI_SERVER_INVALID_URL",
            AppError::UpstreamTimeout => "TIMEOUT",
            AppError::UpstreamUnreachable(_) => "CONNECTION_FAILED",
            AppError::UpstreamRejected { .. } => "AI_SERVER_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::UpstreamNotConfigured => "AI server URL is not configured".to_string(),
            AppError::UpstreamInvalidUrl => "AI server is not configured properly".to_string(),
            AppError::UpstreamTimeout => "The AI server took too long to respond".to_string(),
            AppError::UpstreamUnreachable(_) => "Could not connect to the AI server".to_string(),
            AppError::UpstreamRejected { body, .. } => extract_upstream_message(body),
            AppError::Internal(_) => "An unexpected error occurred".to_string(),
        }
    }

    fn client_detail(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::UpstreamNotConfigured => {
                "Please contact the administrator to set COLAB_AI_SERVER_URL in the server configuration"
                    .to_string()
            }
            AppError::UpstreamInvalidUrl => {
                "Please contact the administrator to configure the COLAB_AI_SERVER_URL".to_string()
            }
            AppError::UpstreamTimeout => {
                "The request timed out after multiple retries. Please try again with a simpler prompt or smaller image."
                    .to_string()
            }
            AppError::UpstreamUnreachable(_) => {
                "The AI server is not reachable. It may be offline or the URL may be incorrect."
                    .to_string()
            }
            AppError::UpstreamRejected { status, .. } => {
                format!("The AI server returned an error (Status: {})", status)
            }
            AppError::Internal(_) => {
                "Please try again later or contact support if the problem persists.".to_string()
            }
        }
    }

    fn upstream_status(&self) -> Option<u16> {
        match self {
            AppError::UpstreamRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::Validation(_) => LogLevel::Debug,
            AppError::UpstreamNotConfigured | AppError::UpstreamInvalidUrl => LogLevel::Warn,
            AppError::UpstreamTimeout
            | AppError::UpstreamUnreachable(_)
            | AppError::UpstreamRejected { .. } => LogLevel::Warn,
            AppError::Internal(_) => LogLevel::Error,
        }
    }
}
