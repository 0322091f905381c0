//! HTTP client for the upstream AI image-editing server.
//!
//! One call per attempt: the retry policy decides whether a failed attempt
//! is worth repeating, based on [`UpstreamError::is_transient`]. Statuses
//! below 500 are settled here (success or a terminal 4xx); 5xx responses,
//! connection failures, and timeouts are the transient class.

use bytes::Bytes;
use postcraft_core::{AppError, UpstreamConfig};
use reqwest::Client;
use tracing::debug;

/// Content type forced onto every successful edit result. The AI server
/// always renders JPEG regardless of the input format.
const RESULT_CONTENT_TYPE: &str = "image/jpeg";

/// A successfully edited image returned by the AI server.
#[derive(Debug, Clone)]
pub struct EditedImage {
    pub bytes: Bytes,
    pub content_type: String,
}

/// Failure of a single upstream attempt.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("request to the AI server timed out")]
    Timeout,

    #[error("could not connect to the AI server: {0}")]
    Connection(String),

    #[error("AI server returned status {status}")]
    Status { status: u16, body: String },

    #[error("upstream request failed: {0}")]
    Other(String),
}

impl UpstreamError {
    /// Whether another attempt could plausibly succeed: timeouts, failures
    /// to reach the host, and server-side (5xx) errors. Everything else is
    /// terminal and must not consume remaining attempts.
    pub fn is_transient(&self) -> bool {
        match self {
            UpstreamError::Timeout | UpstreamError::Connection(_) => true,
            UpstreamError::Status { status, .. } => *status >= 500,
            UpstreamError::Other(_) => false,
        }
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Timeout => AppError::UpstreamTimeout,
            UpstreamError::Connection(msg) => AppError::UpstreamUnreachable(msg),
            UpstreamError::Status { status, body } => AppError::UpstreamRejected { status, body },
            UpstreamError::Other(msg) => AppError::Internal(msg),
        }
    }
}

fn map_send_error(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else if err.is_connect() {
        UpstreamError::Connection(err.to_string())
    } else {
        UpstreamError::Other(err.to_string())
    }
}

/// Client for the configured AI image-editing endpoint.
///
/// Holds no per-request state; the per-attempt timeout comes from the
/// immutable startup configuration.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, anyhow::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Forward one edit request to the AI server.
    ///
    /// Builds a two-part multipart body (binary `image` with the original
    /// filename, text `prompt`) and POSTs it to the configured URL. The
    /// image bytes of any 2xx/3xx response are returned with the content
    /// type forced to `image/jpeg`; every other status becomes a
    /// [`UpstreamError::Status`] carrying the decoded response body.
    pub async fn send(
        &self,
        image: Bytes,
        filename: &str,
        prompt: &str,
    ) -> Result<EditedImage, UpstreamError> {
        let url = self
            .config
            .validated_url()
            .ok_or_else(|| UpstreamError::Other("AI server URL is not configured".to_string()))?;

        let image_part = reqwest::multipart::Part::bytes(image.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| UpstreamError::Other(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("image", image_part)
            .text("prompt", prompt.to_string());

        debug!(url = %url, filename = %filename, "POSTing edit request to AI server");

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if status.as_u16() < 400 {
            let bytes = response.bytes().await.map_err(map_send_error)?;
            Ok(EditedImage {
                bytes,
                content_type: RESULT_CONTENT_TYPE.to_string(),
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;

    /// Timeout for tests that should never trip it.
    const LONG_TIMEOUT: Duration = Duration::from_secs(30);

    fn test_config(base_url: &str, timeout: Duration) -> UpstreamConfig {
        UpstreamConfig {
            base_url: Some(base_url.to_string()),
            request_timeout: timeout,
            max_retries: 3,
            retry_delay: Duration::from_millis(10),
        }
    }

    async fn spawn_upstream(status: StatusCode, body: &'static [u8]) -> String {
        let app = Router::new().route("/", post(move || async move { (status, body) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[test]
    fn transiency_table() {
        assert!(UpstreamError::Timeout.is_transient());
        assert!(UpstreamError::Connection("refused".into()).is_transient());
        assert!(UpstreamError::Status {
            status: 500,
            body: String::new()
        }
        .is_transient());
        assert!(UpstreamError::Status {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(!UpstreamError::Status {
            status: 400,
            body: String::new()
        }
        .is_transient());
        assert!(!UpstreamError::Status {
            status: 429,
            body: String::new()
        }
        .is_transient());
        assert!(!UpstreamError::Other("oops".into()).is_transient());
    }

    #[tokio::test]
    async fn success_returns_bytes_with_jpeg_content_type() {
        let url = spawn_upstream(StatusCode::OK, b"\xff\xd8\xff\xe0fakejpeg").await;
        let client = UpstreamClient::new(test_config(&url, LONG_TIMEOUT)).unwrap();

        let result = client
            .send(Bytes::from_static(b"input"), "photo.png", "make it pop")
            .await
            .unwrap();

        assert_eq!(result.bytes.as_ref(), b"\xff\xd8\xff\xe0fakejpeg");
        assert_eq!(result.content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn client_error_is_terminal_with_body() {
        let url = spawn_upstream(StatusCode::UNPROCESSABLE_ENTITY, b"{\"error\":\"bad prompt\"}")
            .await;
        let client = UpstreamClient::new(test_config(&url, LONG_TIMEOUT)).unwrap();

        let err = client
            .send(Bytes::from_static(b"input"), "photo.png", "prompt")
            .await
            .unwrap_err();

        match err {
            UpstreamError::Status { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "{\"error\":\"bad prompt\"}");
                assert!(!UpstreamError::Status { status, body }.is_transient());
            }
            other => panic!("expected Status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let url = spawn_upstream(StatusCode::INTERNAL_SERVER_ERROR, b"boom").await;
        let client = UpstreamClient::new(test_config(&url, LONG_TIMEOUT)).unwrap();

        let err = client
            .send(Bytes::from_static(b"input"), "photo.png", "prompt")
            .await
            .unwrap_err();

        assert!(err.is_transient());
        match err {
            UpstreamError::Status { status, .. } => assert_eq!(status, 500),
            other => panic!("expected Status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn connection_refused_maps_to_connection_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}/", addr);
        let client = UpstreamClient::new(test_config(&url, LONG_TIMEOUT)).unwrap();

        let err = client
            .send(Bytes::from_static(b"input"), "photo.png", "prompt")
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Connection(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn slow_upstream_maps_to_timeout() {
        let app = Router::new().route(
            "/",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "too late"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let url = format!("http://{}/", addr);
        let client =
            UpstreamClient::new(test_config(&url, Duration::from_millis(100))).unwrap();

        let err = client
            .send(Bytes::from_static(b"input"), "photo.png", "prompt")
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Timeout));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn missing_url_is_internal_not_panic() {
        let config = UpstreamConfig {
            base_url: None,
            request_timeout: LONG_TIMEOUT,
            max_retries: 3,
            retry_delay: Duration::from_millis(10),
        };
        let client = UpstreamClient::new(config).unwrap();

        let err = client
            .send(Bytes::from_static(b"input"), "photo.png", "prompt")
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Other(_)));
        assert!(!err.is_transient());
    }
}
