//! Shared helpers for API integration tests.
//!
//! The AI server collaborator is an axum listener on an ephemeral port with
//! a scripted response sequence, so retry behavior can be observed from the
//! outside (attempt counts, forwarded statuses, recovery after failures).

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use axum_test::TestServer;
use postcraft_core::{Config, UpstreamConfig};

/// One scripted upstream response. Once the script is exhausted the
/// upstream keeps answering with `DEFAULT_IMAGE`.
#[derive(Clone)]
pub enum UpstreamStep {
    /// Answer with this status and body.
    Status(u16, &'static str),
    /// Answer with these bytes as a successful image.
    Image(&'static [u8]),
    /// Stall long enough to trip the client's per-attempt timeout.
    Hang,
}

pub const DEFAULT_IMAGE: &[u8] = b"\xff\xd8\xff\xe0default-jpeg";

pub struct TestUpstream {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl TestUpstream {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub async fn spawn_upstream(script: Vec<UpstreamStep>) -> TestUpstream {
    let script = Arc::new(Mutex::new(VecDeque::from(script)));
    let hits = Arc::new(AtomicUsize::new(0));

    let script_handle = script.clone();
    let hits_handle = hits.clone();
    let app = Router::new().route(
        "/",
        post(move || {
            let script = script_handle.clone();
            let hits = hits_handle.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                let step = script
                    .lock()
                    .expect("script lock")
                    .pop_front()
                    .unwrap_or(UpstreamStep::Image(DEFAULT_IMAGE));
                respond(step).await
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream");
    let addr = listener.local_addr().expect("upstream addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve upstream");
    });

    TestUpstream {
        url: format!("http://{}/", addr),
        hits,
    }
}

async fn respond(step: UpstreamStep) -> Response {
    match step {
        UpstreamStep::Status(status, body) => (
            StatusCode::from_u16(status).expect("script status"),
            body.to_string(),
        )
            .into_response(),
        UpstreamStep::Image(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/png")],
            bytes.to_vec(),
        )
            .into_response(),
        UpstreamStep::Hang => {
            tokio::time::sleep(Duration::from_secs(10)).await;
            StatusCode::OK.into_response()
        }
    }
}

/// Retry delay used by test configs; short enough for fast tests, long
/// enough that elapsed-time assertions are unambiguous.
pub const TEST_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Per-attempt timeout used by test configs; `Hang` steps exceed it.
pub const TEST_REQUEST_TIMEOUT: Duration = Duration::from_millis(500);

pub fn test_config(base_url: Option<String>) -> Config {
    Config {
        server_port: 0,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        max_file_size_bytes: 10 * 1024 * 1024,
        allowed_content_types: vec![
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "image/gif".to_string(),
            "image/webp".to_string(),
        ],
        upstream: UpstreamConfig {
            base_url,
            request_timeout: TEST_REQUEST_TIMEOUT,
            max_retries: 3,
            retry_delay: TEST_RETRY_DELAY,
        },
    }
}

pub fn setup_test_app(config: Config) -> TestServer {
    let (_state, router) = postcraft_api::setup::initialize_app(config).expect("initialize app");
    TestServer::new(router).expect("test server")
}
