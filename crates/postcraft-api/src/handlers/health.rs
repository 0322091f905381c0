//! Health check endpoint.
//!
//! Reports process liveness plus the upstream configuration state so an
//! operator can tell a dead AI server URL apart from a dead backend.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub colab_server_url: Option<String>,
    pub colab_server_configured: bool,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let upstream = &state.config.upstream;
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
        colab_server_url: upstream.base_url.clone(),
        colab_server_configured: upstream.validated_url().is_some(),
    })
}
