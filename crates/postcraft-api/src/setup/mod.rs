//! Application initialization

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::Result;
use postcraft_core::Config;

use crate::state::AppState;

/// Build the application state and router from a resolved configuration.
///
/// A missing or malformed upstream URL is logged here but does not block
/// startup; the health endpoint keeps reporting the condition.
pub fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    match (config.upstream.is_set(), config.upstream.validated_url()) {
        (false, _) => {
            tracing::error!(
                "COLAB_AI_SERVER_URL is not set; the /api/edit endpoint will not work until it is configured"
            );
        }
        (true, None) => {
            tracing::warn!(
                url = %config.upstream.base_url.as_deref().unwrap_or_default(),
                "COLAB_AI_SERVER_URL is invalid; the /api/edit endpoint may not work correctly"
            );
        }
        (true, Some(url)) => {
            tracing::info!(url = %url, "AI server URL configured");
        }
    }

    let state = Arc::new(AppState::new(config.clone())?);
    let router = routes::setup_routes(&config, state.clone())?;
    Ok((state, router))
}
