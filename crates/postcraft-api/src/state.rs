//! Application state shared across handlers.
//!
//! Everything in here is resolved once at startup and immutable afterwards;
//! handlers receive it behind an `Arc` and need no locking.

use postcraft_core::Config;
use postcraft_services::UpstreamClient;

pub struct AppState {
    pub config: Config,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let upstream = UpstreamClient::new(config.upstream.clone())?;
        Ok(Self { config, upstream })
    }
}
