//! Configuration module
//!
//! Resolves all tunables from the environment once at process start. The
//! upstream AI server URL is allowed to be missing or malformed: the process
//! still starts, the condition is logged by the caller and reported through
//! the health endpoint.

use std::env;
use std::time::Duration;

const SERVER_PORT: u16 = 3000;
const REQUEST_TIMEOUT_MS: u64 = 180_000;
const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 2_000;
const MAX_FILE_SIZE_MB: usize = 10;

/// Upstream AI server connection settings.
///
/// `base_url` is kept as the raw string from the environment; scheme
/// validation happens on demand via [`UpstreamConfig::validated_url`] so an
/// invalid value can be reported instead of rejected at startup.
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    pub base_url: Option<String>,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl UpstreamConfig {
    /// Returns the base URL when it is set and parses as http(s).
    pub fn validated_url(&self) -> Option<&str> {
        let raw = self.base_url.as_deref()?;
        match url::Url::parse(raw) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Some(raw),
            _ => None,
        }
    }

    /// True when a base URL is set, regardless of validity.
    pub fn is_set(&self) -> bool {
        self.base_url.is_some()
    }
}

/// Application configuration, immutable for the process lifetime.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub max_file_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
    pub upstream: UpstreamConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| "image/jpeg,image/png,image/gif,image/webp".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let upstream = UpstreamConfig {
            base_url: env::var("COLAB_AI_SERVER_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            request_timeout: Duration::from_millis(
                env::var("REQUEST_TIMEOUT")
                    .unwrap_or_else(|_| REQUEST_TIMEOUT_MS.to_string())
                    .parse()
                    .unwrap_or(REQUEST_TIMEOUT_MS),
            ),
            max_retries: env::var("MAX_RETRIES")
                .unwrap_or_else(|_| MAX_RETRIES.to_string())
                .parse()
                .unwrap_or(MAX_RETRIES),
            retry_delay: Duration::from_millis(
                env::var("RETRY_DELAY")
                    .unwrap_or_else(|_| RETRY_DELAY_MS.to_string())
                    .parse()
                    .unwrap_or(RETRY_DELAY_MS),
            ),
        };

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_content_types,
            upstream,
        };

        if config.is_production() && config.cors_origins.contains(&"*".to_string()) {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
