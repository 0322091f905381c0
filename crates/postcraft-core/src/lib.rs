//! Core types for the postcraft backend: configuration and the error
//! taxonomy shared by the services and API crates.

pub mod config;
pub mod error;

pub use config::{Config, UpstreamConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};

/// Maximum prompt length accepted by the edit endpoint, in characters.
pub const MAX_PROMPT_CHARS: usize = 1000;
