//! Postcraft API Library
//!
//! HTTP surface of the postcraft backend: the edit proxy endpoint, the
//! health endpoint, and application setup.

mod handlers;
mod telemetry;

pub mod error;
pub mod setup;
pub mod state;

pub use error::ErrorResponse;
pub use telemetry::init_telemetry;
