//! Outbound side of the postcraft backend: the AI server client and the
//! retry policy that wraps it.

pub mod retry;
pub mod upstream;

pub use retry::{run_with_retry, RetryPolicy};
pub use upstream::{EditedImage, UpstreamClient, UpstreamError};
