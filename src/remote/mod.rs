//! Clients for the remote services: text generation and the performance
//! vector index. Both are built from explicit config structs.

pub mod generation;
pub mod vector;

pub use generation::{GenerationRequest, TextGenerationClient, DEFAULT_RESPONSE_FEEDBACK};
pub use vector::{PerformanceVector, VectorInsightClient};

use std::time::Duration;

use crate::error::RemoteError;

/// Upper bound on connection setup, never longer than the request timeout
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP client whose requests give up after `timeout_secs`.
///
/// A stalled endpoint then surfaces as [`RemoteError::Request`] like any other
/// network failure.
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, RemoteError> {
    let timeout = Duration::from_secs(timeout_secs.max(1));
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(CONNECT_TIMEOUT_SECS)))
        .build()?;
    Ok(client)
}
