// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::DirectoryConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &DirectoryConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Whether a failed attempt is worth repeating.
pub fn is_retryable(status: Option<reqwest::StatusCode>) -> bool {
    match status {
        // Transport failure: connect, timeout, reset.
        None => true,
        Some(status) => status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS,
    }
}
