//! reqwest plumbing shared by every HTTP adapter in the workspace.

use std::time::Duration;

use pipeline::ProviderError;
use reqwest::{Client, Response};

/// Longest slice of an error body kept in a [`ProviderError::Status`].
const ERROR_DETAIL_CHARS: usize = 500;

/// Builds a client whose every request is bounded by `timeout`.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .pool_max_idle_per_host(2)
        .build()
        .map_err(|e| ProviderError::Transport(format!("failed to build HTTP client: {e}")))
}

/// Maps a reqwest failure onto the provider error taxonomy.
pub fn request_error(err: reqwest::Error, timeout: Duration) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(timeout)
    } else if err.is_decode() {
        ProviderError::InvalidResponse(err.to_string())
    } else {
        ProviderError::Transport(err.to_string())
    }
}

/// Fails a non-2xx response, keeping the head of its body as detail.
pub async fn ensure_success(
    resp: Response,
    timeout: Duration,
) -> Result<Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.map_err(|e| request_error(e, timeout))?;
    Err(ProviderError::Status {
        status: status.as_u16(),
        detail: body.chars().take(ERROR_DETAIL_CHARS).collect(),
    })
}

/// Body of a successful response as text.
pub async fn success_text(resp: Response, timeout: Duration) -> Result<String, ProviderError> {
    ensure_success(resp, timeout)
        .await?
        .text()
        .await
        .map_err(|e| request_error(e, timeout))
}
