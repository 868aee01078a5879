//! Content fetch adapters.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::text::truncate_with_ellipsis;
use pipeline::{fallback, ContentFetcher, ProviderError};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::html;
use crate::http::{build_client, ensure_success, request_error};

/// Downloads a page and reduces it to capped plain text.
pub struct HttpContentFetcher {
    http: Client,
    timeout: Duration,
    char_limit: usize,
}

impl HttpContentFetcher {
    pub fn new(
        timeout: Duration,
        user_agent: &str,
        char_limit: usize,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            http: build_client(timeout, user_agent)?,
            timeout,
            char_limit,
        })
    }
}

/// Turns a response body into readable text, capped at `char_limit`.
///
/// CPU-bound on large pages; call it off the async executor.
pub(crate) fn extract_text(content_type: Option<&str>, body: &str, char_limit: usize) -> String {
    let text = if html::looks_like_html(content_type, body) {
        html::html_to_text(body)
    } else {
        body.trim().to_string()
    };
    truncate_with_ellipsis(&text, char_limit)
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, ProviderError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;
        let resp = ensure_success(resp, self.timeout).await?;

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text().await.map_err(|e| request_error(e, self.timeout))?;
        let bytes = body.len();

        // A renderer panic fails this page only.
        let limit = self.char_limit;
        let declared = content_type.clone();
        let text =
            tokio::task::spawn_blocking(move || extract_text(declared.as_deref(), &body, limit))
                .await
                .map_err(|e| {
                    ProviderError::InvalidResponse(format!("could not render page: {e}"))
                })?;
        debug!(
            bytes,
            chars = text.chars().count(),
            content_type = content_type.as_deref().unwrap_or("unknown"),
            "page fetched"
        );
        Ok(text)
    }
}

/// Offline fetcher returning a fixed article body per URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticContentFetcher;

#[async_trait]
impl ContentFetcher for SyntheticContentFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ProviderError> {
        Ok(fallback::synthetic_article(url))
    }
}
