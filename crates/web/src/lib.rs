//! Research agent web infrastructure adapter.
//!
//! Implements [`pipeline::SearchProvider`] and [`pipeline::ContentFetcher`]
//! over HTTP, plus deterministic offline variants used when no search service
//! is configured or the fetch backend is set to `synthetic`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** The [`pipeline`] crate sees only the port traits;
//! everything about reqwest, HTML, and request shapes stays here. The
//! [`http`] module is also the transport layer of the `llm` adapters.

use std::sync::Arc;
use std::time::Duration;

use pipeline::{ContentFetcher, PipelineError, SearchProvider};
use serde::{Deserialize, Serialize};
use tracing::info;

pub mod fetch;
pub mod html;
pub mod http;
pub mod search;

pub use fetch::{HttpContentFetcher, SyntheticContentFetcher};
pub use search::{HttpSearchProvider, SyntheticSearchProvider};

/// `User-Agent` sent when the configuration names none.
pub const DEFAULT_USER_AGENT: &str = concat!("research-agent/", env!("CARGO_PKG_VERSION"));

/// The `[search]` configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// JSON search endpoint. Unset selects the synthetic provider.
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 15,
        }
    }
}

/// Where page text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchBackend {
    #[default]
    Http,
    Synthetic,
}

/// The `[fetch]` configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub backend: FetchBackend,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            backend: FetchBackend::Http,
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Picks the HTTP provider when an endpoint is configured, the synthetic one
/// otherwise.
pub fn build_search_provider(
    config: &SearchConfig,
    user_agent: &str,
) -> Result<Arc<dyn SearchProvider>, PipelineError> {
    match config.endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        Some(endpoint) => {
            info!(endpoint, "using HTTP search provider");
            let timeout = Duration::from_secs(config.timeout_secs);
            let provider = HttpSearchProvider::new(endpoint, timeout, user_agent)
                .map_err(|e| PipelineError::configuration(e.to_string()))?;
            Ok(Arc::new(provider))
        }
        None => {
            info!("no search endpoint configured; using synthetic search results");
            Ok(Arc::new(SyntheticSearchProvider))
        }
    }
}

/// `char_limit` is the per-source cap from the research settings.
pub fn build_content_fetcher(
    config: &FetchConfig,
    char_limit: usize,
) -> Result<Arc<dyn ContentFetcher>, PipelineError> {
    match config.backend {
        FetchBackend::Http => {
            let fetcher = HttpContentFetcher::new(
                Duration::from_secs(config.timeout_secs),
                &config.user_agent,
                char_limit,
            )
            .map_err(|e| PipelineError::configuration(e.to_string()))?;
            Ok(Arc::new(fetcher))
        }
        FetchBackend::Synthetic => {
            info!("using synthetic content fetcher");
            Ok(Arc::new(SyntheticContentFetcher))
        }
    }
}
