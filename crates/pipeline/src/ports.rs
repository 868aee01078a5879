//! Port traits for the external collaborators of a research run.
//!
//! Infrastructure crates (`llm`, `web`, `storage`) implement these; stages
//! hold them as `Arc<dyn Trait>` handed in by the composition root. Every
//! method returns [`ProviderError`] on failure rather than panicking, and
//! implementations must be safe to share across concurrent runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ProviderError, ReportLocation};

// ---------------------------------------------------------------------------
// Language model
// ---------------------------------------------------------------------------

/// One text-completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Fully rendered prompt text.
    pub prompt: String,
    /// Sampling temperature in `[0.0, 1.0]`.
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature,
        }
    }
}

/// Text completion. No streaming.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider label for logs (e.g. `"openai:gpt-4-turbo-preview"`).
    fn name(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Raw search result as returned by a [`SearchProvider`], before validation.
///
/// The search stage turns hits into [`crate::Source`]s, dropping any with an
/// empty URL or a non-finite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(alias = "relevance_score")]
    pub score: f64,
}

/// Web search, backed by a real API or by a deterministic local generator.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<SearchHit>, ProviderError>;
}

// ---------------------------------------------------------------------------
// Content fetch
// ---------------------------------------------------------------------------

/// Retrieves readable text for a URL.
///
/// Implementations apply their own time bound, strip non-content markup, and
/// cap the length. Failures are returned, not hidden: the fetch stage owns the
/// placeholder fallback.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ProviderError>;
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Persists a finished report.
///
/// Creates any missing containing location. Saving the same filename twice
/// overwrites.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn save(&self, content: &str, filename: &str) -> Result<ReportLocation, ProviderError>;
}
