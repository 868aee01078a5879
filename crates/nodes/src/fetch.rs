//! Fetch stage: full text for the top-K ranked sources.
//!
//! Failures are isolated per source. A source whose fetch fails gets a
//! placeholder body, so after this stage exactly `min(K, sources.len())`
//! sources carry content.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use pipeline::text::truncate_with_ellipsis;
use pipeline::{
    fallback, ContentFetcher, FetchedContent, PipelineError, ProviderError, ResearchState, Stage,
    StageKind, StateUpdate,
};
use tracing::{debug, info, instrument, warn};

/// Retrieves full text for the top-K sources, one concurrent call each.
pub struct FetchStage {
    fetcher: Arc<dyn ContentFetcher>,
    max_sources: usize,
    content_char_limit: usize,
}

impl FetchStage {
    /// `max_sources` is K; every stored body is cut to `content_char_limit`
    /// characters.
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        max_sources: usize,
        content_char_limit: usize,
    ) -> Self {
        Self {
            fetcher,
            max_sources,
            content_char_limit,
        }
    }
}

/// Maps a caught fetcher panic to a provider error.
fn flatten_panic(
    caught: std::thread::Result<Result<String, ProviderError>>,
) -> Result<String, ProviderError> {
    caught.unwrap_or_else(|_| {
        Err(ProviderError::InvalidResponse("content fetcher panicked".into()))
    })
}

#[async_trait]
impl Stage for FetchStage {
    fn kind(&self) -> StageKind {
        StageKind::Fetch
    }

    #[instrument(name = "fetch", skip_all, fields(k = self.max_sources))]
    async fn run(&self, state: &ResearchState) -> Result<StateUpdate, PipelineError> {
        let mut sources = state.sources.clone();
        let selected = sources.len().min(self.max_sources);

        // At most K calls exist, so at most K are in flight. A panicking
        // fetcher fails its own source only.
        let outcomes = join_all(sources[..selected].iter().enumerate().map(|(i, source)| {
            debug!(rank = i + 1, title = %source.title, "fetching");
            AssertUnwindSafe(self.fetcher.fetch(source.url.as_str()))
                .catch_unwind()
                .map(flatten_panic)
        }))
        .await;

        let mut errors = Vec::new();
        let mut fetched = Vec::with_capacity(selected);
        for (source, outcome) in sources.iter_mut().zip(outcomes) {
            let body = match outcome {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => {
                    warn!(url = %source.url, "fetch returned no readable text, using placeholder");
                    errors.push(format!("fetch {}: no readable content", source.url));
                    fallback::placeholder_content(source)
                }
                Err(e) => {
                    warn!(url = %source.url, error = %e, "fetch failed, using placeholder");
                    errors.push(format!("fetch {}: {e}", source.url));
                    fallback::placeholder_content(source)
                }
            };
            let content = truncate_with_ellipsis(&body, self.content_char_limit);

            fetched.push(FetchedContent {
                url: source.url.clone(),
                title: source.title.clone(),
                content: content.clone(),
            });
            source.content = Some(content);
        }

        info!(fetched = fetched.len(), failed = errors.len(), "sources fetched");

        Ok(StateUpdate {
            sources: Some(sources),
            fetched_content: Some(fetched),
            errors,
            ..StateUpdate::default()
        })
    }
}
