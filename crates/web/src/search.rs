//! Search adapters.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{fallback, ProviderError, SearchHit, SearchProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::http::{build_client, request_error, success_text};

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
}

/// Search services answer with either a bare list or a `results` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Bare(Vec<SearchHit>),
    Envelope { results: Vec<SearchHit> },
}

pub(crate) fn parse_response(body: &str) -> Result<Vec<SearchHit>, ProviderError> {
    let parsed: SearchResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("search response: {e}")))?;
    Ok(match parsed {
        SearchResponse::Bare(hits) | SearchResponse::Envelope { results: hits } => hits,
    })
}

/// Calls a JSON search endpoint: `POST {endpoint}` with
/// `{"query": .., "max_results": ..}`.
pub struct HttpSearchProvider {
    http: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpSearchProvider {
    pub fn new(endpoint: &str, timeout: Duration, user_agent: &str) -> Result<Self, ProviderError> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(ProviderError::Unconfigured("search endpoint is empty".into()));
        }
        Ok(Self {
            http: build_client(timeout, user_agent)?,
            endpoint: endpoint.to_string(),
            timeout,
        })
    }
}

#[async_trait]
impl SearchProvider for HttpSearchProvider {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&SearchRequest { query, max_results })
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;
        let body = success_text(resp, self.timeout).await?;

        let mut hits = parse_response(&body)?;
        hits.truncate(max_results);
        debug!(hits = hits.len(), "search returned");
        Ok(hits)
    }
}

/// Deterministic offline search: the same query always yields the same hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticSearchProvider;

#[async_trait]
impl SearchProvider for SyntheticSearchProvider {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        Ok(fallback::synthetic_hits(query, max_results))
    }
}
