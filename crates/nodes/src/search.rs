//! Search stage: one search per subtopic, pooled, ranked, and deduplicated.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use pipeline::ranking::{compose_query, hits_to_sources, per_query_budget, rank_and_dedup};
use pipeline::{
    fallback, PipelineError, ResearchState, SearchProvider, Stage, StageKind, StateUpdate,
};
use tracing::{debug, info, instrument, warn};

/// Runs one search per subtopic and pools the hits into a ranked,
/// duplicate-free source list.
///
/// A failed search is replaced by synthetic hits for that query only.
pub struct SearchStage {
    search: Arc<dyn SearchProvider>,
    total_results: usize,
}

impl SearchStage {
    /// `total_results` is split evenly across the subtopics, at least one each.
    pub fn new(search: Arc<dyn SearchProvider>, total_results: usize) -> Self {
        Self {
            search,
            total_results,
        }
    }
}

#[async_trait]
impl Stage for SearchStage {
    fn kind(&self) -> StageKind {
        StageKind::Search
    }

    #[instrument(name = "search", skip_all, fields(subtopics = state.subtopics.len()))]
    async fn run(&self, state: &ResearchState) -> Result<StateUpdate, PipelineError> {
        let queries: Vec<String> = state
            .subtopics
            .iter()
            .map(|topic| compose_query(state.query(), topic))
            .collect();

        let Some(per_query) = per_query_budget(self.total_results, queries.len()) else {
            info!("no subtopics to search");
            return Ok(StateUpdate {
                search_queries: Some(queries),
                sources: Some(Vec::new()),
                ..StateUpdate::default()
            });
        };

        // join_all yields results in input order, so the pool is assembled in
        // subtopic order whatever order the calls complete in.
        let outcomes = join_all(queries.iter().map(|q| {
            debug!(query = %q, max_results = per_query, "searching");
            self.search.search(q, per_query)
        }))
        .await;

        let mut errors = Vec::new();
        let mut pool = Vec::new();
        for (query, outcome) in queries.iter().zip(outcomes) {
            let hits = match outcome {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(query = %query, error = %e, "search failed, using synthetic results");
                    errors.push(format!("search '{query}': {e}"));
                    fallback::synthetic_hits(query, per_query)
                }
            };
            let (sources, rejected) = hits_to_sources(hits);
            errors.extend(rejected.into_iter().map(|r| format!("search '{query}': {r}")));
            pool.extend(sources);
        }

        let raw = pool.len();
        let sources = rank_and_dedup(pool);
        info!(raw, unique = sources.len(), "sources ranked");

        Ok(StateUpdate {
            search_queries: Some(queries),
            sources: Some(sources),
            errors,
            ..StateUpdate::default()
        })
    }
}
