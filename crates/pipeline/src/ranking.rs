//! Search fan-out budgeting, hit validation, and rank-then-deduplicate.

use std::collections::HashSet;

use crate::text::truncate_with_ellipsis;
use crate::{RelevanceScore, SearchHit, Source, SourceUrl};

/// Length of the snippet synthesised from provider content when a hit has none.
const SNIPPET_FROM_CONTENT_CHARS: usize = 200;

/// Composite search query for one subtopic.
pub fn compose_query(query: &str, subtopic: &str) -> String {
    format!("{} {}", query.trim(), subtopic.trim())
}

/// Results to request per subtopic: an even share of `total`, at least one.
///
/// Returns `None` when there are no subtopics, in which case no search is
/// issued at all.
pub fn per_query_budget(total: usize, subtopic_count: usize) -> Option<usize> {
    total.checked_div(subtopic_count).map(|share| share.max(1))
}

/// Converts provider hits into sources, returning the rejected hits' reasons
/// alongside.
///
/// A hit is rejected when its URL is blank or its score is not finite.
pub fn hits_to_sources(hits: Vec<SearchHit>) -> (Vec<Source>, Vec<String>) {
    let mut sources = Vec::with_capacity(hits.len());
    let mut rejected = Vec::new();

    for hit in hits {
        let Some(url) = SourceUrl::new(hit.url.trim()) else {
            rejected.push(format!("search hit '{}' has no URL", hit.title));
            continue;
        };
        let Some(relevance_score) = RelevanceScore::new(hit.score) else {
            rejected.push(format!("search hit {url} has non-finite score {}", hit.score));
            continue;
        };
        // Content is only ever set by the fetch stage; provider-supplied text
        // stands in for a missing snippet.
        let snippet = match (hit.snippet.trim().is_empty(), hit.content) {
            (true, Some(content)) => truncate_with_ellipsis(&content, SNIPPET_FROM_CONTENT_CHARS),
            _ => hit.snippet,
        };
        sources.push(Source {
            url,
            title: hit.title,
            snippet,
            content: None,
            relevance_score,
        });
    }

    (sources, rejected)
}

/// Ranks pooled candidates by descending relevance, then keeps the first
/// (highest-scoring) occurrence of each URL.
///
/// The sort is stable, so equal scores keep discovery order. The output is
/// therefore independent of the order in which concurrent searches completed,
/// as long as the pool itself is assembled in subtopic order.
pub fn rank_and_dedup(mut candidates: Vec<Source>) -> Vec<Source> {
    candidates.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));

    let mut seen: HashSet<SourceUrl> = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|source| seen.insert(source.url.clone()))
        .collect()
}
