//! Locally generated substitutes used when a provider fails or is unconfigured.
//!
//! Every function here is deterministic: the same inputs always produce the
//! same output, so degraded runs stay reproducible.

use std::fmt::Write as _;

use crate::planning::ResearchPlan;
use crate::synthesis::CITATION_MARKER_PREFIX;
use crate::{SearchHit, Source};

/// Upper bound on synthetic hits per query.
const SYNTHETIC_HITS_MAX: usize = 5;

/// Plan used when the planner cannot be reached: no subtopics, no strategy.
pub fn empty_plan() -> ResearchPlan {
    ResearchPlan::default()
}

/// Deterministic search results for `query`.
///
/// Scores start at 0.8 and drop by 0.1 per rank. URLs embed a slug of the
/// query so different subtopic queries do not collapse into one another
/// during deduplication.
pub fn synthetic_hits(query: &str, max_results: usize) -> Vec<SearchHit> {
    let slug = slugify(query);
    (1..=max_results.min(SYNTHETIC_HITS_MAX))
        .map(|i| SearchHit {
            url: format!("https://example.com/{slug}/article-{i}"),
            title: format!("Article {i}: {query}"),
            snippet: format!(
                "This is a relevant article about {query}. \
                 It contains important information and insights."
            ),
            content: None,
            score: 0.9 - (i as f64 * 0.1),
        })
        .collect()
}

/// Body stored for a source whose content could not be fetched.
///
/// Never empty: it always carries the title and URL, plus the snippet when
/// there is one.
pub fn placeholder_content(source: &Source) -> String {
    let mut body = format!(
        "Full content of \"{}\" ({}) could not be retrieved.",
        source.title, source.url
    );
    if !source.snippet.trim().is_empty() {
        let _ = write!(body, " Preview: {}", source.snippet.trim());
    }
    body
}

/// Article text returned by the synthetic content fetcher.
pub fn synthetic_article(url: &str) -> String {
    format!(
        "# Full Article Content from {url}\n\n\
         This is the full content of the article. In a production environment, \
         this would be the actual scraped content from the web page.\n\n\
         ## Key Points:\n\
         - Important insight 1\n\
         - Important insight 2\n\
         - Important insight 3\n\n\
         The article provides detailed analysis and data supporting the research query."
    )
}

/// Report written when the language model cannot produce one.
///
/// Lists each source with its citation marker so the reference list still
/// lines up with the body.
pub fn source_digest_report(query: &str, subtopics: &[String], sources: &[Source]) -> String {
    let mut report = String::from("## Executive Summary\n\n");
    let _ = writeln!(
        report,
        "An automated summary for \"{query}\" could not be generated. \
         The material gathered for this query is listed below."
    );

    if !subtopics.is_empty() {
        report.push_str("\n## Subtopics Investigated\n\n");
        for topic in subtopics {
            let _ = writeln!(report, "- {topic}");
        }
    }

    report.push_str("\n## Sources\n\n");
    if sources.is_empty() {
        report.push_str("No sources were found for this query.\n");
    }
    for (i, source) in sources.iter().enumerate() {
        let _ = writeln!(
            report,
            "- {}{}] {}: {}",
            CITATION_MARKER_PREFIX,
            i + 1,
            source.title,
            source.snippet
        );
    }
    report
}

fn slugify(text: &str) -> String {
    let slug: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let collapsed = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if collapsed.is_empty() {
        "query".to_string()
    } else {
        collapsed
    }
}
