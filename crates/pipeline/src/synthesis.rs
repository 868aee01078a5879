//! Context building, citation numbering, and citation validation for the
//! synthesis stage.
//!
//! Citations are derived from the source list, never parsed out of the model's
//! answer, so `[Source i]` in the context always lines up with entry `i` of the
//! reference list.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::text::truncate_with_ellipsis;
use crate::Source;

/// Opening of an in-text citation marker, e.g. `[Source 2]`.
pub const CITATION_MARKER_PREFIX: &str = "[Source ";

static CITATION_MARKER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[Source (\d+)\]").ok());

/// Renders the bounded context block handed to the model.
///
/// Each source contributes its title and URL, then either its fetched content
/// capped at `chars_per_source` or, when nothing was fetched, its snippet.
pub fn build_context(sources: &[Source], chars_per_source: usize) -> String {
    let mut context = String::new();
    for (i, source) in sources.iter().enumerate() {
        let _ = writeln!(context, "[Source {}] {}", i + 1, source.title);
        let _ = writeln!(context, "URL: {}", source.url);
        match &source.content {
            Some(content) => {
                let _ = writeln!(
                    context,
                    "Content: {}",
                    truncate_with_ellipsis(content, chars_per_source)
                );
            }
            None => {
                let _ = writeln!(context, "Snippet: {}", source.snippet);
            }
        }
        context.push('\n');
    }
    context
}

/// Formats the subtopic list as `- item` lines.
pub fn format_subtopics(subtopics: &[String]) -> String {
    subtopics
        .iter()
        .map(|topic| format!("- {topic}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One reference entry per source, numbered from 1 in list order.
pub fn format_citations(sources: &[Source]) -> Vec<String> {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| format!("[{}] {} - {}", i + 1, source.title, source.url))
        .collect()
}

/// Every `[Source N]` number that appears in `report`, in order of appearance.
pub fn cited_indices(report: &str) -> Vec<usize> {
    let Some(re) = CITATION_MARKER.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(report)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect()
}

/// Citation numbers used in `report` that have no matching reference entry.
///
/// Sorted and deduplicated. The report itself is left unchanged; callers record
/// these as non-fatal findings.
pub fn dangling_citations(report: &str, citation_count: usize) -> Vec<usize> {
    let mut dangling: Vec<usize> = cited_indices(report)
        .into_iter()
        .filter(|n| *n == 0 || *n > citation_count)
        .collect();
    dangling.sort_unstable();
    dangling.dedup();
    dangling
}
