//! Final document assembly and report filename derivation.

use crate::text::truncate_chars;

/// Closing line of every stored report.
pub const REPORT_TRAILER: &str = "Generated by Research Assistant Agent";

/// Stem used when nothing usable remains of the query.
const FALLBACK_STEM: &str = "report";

/// Builds the stored document: heading, report body, references, trailer.
pub fn assemble_document(query: &str, report: &str, citations: &[String]) -> String {
    format!(
        "# Research Report: {query}\n\n{report}\n\n---\n\n\
         ## References\n\n{references}\n\n---\n{REPORT_TRAILER}\n",
        references = citations.join("\n"),
    )
}

/// Derives a deterministic, path-safe filename from the query.
///
/// Lowercases, turns spaces into underscores, drops every character that is
/// not alphanumeric, `_` or `-` (so separators and dots cannot escape the
/// storage directory), caps the stem at `max_len` characters, and appends
/// `.extension`.
pub fn derive_filename(query: &str, max_len: usize, extension: &str) -> String {
    let normalised: String = query
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect();

    let stem = match truncate_chars(&normalised, max_len) {
        "" => FALLBACK_STEM,
        stem => stem,
    };
    format!("{stem}.{}", extension.trim_start_matches('.'))
}
