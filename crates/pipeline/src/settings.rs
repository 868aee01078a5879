//! Tunable limits for a research run.
//!
//! Loaded by the composition root from the `[research]` configuration section;
//! every field has a default so a partial section is valid.

use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// Marker appended to any text cut short by a character cap.
pub const ELLIPSIS: &str = "...";

/// Fixed limits that shape every stage of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchSettings {
    /// Maximum number of subtopics kept from the planner's answer.
    pub max_subtopics: usize,
    /// Total search result budget, split evenly across subtopics.
    pub total_search_results: usize,
    /// K: how many top-ranked sources are fetched and cited.
    pub max_sources_to_fetch: usize,
    /// Character cap on fetched source content.
    pub content_char_limit: usize,
    /// Character budget per source in the synthesis context block.
    pub context_chars_per_source: usize,
    /// Character cap on the derived report filename stem.
    pub filename_max_len: usize,
    /// Extension appended to the report filename, without the dot.
    pub report_extension: String,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            max_subtopics: 5,
            total_search_results: 10,
            max_sources_to_fetch: 3,
            content_char_limit: 5000,
            context_chars_per_source: 500,
            filename_max_len: 50,
            report_extension: "md".to_string(),
        }
    }
}

impl ResearchSettings {
    /// Rejects settings that would make a stage meaningless.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let zero_caps = [
            ("max_sources_to_fetch", self.max_sources_to_fetch),
            ("total_search_results", self.total_search_results),
            ("content_char_limit", self.content_char_limit),
            ("filename_max_len", self.filename_max_len),
        ];
        if let Some((name, _)) = zero_caps.iter().find(|(_, value)| *value == 0) {
            return Err(PipelineError::configuration(format!(
                "research.{name} must be greater than zero"
            )));
        }

        let ext = self.report_extension.trim_start_matches('.');
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PipelineError::configuration(format!(
                "research.report_extension '{}' must be a non-empty alphanumeric extension",
                self.report_extension
            )));
        }
        Ok(())
    }
}
