//! Prompts for the two language-model stages.
//!
//! The planning prompt must keep asking for the `SUBTOPICS:` /
//! `SEARCH STRATEGY:` layout that [`pipeline::planning::parse_plan`] reads.

use pipeline::planning::{STRATEGY_MARKER, SUBTOPICS_MARKER};

/// Sampling temperature for planning.
pub const PLANNING_TEMPERATURE: f32 = 0.3;
/// Sampling temperature for synthesis.
pub const SYNTHESIS_TEMPERATURE: f32 = 0.7;

/// Builds the prompt asking for subtopics and a search strategy.
pub fn planning_prompt(query: &str) -> String {
    format!(
        "You are a research planning assistant. Given a research query, break it down \
         into 3-5 specific subtopics that should be investigated.\n\n\
         Research Query: {query}\n\n\
         Output your response in this exact format:\n\
         {SUBTOPICS_MARKER}\n\
         1. [First subtopic]\n\
         2. [Second subtopic]\n\
         3. [Third subtopic]\n\n\
         {STRATEGY_MARKER}\n\
         [Brief description of how to approach this research]"
    )
}

/// Builds the report-writing prompt.
///
/// `subtopics` and `sources` are the pre-formatted blocks from
/// [`pipeline::synthesis`].
pub fn synthesis_prompt(query: &str, subtopics: &str, sources: &str) -> String {
    format!(
        "You are a research analyst. Create a comprehensive research report based \
         on the following information.\n\n\
         Original Query: {query}\n\n\
         Subtopics Investigated:\n{subtopics}\n\n\
         Available Sources:\n{sources}\n\n\
         Generate a well-structured research report with:\n\
         1. Executive Summary\n\
         2. Detailed Findings (organized by subtopic)\n\
         3. Key Insights\n\
         4. Conclusion\n\n\
         Use [Source X] notation to cite sources throughout the report. \
         If no sources are listed, say so explicitly. Be factual and analytical."
    )
}
