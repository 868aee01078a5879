//! Parsing of the planner's two-section answer.
//!
//! Expected shape (anything before the first marker is ignored):
//!
//! ```text
//! SUBTOPICS:
//! 1. First subtopic
//! 2. Second subtopic
//!
//! SEARCH STRATEGY:
//! Free text, possibly over several lines.
//! ```

use serde::{Deserialize, Serialize};

/// Line marker introducing the subtopic list.
pub const SUBTOPICS_MARKER: &str = "SUBTOPICS:";
/// Line marker introducing the strategy text.
pub const STRATEGY_MARKER: &str = "SEARCH STRATEGY:";

/// Characters stripped from the front of a subtopic line.
const ENUMERATION_CHARS: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', '-', ')', ' ',
];

/// Outcome of the planning stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchPlan {
    pub subtopics: Vec<String>,
    pub strategy: String,
}

#[derive(Clone, Copy)]
enum Section {
    Preamble,
    Subtopics,
    Strategy,
}

/// Parses a planner response line by line.
///
/// A response with neither marker yields an empty plan; that is a valid
/// outcome, not an error. At most `max_subtopics` subtopics are kept.
pub fn parse_plan(response: &str, max_subtopics: usize) -> ResearchPlan {
    let mut plan = ResearchPlan::default();
    let mut strategy_lines: Vec<&str> = Vec::new();
    let mut section = Section::Preamble;

    for raw in response.lines() {
        let line = raw.trim();
        if line.contains(SUBTOPICS_MARKER) {
            section = Section::Subtopics;
            continue;
        }
        if line.contains(STRATEGY_MARKER) {
            section = Section::Strategy;
            continue;
        }
        if line.is_empty() {
            continue;
        }

        match section {
            Section::Preamble => {}
            Section::Subtopics => {
                let cleaned = line.trim_start_matches(ENUMERATION_CHARS).trim_end();
                if !cleaned.is_empty() {
                    plan.subtopics.push(cleaned.to_string());
                }
            }
            Section::Strategy => strategy_lines.push(line),
        }
    }

    plan.subtopics.truncate(max_subtopics);
    plan.strategy = strategy_lines.join(" ");
    plan
}
