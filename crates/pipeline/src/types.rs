//! Shared value types for the research pipeline.
//!
//! Unlike the identifiers in [`crate::identifiers`], these types carry values
//! with invariants (scores are finite) or name positions in the fixed stage
//! sequence.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Relevance
// ---------------------------------------------------------------------------

/// Provider-assigned (or synthesised) relevance of a source. Higher is more
/// relevant.
///
/// Always finite, which makes the ordering total and the ranking sort
/// deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceScore(f64);

impl RelevanceScore {
    /// Creates a [`RelevanceScore`], returning `None` for NaN or infinite values.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Returns the score as an `f64`.
    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl Eq for RelevanceScore {}

impl PartialOrd for RelevanceScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RelevanceScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::fmt::Display for RelevanceScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Stage sequence
// ---------------------------------------------------------------------------

/// The five stages of a research run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Decompose the query into subtopics and a search strategy.
    Planning,
    /// Fan out one search per subtopic, then rank and deduplicate.
    Search,
    /// Retrieve full text for the top-ranked sources.
    Fetch,
    /// Produce the narrative report and the citation list.
    Synthesis,
    /// Assemble and persist the final document.
    Output,
}

impl StageKind {
    /// The fixed transition table: every run visits these in order.
    pub const SEQUENCE: [StageKind; 5] = [
        StageKind::Planning,
        StageKind::Search,
        StageKind::Fetch,
        StageKind::Synthesis,
        StageKind::Output,
    ];

    /// The [`Step`] recorded once this stage's update has been merged.
    pub fn completed_step(self) -> Step {
        match self {
            StageKind::Planning => Step::PlanningComplete,
            StageKind::Search => Step::SearchComplete,
            StageKind::Fetch => Step::FetchComplete,
            StageKind::Synthesis => Step::SynthesisComplete,
            StageKind::Output => Step::Complete,
        }
    }

    /// Lowercase stage name used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Planning => "planning",
            StageKind::Search => "search",
            StageKind::Fetch => "fetch",
            StageKind::Synthesis => "synthesis",
            StageKind::Output => "output",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last completed stage of a run. Observability only; never drives control flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Freshly constructed; no stage has run.
    #[default]
    Init,
    PlanningComplete,
    SearchComplete,
    FetchComplete,
    SynthesisComplete,
    /// The output stage finished; the run reached its terminal state.
    Complete,
}
