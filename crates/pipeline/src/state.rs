//! The research state threaded through every stage of a run.
//!
//! A [`ResearchState`] is created with only a query, then grown by merging one
//! [`StateUpdate`] per stage. Fields a stage does not touch are left as
//! `None` in its update and carried over unchanged; `errors` is the one
//! field that accumulates instead of being replaced.

use serde::{Deserialize, Serialize};

use crate::{RelevanceScore, ReportLocation, SourceUrl, Step};

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// One discovered document candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Identity key within a run.
    pub url: SourceUrl,
    /// Page title as reported by the search provider; used in citations.
    pub title: String,
    /// Short preview text from the search provider.
    pub snippet: String,
    /// Full text. `None` until the fetch stage fills it.
    pub content: Option<String>,
    /// Ranking key. Higher sorts first.
    pub relevance_score: RelevanceScore,
}

/// Flat record of one fetched source, mirroring the [`Source`] it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedContent {
    pub url: SourceUrl,
    pub title: String,
    /// Capped page text, or the placeholder written when the fetch failed.
    pub content: String,
}

// ---------------------------------------------------------------------------
// ResearchState
// ---------------------------------------------------------------------------

/// The single aggregate owned by one research run.
///
/// The query is fixed at construction; everything else starts empty and is
/// filled in by stage updates via [`ResearchState::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchState {
    query: String,
    /// Ordered subtopics from planning (0 to `max_subtopics` entries).
    pub subtopics: Vec<String>,
    /// Advisory free text from planning.
    pub search_strategy: String,
    /// One composite query per subtopic, in subtopic order.
    pub search_queries: Vec<String>,
    /// Deduplicated sources ranked by descending relevance.
    pub sources: Vec<Source>,
    pub fetched_content: Vec<FetchedContent>,
    /// Narrative report; may contain `[Source N]` markers.
    pub synthesized_report: String,
    /// Formatted references, index-aligned with the ranked sources used for
    /// synthesis.
    pub citations: Vec<String>,
    /// Set only once the report has been stored.
    pub output_path: Option<ReportLocation>,
    /// Non-fatal provider failures recorded by stage fallbacks.
    pub errors: Vec<String>,
    pub current_step: Step,
}

impl ResearchState {
    /// Creates the initial state for `query` with every other field empty.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            subtopics: Vec::new(),
            search_strategy: String::new(),
            search_queries: Vec::new(),
            sources: Vec::new(),
            fetched_content: Vec::new(),
            synthesized_report: String::new(),
            citations: Vec::new(),
            output_path: None,
            errors: Vec::new(),
            current_step: Step::Init,
        }
    }

    /// The research query this run was created for.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Merges a stage's partial update into this state.
    ///
    /// `Some` fields replace the current value; `None` fields leave it alone.
    /// Errors are appended.
    pub fn apply(&mut self, update: StateUpdate) {
        let StateUpdate {
            subtopics,
            search_strategy,
            search_queries,
            sources,
            fetched_content,
            synthesized_report,
            citations,
            output_path,
            errors,
            current_step,
        } = update;

        if let Some(v) = subtopics {
            self.subtopics = v;
        }
        if let Some(v) = search_strategy {
            self.search_strategy = v;
        }
        if let Some(v) = search_queries {
            self.search_queries = v;
        }
        if let Some(v) = sources {
            self.sources = v;
        }
        if let Some(v) = fetched_content {
            self.fetched_content = v;
        }
        if let Some(v) = synthesized_report {
            self.synthesized_report = v;
        }
        if let Some(v) = citations {
            self.citations = v;
        }
        if let Some(v) = output_path {
            self.output_path = Some(v);
        }
        if let Some(v) = current_step {
            self.current_step = v;
        }
        self.errors.extend(errors);
    }

    /// Serialises the state as pretty-printed JSON for read-only consumers.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ---------------------------------------------------------------------------
// StateUpdate
// ---------------------------------------------------------------------------

/// Partial update returned by a stage. Build with struct-update syntax:
///
/// ```
/// use pipeline::StateUpdate;
///
/// let update = StateUpdate {
///     search_strategy: Some("start broad".to_string()),
///     ..StateUpdate::default()
/// };
/// assert!(update.subtopics.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub subtopics: Option<Vec<String>>,
    pub search_strategy: Option<String>,
    pub search_queries: Option<Vec<String>>,
    pub sources: Option<Vec<Source>>,
    pub fetched_content: Option<Vec<FetchedContent>>,
    pub synthesized_report: Option<String>,
    pub citations: Option<Vec<String>>,
    pub output_path: Option<ReportLocation>,
    /// Appended to [`ResearchState::errors`].
    pub errors: Vec<String>,
    /// Normally left `None`; the executor stamps the completed step itself.
    pub current_step: Option<Step>,
}
