//! Research pipeline stage implementations and workflow executor.
//!
//! This crate provides the five stages (Planning through Output), the prompts
//! the language-model stages send, and the [`ResearchWorkflow`]
//! that drives them in order.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Stages sequence calls between the pure algorithms
//! in the [`pipeline`] crate and the provider traits (language model, search,
//! fetch, storage). Provider failures are turned into fallback values here;
//! the parsing, ranking, and formatting rules themselves live in [`pipeline`].
//!
//! ## Stage order
//!
//! | Stage | Reads | Writes |
//! |-------|-------|--------|
//! | [`PlanningStage`] | query | subtopics, search strategy |
//! | [`SearchStage`] | query, subtopics | search queries, sources |
//! | [`FetchStage`] | sources | source content, fetched content |
//! | [`SynthesisStage`] | query, subtopics, sources | report, citations |
//! | [`OutputStage`] | query, report, citations | output path |

pub mod executor;
pub mod fetch;
pub mod output;
pub mod planning;
pub mod prompts;
pub mod search;
pub mod synthesis;

pub use executor::{Providers, ResearchWorkflow};
pub use fetch::FetchStage;
pub use output::OutputStage;
pub use planning::PlanningStage;
pub use search::SearchStage;
pub use synthesis::SynthesisStage;
