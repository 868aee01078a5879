//! Core domain for the research agent.
//!
//! This crate holds the research state, the stage contract, the provider port
//! traits, and every deterministic algorithm the pipeline relies on. The
//! `nodes` crate wires these into stages; infrastructure crates implement the
//! ports.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | `SourceUrl`, `ReportLocation`, `RunId` |
//! | [`types`] | `RelevanceScore`, `StageKind`, `Step` |
//! | [`state`] | `Source`, `ResearchState`, `StateUpdate` |
//! | [`settings`] | `ResearchSettings` limits |
//! | [`errors`] | `ProviderError`, `PipelineError` |
//! | [`ports`] | Language model, search, fetch, and storage traits |
//! | [`stage`] | `Stage` trait and `CancellationFlag` |
//! | [`planning`] | Planner answer parsing |
//! | [`ranking`] | Search budget split, hit validation, rank + dedup |
//! | [`synthesis`] | Context block, citations, citation validation |
//! | [`report`] | Document assembly and filename derivation |
//! | [`fallback`] | Deterministic substitutes for failed providers |
//! | [`text`] | Character-based truncation |

pub mod errors;
pub mod fallback;
pub mod identifiers;
pub mod planning;
pub mod ports;
pub mod ranking;
pub mod report;
pub mod settings;
pub mod stage;
pub mod state;
pub mod synthesis;
pub mod text;
pub mod types;

// Re-export the shared vocabulary at the crate root for downstream crates.
pub use errors::{PipelineError, ProviderError};
pub use identifiers::{ReportLocation, RunId, SourceUrl};
pub use planning::ResearchPlan;
pub use ports::{
    CompletionRequest, ContentFetcher, LlmProvider, ReportStore, SearchHit, SearchProvider,
};
pub use settings::{ResearchSettings, ELLIPSIS};
pub use stage::{CancellationFlag, Stage};
pub use state::{FetchedContent, ResearchState, Source, StateUpdate};
pub use types::{RelevanceScore, StageKind, Step};
