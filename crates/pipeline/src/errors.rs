//! Error types for the research pipeline domain.
//!
//! Two layers of failure exist:
//!
//! - [`ProviderError`] is returned by every port trait in [`crate::ports`]. It
//!   is always recoverable: the stage that receives it invokes a named fallback
//!   from [`crate::fallback`] and records the message in
//!   [`crate::ResearchState::errors`].
//! - [`PipelineError`] aborts a run. The executor stops at the failing stage,
//!   no later stage runs, and the caller receives the error instead of a
//!   partial state.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::StageKind;

// ---------------------------------------------------------------------------
// Provider failures
// ---------------------------------------------------------------------------

/// Failure reported by an external collaborator (language model, search,
/// content fetch, or report storage).
///
/// Each call is attempted once. Stages turn these into fallback values; they
/// never retry.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ProviderError {
    /// The provider has no usable backing (missing endpoint, disabled backend).
    #[error("provider not configured: {0}")]
    Unconfigured(String),

    /// The call did not complete within its time bound.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, DNS, TLS, or body-read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote service answered with a non-success status code.
    #[error("remote service returned HTTP {status}: {detail}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body, possibly empty.
        detail: String,
    },

    /// The remote service answered but the payload could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Local file-system failure (report storage).
    #[error("I/O error: {0}")]
    Io(String),
}

// ---------------------------------------------------------------------------
// Pipeline-level errors
// ---------------------------------------------------------------------------

/// Errors that abort a research run.
///
/// Provider failures are deliberately absent: they are absorbed by the stage
/// fallbacks. Only conditions no fallback can cover end up here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration is unusable (e.g. no language-model credentials).
    ///
    /// Produced while constructing providers or validating settings; the run
    /// never starts.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// A stage hit a condition its fallback cannot cover.
    #[error("Stage '{stage}' failed: {message}")]
    StageFailed {
        /// The stage that failed.
        stage: StageKind,
        /// Human-readable description of the failure.
        message: String,
    },

    /// Cancellation was requested; observed before `before` started.
    #[error("Research run cancelled before stage '{before}'")]
    Cancelled {
        /// The stage that would have run next.
        before: StageKind,
    },
}

impl PipelineError {
    /// Shorthand for [`PipelineError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Shorthand for [`PipelineError::StageFailed`].
    pub fn stage_failed(stage: StageKind, message: impl Into<String>) -> Self {
        Self::StageFailed {
            stage,
            message: message.into(),
        }
    }
}
