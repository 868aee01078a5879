//! The stage contract and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::{PipelineError, ResearchState, StageKind, StateUpdate};

/// One step of the research pipeline.
///
/// A stage reads the accumulated state and returns a partial update; it never
/// mutates the state directly. The executor merges the update before the next
/// stage starts.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Which position in [`StageKind::SEQUENCE`] this stage fills.
    fn kind(&self) -> StageKind;

    /// Runs the stage. Provider failures are handled inside via fallbacks;
    /// an `Err` here aborts the whole run.
    async fn run(&self, state: &ResearchState) -> Result<StateUpdate, PipelineError>;
}

/// Shared flag a caller sets to stop a run at the next stage boundary.
///
/// A stage already in flight finishes; outstanding network calls inside it are
/// not interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// A flag that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
