//! Output stage: assemble the final document and persist it.
//!
//! Storage has no fallback. A failed save aborts the run so callers never see
//! a "complete" state without a stored report.

use std::sync::Arc;

use async_trait::async_trait;
use pipeline::report::{assemble_document, derive_filename};
use pipeline::{PipelineError, ReportStore, ResearchState, Stage, StageKind, StateUpdate};
use tracing::{info, instrument};

/// Assembles the final document and hands it to the report store.
pub struct OutputStage {
    store: Arc<dyn ReportStore>,
    filename_max_len: usize,
    extension: String,
}

impl OutputStage {
    /// Filenames are derived from the query, cut to `filename_max_len`
    /// characters, and given `extension`.
    pub fn new(
        store: Arc<dyn ReportStore>,
        filename_max_len: usize,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            store,
            filename_max_len,
            extension: extension.into(),
        }
    }
}

#[async_trait]
impl Stage for OutputStage {
    fn kind(&self) -> StageKind {
        StageKind::Output
    }

    #[instrument(name = "output", skip_all)]
    async fn run(&self, state: &ResearchState) -> Result<StateUpdate, PipelineError> {
        let document =
            assemble_document(state.query(), &state.synthesized_report, &state.citations);
        let filename = derive_filename(state.query(), self.filename_max_len, &self.extension);

        let location = self
            .store
            .save(&document, &filename)
            .await
            .map_err(|e| {
                PipelineError::stage_failed(StageKind::Output, format!("saving {filename}: {e}"))
            })?;

        info!(path = %location, "report saved");

        Ok(StateUpdate {
            output_path: Some(location),
            ..StateUpdate::default()
        })
    }
}
