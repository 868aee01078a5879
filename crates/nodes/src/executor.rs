//! The workflow executor: runs the five stages in fixed order and merges
//! each stage's update into the run's state.

use std::sync::Arc;
use std::time::Instant;

use pipeline::{
    CancellationFlag, ContentFetcher, LlmProvider, PipelineError, ReportStore, ResearchSettings,
    ResearchState, RunId, SearchProvider, Stage, StageKind,
};
use tracing::{error, info, info_span, Instrument};

use crate::fetch::FetchStage;
use crate::output::OutputStage;
use crate::planning::PlanningStage;
use crate::search::SearchStage;
use crate::synthesis::SynthesisStage;

/// The external collaborators a workflow is built from.
///
/// Constructed once by the composition root and shared read-only by every run.
#[derive(Clone)]
pub struct Providers {
    pub llm: Arc<dyn LlmProvider>,
    pub search: Arc<dyn SearchProvider>,
    pub fetcher: Arc<dyn ContentFetcher>,
    pub store: Arc<dyn ReportStore>,
}

/// Runs research queries through Planning → Search → Fetch → Synthesis → Output.
///
/// There are no branches, loops, retries, or skips at this level. Each run
/// owns a fresh [`ResearchState`]; the workflow itself holds only shared,
/// read-only stage objects, so one instance can serve concurrent runs.
pub struct ResearchWorkflow {
    stages: Vec<Box<dyn Stage>>,
}

impl ResearchWorkflow {
    /// Builds the standard five-stage workflow.
    ///
    /// Fails with [`PipelineError::Configuration`] if `settings` are invalid.
    pub fn new(providers: Providers, settings: &ResearchSettings) -> Result<Self, PipelineError> {
        settings.validate()?;

        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(PlanningStage::new(Arc::clone(&providers.llm), settings.max_subtopics)),
            Box::new(SearchStage::new(providers.search, settings.total_search_results)),
            Box::new(FetchStage::new(
                providers.fetcher,
                settings.max_sources_to_fetch,
                settings.content_char_limit,
            )),
            Box::new(SynthesisStage::new(
                providers.llm,
                settings.max_sources_to_fetch,
                settings.context_chars_per_source,
            )),
            Box::new(OutputStage::new(
                providers.store,
                settings.filename_max_len,
                settings.report_extension.clone(),
            )),
        ];
        Self::from_stages(stages)
    }

    /// Builds a workflow from explicit stage objects.
    ///
    /// The stages must cover [`StageKind::SEQUENCE`] exactly, in order.
    pub fn from_stages(stages: Vec<Box<dyn Stage>>) -> Result<Self, PipelineError> {
        let kinds: Vec<StageKind> = stages.iter().map(|s| s.kind()).collect();
        if kinds != StageKind::SEQUENCE {
            return Err(PipelineError::configuration(format!(
                "stages must be {:?}, got {:?}",
                StageKind::SEQUENCE,
                kinds
            )));
        }
        Ok(Self { stages })
    }

    /// Runs one query to completion.
    pub async fn run(&self, query: &str) -> Result<ResearchState, PipelineError> {
        self.run_with_cancellation(query, &CancellationFlag::new())
            .await
    }

    /// Runs one query, checking `cancel` before every stage.
    ///
    /// On error no later stage runs and the partial state is dropped.
    pub async fn run_with_cancellation(
        &self,
        query: &str,
        cancel: &CancellationFlag,
    ) -> Result<ResearchState, PipelineError> {
        let run_id = RunId::new_random();
        let span = info_span!("research_run", %run_id, query = %query);
        self.drive(ResearchState::new(query), cancel)
            .instrument(span)
            .await
    }

    async fn drive(
        &self,
        mut state: ResearchState,
        cancel: &CancellationFlag,
    ) -> Result<ResearchState, PipelineError> {
        info!("research run started");
        let started = Instant::now();

        for stage in &self.stages {
            let kind = stage.kind();
            if cancel.is_cancelled() {
                info!(before = %kind, "research run cancelled");
                return Err(PipelineError::Cancelled { before: kind });
            }

            let stage_started = Instant::now();
            let update = stage.run(&state).await.map_err(|e| {
                error!(stage = %kind, error = %e, "stage aborted the run");
                e
            })?;
            state.apply(update);
            state.current_step = kind.completed_step();

            info!(
                stage = %kind,
                elapsed_ms = stage_started.elapsed().as_millis() as u64,
                "stage complete"
            );
        }

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            sources = state.sources.len(),
            citations = state.citations.len(),
            provider_errors = state.errors.len(),
            "research run complete"
        );
        Ok(state)
    }
}
