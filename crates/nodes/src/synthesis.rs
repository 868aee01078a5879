//! Synthesis stage: narrative report plus a deterministic citation list.

use std::sync::Arc;

use async_trait::async_trait;
use pipeline::synthesis::{build_context, dangling_citations, format_citations, format_subtopics};
use pipeline::{
    fallback, CompletionRequest, LlmProvider, PipelineError, ResearchState, Stage, StageKind,
    StateUpdate,
};
use tracing::{info, instrument, warn};

use crate::prompts::{synthesis_prompt, SYNTHESIS_TEMPERATURE};

/// Writes the report from the top sources and numbers their citations.
///
/// A failed model call yields a local digest of the sources instead.
pub struct SynthesisStage {
    llm: Arc<dyn LlmProvider>,
    max_sources: usize,
    context_chars_per_source: usize,
}

impl SynthesisStage {
    /// Uses the first `max_sources` ranked sources, each shown to the model
    /// in at most `context_chars_per_source` characters.
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        max_sources: usize,
        context_chars_per_source: usize,
    ) -> Self {
        Self {
            llm,
            max_sources,
            context_chars_per_source,
        }
    }
}

#[async_trait]
impl Stage for SynthesisStage {
    fn kind(&self) -> StageKind {
        StageKind::Synthesis
    }

    #[instrument(name = "synthesis", skip_all, fields(llm = %self.llm.name()))]
    async fn run(&self, state: &ResearchState) -> Result<StateUpdate, PipelineError> {
        let cited = &state.sources[..state.sources.len().min(self.max_sources)];
        let context = build_context(cited, self.context_chars_per_source);
        let prompt = synthesis_prompt(
            state.query(),
            &format_subtopics(&state.subtopics),
            &context,
        );

        let mut errors = Vec::new();
        let report = match self
            .llm
            .complete(CompletionRequest::new(prompt, SYNTHESIS_TEMPERATURE))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "synthesis model unavailable, writing source digest");
                errors.push(format!("synthesis: {e}"));
                fallback::source_digest_report(state.query(), &state.subtopics, cited)
            }
        };

        // Numbered from the same slice as the context, never from the model's text.
        let citations = format_citations(cited);

        let dangling = dangling_citations(&report, citations.len());
        if !dangling.is_empty() {
            warn!(?dangling, "report cites sources that are not in the reference list");
            errors.extend(dangling.iter().map(|n| {
                format!("synthesis: report cites [Source {n}] which has no reference entry")
            }));
        }

        info!(chars = report.len(), citations = citations.len(), "report generated");

        Ok(StateUpdate {
            synthesized_report: Some(report),
            citations: Some(citations),
            errors,
            ..StateUpdate::default()
        })
    }
}
