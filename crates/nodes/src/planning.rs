//! Planning stage: query → subtopics + search strategy.

use std::sync::Arc;

use async_trait::async_trait;
use pipeline::planning::parse_plan;
use pipeline::{
    fallback, CompletionRequest, LlmProvider, PipelineError, ResearchState, Stage, StageKind,
    StateUpdate,
};
use tracing::{info, instrument, warn};

use crate::prompts::{planning_prompt, PLANNING_TEMPERATURE};

/// Asks the language model to split the query into subtopics and a search
/// strategy.
///
/// A failed model call yields an empty plan and an `errors` entry.
pub struct PlanningStage {
    llm: Arc<dyn LlmProvider>,
    max_subtopics: usize,
}

impl PlanningStage {
    /// `max_subtopics` caps the parsed list; extra lines are dropped.
    pub fn new(llm: Arc<dyn LlmProvider>, max_subtopics: usize) -> Self {
        Self { llm, max_subtopics }
    }
}

#[async_trait]
impl Stage for PlanningStage {
    fn kind(&self) -> StageKind {
        StageKind::Planning
    }

    #[instrument(name = "planning", skip_all, fields(llm = %self.llm.name()))]
    async fn run(&self, state: &ResearchState) -> Result<StateUpdate, PipelineError> {
        let prompt = planning_prompt(state.query());
        let mut errors = Vec::new();

        let plan = match self
            .llm
            .complete(CompletionRequest::new(prompt, PLANNING_TEMPERATURE))
            .await
        {
            Ok(response) => parse_plan(&response, self.max_subtopics),
            Err(e) => {
                warn!(error = %e, "planner unavailable, continuing without subtopics");
                errors.push(format!("planning: {e}"));
                fallback::empty_plan()
            }
        };

        info!(subtopics = plan.subtopics.len(), "research plan ready");
        for (i, topic) in plan.subtopics.iter().enumerate() {
            info!(index = i + 1, subtopic = %topic, "subtopic");
        }

        Ok(StateUpdate {
            subtopics: Some(plan.subtopics),
            search_strategy: Some(plan.strategy),
            errors,
            ..StateUpdate::default()
        })
    }
}
