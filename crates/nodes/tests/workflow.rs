//! End-to-end runs of the five-stage workflow against in-memory providers.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{harness, harness_with, hit, MapSearch, MemoryStore, ScriptedLlm, StubFetcher};
use nodes::{Providers, ResearchWorkflow};
use pipeline::{
    CancellationFlag, PipelineError, ProviderError, ResearchSettings, SearchHit, SearchProvider,
    StageKind, Step, ELLIPSIS,
};

const QUERY: &str = "solid-state batteries";
const CHEMISTRY: &str = "solid-state batteries chemistry";
const MANUFACTURING: &str = "solid-state batteries manufacturing";

fn two_subtopic_search() -> MapSearch {
    MapSearch::default()
        .with(
            CHEMISTRY,
            vec![hit("https://a1", 0.5), hit("https://a2", 0.9), hit("https://a3", 0.3)],
        )
        .with(
            MANUFACTURING,
            vec![hit("https://b1", 0.8), hit("https://b2", 0.4), hit("https://b3", 0.6)],
        )
}

fn urls(state: &pipeline::ResearchState) -> Vec<&str> {
    state.sources.iter().map(|s| s.url.as_str()).collect()
}

#[tokio::test]
async fn two_subtopics_rank_fetch_and_cite_top_three() {
    let h = harness(
        ScriptedLlm::with_subtopics(&["chemistry", "manufacturing"]),
        two_subtopic_search(),
        StubFetcher::default(),
        MemoryStore::default(),
    );

    let state = h.workflow.run(QUERY).await.unwrap();

    assert_eq!(state.subtopics, vec!["chemistry", "manufacturing"]);
    assert_eq!(state.search_strategy, "Read widely.");
    assert_eq!(state.search_queries, vec![CHEMISTRY, MANUFACTURING]);
    assert_eq!(
        urls(&state),
        vec!["https://a2", "https://b1", "https://b3", "https://a1", "https://b2", "https://a3"]
    );

    let with_content: Vec<_> = state.sources.iter().filter(|s| s.content.is_some()).collect();
    assert_eq!(with_content.len(), 3);
    assert!(state.sources[..3].iter().all(|s| s.content.is_some()));
    assert_eq!(state.fetched_content.len(), 3);
    assert_eq!(state.fetched_content[0].content, "content of https://a2");

    assert_eq!(
        state.citations,
        vec![
            "[1] Title for https://a2 - https://a2",
            "[2] Title for https://b1 - https://b1",
            "[3] Title for https://b3 - https://b3",
        ]
    );
    assert_eq!(state.current_step, Step::Complete);
    assert!(state.errors.is_empty(), "unexpected errors: {:?}", state.errors);

    // Ten results split across two subtopics.
    let calls = h.search.calls.lock().unwrap().clone();
    assert!(calls.iter().all(|(_, max)| *max == 5));
    assert_eq!(h.fetcher.calls.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn synthesis_context_lists_sources_in_citation_order() {
    let h = harness(
        ScriptedLlm::with_subtopics(&["chemistry", "manufacturing"]),
        two_subtopic_search(),
        StubFetcher::default(),
        MemoryStore::default(),
    );
    h.workflow.run(QUERY).await.unwrap();

    let prompt = h.llm.synthesis_prompt().expect("synthesis prompt sent");
    let first = prompt.find("[Source 1] Title for https://a2").unwrap();
    let second = prompt.find("[Source 2] Title for https://b1").unwrap();
    let third = prompt.find("[Source 3] Title for https://b3").unwrap();
    assert!(first < second && second < third);
    assert!(!prompt.contains("[Source 4]"));
    assert!(prompt.contains("- chemistry\n- manufacturing"));
}

#[tokio::test]
async fn duplicate_url_keeps_the_higher_score() {
    let search = MapSearch::default()
        .with(CHEMISTRY, vec![hit("https://shared", 0.4), hit("https://a", 0.7)])
        .with(MANUFACTURING, vec![hit("https://shared", 0.95), hit("https://b", 0.2)]);
    let h = harness(
        ScriptedLlm::with_subtopics(&["chemistry", "manufacturing"]),
        search,
        StubFetcher::default(),
        MemoryStore::default(),
    );

    let state = h.workflow.run(QUERY).await.unwrap();

    assert_eq!(state.sources.len(), 3);
    assert_eq!(urls(&state), vec!["https://shared", "https://a", "https://b"]);
    assert_eq!(state.sources[0].relevance_score.as_f64(), 0.95);
}

#[tokio::test]
async fn planner_without_markers_still_writes_a_report() {
    let h = harness(
        ScriptedLlm::new("I could not decide on a plan.", "No sources were available."),
        MapSearch::default(),
        StubFetcher::default(),
        MemoryStore::default(),
    );

    let state = h.workflow.run("tidal power").await.unwrap();

    assert!(state.subtopics.is_empty());
    assert!(state.search_queries.is_empty());
    assert!(state.sources.is_empty());
    assert!(state.citations.is_empty());
    assert_eq!(state.synthesized_report, "No sources were available.");
    assert_eq!(h.search.call_count(), 0);
    assert!(h.llm.synthesis_prompt().is_some());

    let location = state.output_path.expect("report stored");
    assert_eq!(location.as_str(), "memory://tidal_power.md");
    let doc = h.store.document("tidal_power.md").unwrap();
    assert!(doc.starts_with("# Research Report: tidal power"));
    assert!(doc.contains("## References"));
}

#[tokio::test]
async fn timed_out_fetch_gets_placeholder_content() {
    let h = harness(
        ScriptedLlm::with_subtopics(&["chemistry", "manufacturing"]),
        two_subtopic_search(),
        StubFetcher::default().timing_out("https://b1"),
        MemoryStore::default(),
    );

    let state = h.workflow.run(QUERY).await.unwrap();

    let b1 = &state.sources[1];
    assert_eq!(b1.url.as_str(), "https://b1");
    let content = b1.content.as_deref().unwrap();
    assert!(!content.is_empty());
    assert!(content.contains("could not be retrieved"));
    assert!(content.contains("Snippet for https://b1"));

    assert_eq!(state.citations.len(), 3);
    assert_eq!(state.citations[1], "[2] Title for https://b1 - https://b1");
    assert_eq!(state.current_step, Step::Complete);
    assert!(state
        .errors
        .iter()
        .any(|e| e.starts_with("fetch https://b1: request timed out")));
}

#[tokio::test]
async fn blank_page_gets_placeholder_content() {
    let h = harness(
        ScriptedLlm::with_subtopics(&["chemistry", "manufacturing"]),
        two_subtopic_search(),
        StubFetcher::default().returning("https://a2", "   "),
        MemoryStore::default(),
    );

    let state = h.workflow.run(QUERY).await.unwrap();

    let a2 = &state.sources[0];
    assert_eq!(a2.url.as_str(), "https://a2");
    let content = a2.content.as_deref().unwrap();
    assert!(!content.trim().is_empty());
    assert!(content.contains("could not be retrieved"));
    assert!(content.contains("Snippet for https://a2"));

    assert_eq!(state.citations.len(), 3);
    assert_eq!(state.current_step, Step::Complete);
    assert!(state
        .errors
        .iter()
        .any(|e| e == "fetch https://a2: no readable content"));
}

#[tokio::test]
async fn panicking_fetcher_fails_only_its_source() {
    let h = harness(
        ScriptedLlm::with_subtopics(&["chemistry", "manufacturing"]),
        two_subtopic_search(),
        StubFetcher::default().panicking("https://b1"),
        MemoryStore::default(),
    );

    let state = h.workflow.run(QUERY).await.unwrap();

    assert_eq!(urls(&state)[..3], ["https://a2", "https://b1", "https://b3"]);
    let b1 = state.sources[1].content.as_deref().unwrap();
    assert!(b1.contains("could not be retrieved"));
    assert_eq!(state.sources[2].content.as_deref(), Some("content of https://b3"));
    assert_eq!(state.current_step, Step::Complete);
    assert!(state.output_path.is_some());
    assert!(state
        .errors
        .iter()
        .any(|e| e.starts_with("fetch https://b1:") && e.contains("content fetcher panicked")));
}

#[tokio::test]
async fn fetched_content_respects_the_character_cap() {
    let settings = ResearchSettings {
        content_char_limit: 20,
        ..ResearchSettings::default()
    };
    let long_body = "word ".repeat(100);
    let h = harness_with(
        ScriptedLlm::with_subtopics(&["chemistry", "manufacturing"]),
        two_subtopic_search(),
        StubFetcher::default().returning("https://a2", &long_body),
        MemoryStore::default(),
        &settings,
    );

    let state = h.workflow.run(QUERY).await.unwrap();

    for source in &state.sources {
        if let Some(content) = &source.content {
            assert!(content.chars().count() <= 20 + ELLIPSIS.len());
        }
    }
    assert!(state.sources[0].content.as_deref().unwrap().ends_with(ELLIPSIS));
}

#[tokio::test]
async fn filename_is_derived_from_the_query() {
    let h = harness(
        ScriptedLlm::new("nothing useful", "report"),
        MapSearch::default(),
        StubFetcher::default(),
        MemoryStore::default(),
    );

    let state = h.workflow.run("What is AI? ").await.unwrap();

    assert_eq!(state.query(), "What is AI? ");
    assert_eq!(state.output_path.unwrap().as_str(), "memory://what_is_ai_.md");
    assert!(h.store.document("what_is_ai_.md").is_some());
}

#[tokio::test]
async fn identical_queries_produce_identical_results() {
    let h = harness(
        ScriptedLlm::with_subtopics(&["chemistry", "manufacturing"]),
        two_subtopic_search(),
        StubFetcher::default(),
        MemoryStore::default(),
    );

    let first = h.workflow.run(QUERY).await.unwrap();
    let second = h.workflow.run(QUERY).await.unwrap();

    assert_eq!(first.subtopics, second.subtopics);
    assert_eq!(first.sources, second.sources);
    assert_eq!(first.citations, second.citations);
    assert_eq!(first.output_path, second.output_path);
}

#[tokio::test]
async fn provider_failures_degrade_without_aborting() {
    let mut llm = ScriptedLlm::with_subtopics(&["chemistry", "manufacturing"]);
    llm.synthesis = Err(ProviderError::Status {
        status: 503,
        detail: "overloaded".into(),
    });
    let search = MapSearch::default()
        .with(CHEMISTRY, vec![hit("https://a1", 0.95)])
        .failing(MANUFACTURING, ProviderError::Transport("connection refused".into()));
    let h = harness(llm, search, StubFetcher::default(), MemoryStore::default());

    let state = h.workflow.run(QUERY).await.unwrap();

    // The failed subtopic contributes synthetic results instead of nothing.
    assert_eq!(state.sources[0].url.as_str(), "https://a1");
    assert!(state
        .sources
        .iter()
        .any(|s| s.url.as_str().starts_with("https://example.com/")));

    // The report is a local digest whose markers match the citation list.
    assert!(state.synthesized_report.contains("[Source 1]"));
    assert_eq!(state.citations.len(), 3);

    assert!(state
        .errors
        .iter()
        .any(|e| e.starts_with("search 'solid-state batteries manufacturing'")));
    assert!(state
        .errors
        .iter()
        .any(|e| e.starts_with("synthesis: remote service returned HTTP 503")));
    assert!(state.output_path.is_some());
}

#[tokio::test]
async fn planner_failure_yields_an_empty_plan() {
    let mut llm = ScriptedLlm::new("", "Nothing to report.");
    llm.planning = Err(ProviderError::Timeout(Duration::from_secs(30)));
    let h = harness(llm, MapSearch::default(), StubFetcher::default(), MemoryStore::default());

    let state = h.workflow.run(QUERY).await.unwrap();

    assert!(state.subtopics.is_empty());
    assert!(state.sources.is_empty());
    assert_eq!(state.errors.len(), 1);
    assert!(state.errors[0].starts_with("planning: request timed out"));
    assert_eq!(state.current_step, Step::Complete);
}

#[tokio::test]
async fn dangling_citation_markers_are_recorded() {
    let mut llm = ScriptedLlm::with_subtopics(&["chemistry", "manufacturing"]);
    llm.synthesis = Ok("Strong evidence [Source 2] and weak evidence [Source 9].".into());
    let h = harness(llm, two_subtopic_search(), StubFetcher::default(), MemoryStore::default());

    let state = h.workflow.run(QUERY).await.unwrap();

    assert_eq!(
        state.synthesized_report,
        "Strong evidence [Source 2] and weak evidence [Source 9]."
    );
    assert_eq!(state.errors.len(), 1);
    assert!(state.errors[0].contains("[Source 9]"));
}

#[tokio::test]
async fn storage_failure_aborts_the_run() {
    let h = harness(
        ScriptedLlm::with_subtopics(&["chemistry"]),
        MapSearch::default(),
        StubFetcher::default(),
        MemoryStore::failing(),
    );

    let err = h.workflow.run(QUERY).await.unwrap_err();

    match err {
        PipelineError::StageFailed { stage, message } => {
            assert_eq!(stage, StageKind::Output);
            assert!(message.contains("disk full"));
        }
        other => panic!("expected output stage failure, got {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_before_start_runs_nothing() {
    let h = harness(
        ScriptedLlm::with_subtopics(&["chemistry"]),
        MapSearch::default(),
        StubFetcher::default(),
        MemoryStore::default(),
    );
    let flag = CancellationFlag::new();
    flag.cancel();

    let err = h.workflow.run_with_cancellation(QUERY, &flag).await.unwrap_err();

    assert!(matches!(err, PipelineError::Cancelled { before: StageKind::Planning }));
    assert!(h.llm.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn cancellation_lets_the_running_stage_finish() {
    let flag = CancellationFlag::new();
    let mut llm = ScriptedLlm::with_subtopics(&["chemistry", "manufacturing"]);
    llm.cancel_on_plan = Some(flag.clone());
    let h = harness(llm, two_subtopic_search(), StubFetcher::default(), MemoryStore::default());

    let err = h.workflow.run_with_cancellation(QUERY, &flag).await.unwrap_err();

    assert!(matches!(err, PipelineError::Cancelled { before: StageKind::Search }));
    assert_eq!(h.search.call_count(), 0);
    assert!(h.store.saved.lock().unwrap().is_empty());
}

/// Answers the first subtopic query last.
struct SlowFirstSearch;

#[async_trait]
impl SearchProvider for SlowFirstSearch {
    async fn search(&self, query: &str, _max: usize) -> Result<Vec<SearchHit>, ProviderError> {
        if query == CHEMISTRY {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(vec![hit("https://tie-chem", 0.5), hit("https://top", 0.9)])
        } else {
            Ok(vec![hit("https://tie-manu", 0.5)])
        }
    }
}

#[tokio::test]
async fn ranking_ignores_search_completion_order() {
    let llm = Arc::new(ScriptedLlm::with_subtopics(&["chemistry", "manufacturing"]));
    let providers = Providers {
        llm,
        search: Arc::new(SlowFirstSearch),
        fetcher: Arc::new(StubFetcher::default()),
        store: Arc::new(MemoryStore::default()),
    };
    let workflow = ResearchWorkflow::new(providers, &ResearchSettings::default()).unwrap();

    let state = workflow.run(QUERY).await.unwrap();

    // Equal scores fall back to subtopic order, not arrival order.
    assert_eq!(urls(&state), vec!["https://top", "https://tie-chem", "https://tie-manu"]);
}

#[test]
fn invalid_settings_fail_before_any_run() {
    let providers = Providers {
        llm: Arc::new(ScriptedLlm::new("", "")),
        search: Arc::new(MapSearch::default()),
        fetcher: Arc::new(StubFetcher::default()),
        store: Arc::new(MemoryStore::default()),
    };
    let settings = ResearchSettings {
        max_sources_to_fetch: 0,
        ..ResearchSettings::default()
    };

    let result = ResearchWorkflow::new(providers, &settings);

    assert!(matches!(result, Err(PipelineError::Configuration { .. })));
}

#[test]
fn stage_list_must_match_the_fixed_sequence() {
    let result = ResearchWorkflow::from_stages(Vec::new());
    assert!(matches!(result, Err(PipelineError::Configuration { .. })));
}
