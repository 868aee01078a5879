//! Deterministic in-memory providers shared by the workflow tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use nodes::{Providers, ResearchWorkflow};
use pipeline::{
    CancellationFlag, CompletionRequest, ContentFetcher, LlmProvider, ProviderError,
    ReportLocation, ReportStore, ResearchSettings, SearchHit, SearchProvider,
};

// ---------------------------------------------------------------------------
// Language model
// ---------------------------------------------------------------------------

/// Answers planning prompts and synthesis prompts with fixed responses.
pub struct ScriptedLlm {
    pub planning: Result<String, ProviderError>,
    pub synthesis: Result<String, ProviderError>,
    pub prompts: Mutex<Vec<String>>,
    /// Set when the planning prompt is answered, to simulate a user cancelling mid-stage.
    pub cancel_on_plan: Option<CancellationFlag>,
}

impl ScriptedLlm {
    pub fn new(planning: &str, synthesis: &str) -> Self {
        Self {
            planning: Ok(planning.to_string()),
            synthesis: Ok(synthesis.to_string()),
            prompts: Mutex::new(Vec::new()),
            cancel_on_plan: None,
        }
    }

    pub fn with_subtopics(subtopics: &[&str]) -> Self {
        let mut planning = String::from("SUBTOPICS:\n");
        for (i, topic) in subtopics.iter().enumerate() {
            planning.push_str(&format!("{}. {}\n", i + 1, topic));
        }
        planning.push_str("\nSEARCH STRATEGY:\nRead widely.\n");
        Self::new(&planning, "## Executive Summary\nFindings [Source 1].")
    }

    pub fn synthesis_prompt(&self) -> Option<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.contains("Available Sources:"))
            .cloned()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let is_planning = request.prompt.contains("Research Query:");
        self.prompts.lock().unwrap().push(request.prompt);
        if is_planning {
            if let Some(flag) = &self.cancel_on_plan {
                flag.cancel();
            }
            self.planning.clone()
        } else {
            self.synthesis.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Returns canned hits keyed by the exact composite query.
#[derive(Default)]
pub struct MapSearch {
    pub results: HashMap<String, Result<Vec<SearchHit>, ProviderError>>,
    pub calls: Mutex<Vec<(String, usize)>>,
}

impl MapSearch {
    pub fn with(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.results.insert(query.to_string(), Ok(hits));
        self
    }

    pub fn failing(mut self, query: &str, error: ProviderError) -> Self {
        self.results.insert(query.to_string(), Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchProvider for MapSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));
        self.results.get(query).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub fn hit(url: &str, score: f64) -> SearchHit {
    SearchHit {
        url: url.to_string(),
        title: format!("Title for {url}"),
        snippet: format!("Snippet for {url}"),
        content: None,
        score,
    }
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// Returns `content of <url>` unless an override is registered for the URL.
#[derive(Default)]
pub struct StubFetcher {
    pub overrides: HashMap<String, Result<String, ProviderError>>,
    pub panics: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn timing_out(mut self, url: &str) -> Self {
        self.overrides.insert(
            url.to_string(),
            Err(ProviderError::Timeout(Duration::from_secs(10))),
        );
        self
    }

    pub fn returning(mut self, url: &str, body: &str) -> Self {
        self.overrides.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn panicking(mut self, url: &str) -> Self {
        self.panics.insert(url.to_string());
        self
    }
}

#[async_trait]
impl ContentFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.panics.contains(url) {
            panic!("renderer blew up on {url}");
        }
        self.overrides
            .get(url)
            .cloned()
            .unwrap_or_else(|| Ok(format!("content of {url}")))
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Keeps saved documents in memory, keyed by filename.
#[derive(Default)]
pub struct MemoryStore {
    pub saved: Mutex<HashMap<String, String>>,
    pub fail: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn document(&self, filename: &str) -> Option<String> {
        self.saved.lock().unwrap().get(filename).cloned()
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn save(&self, content: &str, filename: &str) -> Result<ReportLocation, ProviderError> {
        if self.fail {
            return Err(ProviderError::Io("disk full".to_string()));
        }
        self.saved
            .lock()
            .unwrap()
            .insert(filename.to_string(), content.to_string());
        ReportLocation::new(format!("memory://{filename}"))
            .ok_or_else(|| ProviderError::Io("empty filename".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub struct Harness {
    pub llm: Arc<ScriptedLlm>,
    pub search: Arc<MapSearch>,
    pub fetcher: Arc<StubFetcher>,
    pub store: Arc<MemoryStore>,
    pub workflow: ResearchWorkflow,
}

pub fn harness(
    llm: ScriptedLlm,
    search: MapSearch,
    fetcher: StubFetcher,
    store: MemoryStore,
) -> Harness {
    harness_with(llm, search, fetcher, store, &ResearchSettings::default())
}

pub fn harness_with(
    llm: ScriptedLlm,
    search: MapSearch,
    fetcher: StubFetcher,
    store: MemoryStore,
    settings: &ResearchSettings,
) -> Harness {
    let llm = Arc::new(llm);
    let search = Arc::new(search);
    let fetcher = Arc::new(fetcher);
    let store = Arc::new(store);

    let providers = Providers {
        llm: llm.clone(),
        search: search.clone(),
        fetcher: fetcher.clone(),
        store: store.clone(),
    };
    let workflow = ResearchWorkflow::new(providers, settings).expect("valid test settings");

    Harness {
        llm,
        search,
        fetcher,
        store,
        workflow,
    }
}
