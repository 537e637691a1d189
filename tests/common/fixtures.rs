//! Test data factories for bugfix-profiler types
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use bugfix_profiler::progress::AnimationCallback;
use bugfix_profiler::session::{MemoryStore, SessionState};
use bugfix_profiler::types::{BugReport, JobResult, PipelineStage, RepoRegistration};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// A report with both required fields filled in
pub fn make_report() -> BugReport {
    BugReport::new(
        "add_numbers returns 2 when adding 5+3",
        "add_numbers should return 8 when adding 5+3",
    )
}

/// Body of a fully successful job
pub fn full_result_body() -> Value {
    json!({
        "message": "AI-powered bug fix completed and PR created successfully",
        "branch": "ai-fix-20250101120000-abc123",
        "pr_url": "https://github.com/acme/widgets/pull/42",
        "file_saved": null,
        "ai_analysis": {
            "success": true,
            "analysis": "The function subtracts instead of adding",
            "confidence": "high",
            "explanation": "Replaced - with +"
        },
        "test_results": {
            "success": true,
            "output": "All tests passed",
            "error": "",
            "return_code": 0
        }
    })
}

/// Parsed job result for a JSON body
pub fn make_result(body: Value) -> JobResult {
    JobResult::from_value(body).expect("fixture is a valid job result")
}

/// Session over a fresh in-memory store
pub fn memory_session() -> SessionState {
    SessionState::new(Arc::new(MemoryStore::new()))
}

/// Repository registration form output
pub fn make_registration(name: &str) -> RepoRegistration {
    RepoRegistration {
        repo_name: name.to_string(),
        repo_url: format!("https://github.com/{name}"),
        token: "ghp_fixture".to_string(),
    }
}

/// One recorded animation event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEvent {
    Stage(usize, PipelineStage),
    Finished,
}

/// Animation callback that records every event with its time
pub struct RecordingAnimation {
    started: Instant,
    events: Mutex<Vec<(u128, AnimationEvent)>>,
    starts: Mutex<Vec<u128>>,
}

impl RecordingAnimation {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            started: Instant::now(),
            events: Mutex::new(Vec::new()),
            starts: Mutex::new(Vec::new()),
        })
    }

    /// Events without timestamps
    pub fn events(&self) -> Vec<AnimationEvent> {
        self.events.lock().unwrap().iter().map(|(_, e)| *e).collect()
    }

    /// Events with milliseconds since creation
    pub fn timed_events(&self) -> Vec<(u128, AnimationEvent)> {
        self.events.lock().unwrap().clone()
    }

    /// Milliseconds since creation of each start notification
    pub fn start_times(&self) -> Vec<u128> {
        self.starts.lock().unwrap().clone()
    }

    pub fn stage_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, AnimationEvent::Stage(..)))
            .count()
    }

    pub fn finished_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, AnimationEvent::Finished))
            .count()
    }

    fn record(&self, event: AnimationEvent) {
        let elapsed = self.started.elapsed().as_millis();
        self.events.lock().unwrap().push((elapsed, event));
    }
}

#[async_trait]
impl AnimationCallback for RecordingAnimation {
    async fn on_started(&self) {
        let elapsed = self.started.elapsed().as_millis();
        self.starts.lock().unwrap().push(elapsed);
    }

    async fn on_stage(&self, index: usize, stage: PipelineStage) {
        self.record(AnimationEvent::Stage(index, stage));
    }

    async fn on_finished(&self) {
        self.record(AnimationEvent::Finished);
    }
}
