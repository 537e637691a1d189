//! Mock job processor for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use bugfix_profiler::client::JobProcessor;
use bugfix_profiler::error::{Error, Result};
use bugfix_profiler::types::{BugReport, JobResult};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scripted response
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Success with this JSON body
    Ok(Value),
    /// Non-success status with this detail
    Rejected(u16, String),
    /// No response at all
    Transport(String),
}

/// Hand-written `JobProcessor` with call tracking
///
/// Features:
/// - Queue of scripted responses (the last one repeats)
/// - Optional latency, to observe the submitting state
/// - Records every report it receives
pub struct MockProcessor {
    responses: Mutex<VecDeque<MockResponse>>,
    latency: Mutex<Option<Duration>>,
    calls: Mutex<Vec<BugReport>>,
    call_count: AtomicUsize,
}

impl MockProcessor {
    /// Processor that always answers with `body`
    pub fn returning(body: Value) -> Self {
        Self::scripted(vec![MockResponse::Ok(body)])
    }

    /// Processor answering with `responses` in order
    pub fn scripted(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            latency: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Delay every response
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    /// Number of submissions received
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Reports received, in order
    pub fn calls(&self) -> Vec<BugReport> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self) -> MockResponse {
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            responses.pop_front().unwrap()
        } else {
            responses
                .front()
                .cloned()
                .unwrap_or_else(|| MockResponse::Transport("no scripted response".into()))
        }
    }
}

#[async_trait]
impl JobProcessor for MockProcessor {
    async fn submit(&self, report: &BugReport) -> Result<JobResult> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(report.clone());

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match self.next_response() {
            MockResponse::Ok(body) => JobResult::from_value(body),
            MockResponse::Rejected(status, message) => Err(Error::RemoteRejected { status, message }),
            MockResponse::Transport(cause) => Err(Error::Transport(cause)),
        }
    }
}
