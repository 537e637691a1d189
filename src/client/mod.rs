//! Job submission
//!
//! A [`JobProcessor`] takes a bug report and returns the job result. The
//! HTTP implementation talks to the remote fixing service; tests substitute
//! their own.

mod http;

pub use http::HttpJobClient;

use crate::error::Result;
use crate::types::{BugReport, JobResult};
use async_trait::async_trait;

/// Something that runs a bug report through the fixing pipeline
///
/// Implementations are stateless between calls and never retry.
#[async_trait]
pub trait JobProcessor: Send + Sync {
    /// Submit one report and wait for the job result
    async fn submit(&self, report: &BugReport) -> Result<JobResult>;
}

/// Validate a report, then hand it to the processor
///
/// An invalid report fails with [`Error::Validation`](crate::error::Error::Validation)
/// before the processor is called.
pub async fn submit_report(processor: &dyn JobProcessor, report: &BugReport) -> Result<JobResult> {
    report.validate()?;
    processor.submit(report).await
}
