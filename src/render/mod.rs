//! Job result rendering
//!
//! Turns a stored job result into a display structure. Rendering never
//! fails: a missing or unreadable result becomes [`ResultView::Missing`],
//! and each optional section is shown only when the job produced it.

use crate::error::Error;
use crate::types::JobResult;

/// Shown when an analysis section has no text
pub const NO_ANALYSIS: &str = "No analysis available";

/// Shown when an analysis section has no confidence
pub const UNKNOWN_CONFIDENCE: &str = "Unknown";

/// Shown when the job opened no change request
pub const NO_CHANGE_REQUEST: &str = "No pull request was created. This might be because the bug \
    text wasn't found in the file or no changes were needed.";

/// User action offered by a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultAction {
    /// Open the change request in the browser (external navigation)
    OpenChangeRequest(String),
    /// Clear the form and compose a new report
    SubmitAnother,
    /// Go back to the form after an error
    ReturnToCompose,
}

/// Why no result could be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingReason {
    /// Nothing stored for this session
    NoResult,
    /// Stored value is not a job result
    Malformed(String),
}

impl MissingReason {
    /// User-facing message
    pub fn message(&self) -> String {
        match self {
            Self::NoResult => Error::MissingResult.to_string(),
            Self::Malformed(detail) => Error::MalformedResult(detail.clone()).to_string(),
        }
    }
}

/// Analysis section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSection {
    /// Analysis text, or a placeholder
    pub summary: String,
    /// Confidence, or "Unknown"
    pub confidence: String,
    /// Fix explanation, when given
    pub explanation: Option<String>,
}

/// Test outcome section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSection {
    /// Whether tests passed
    pub passed: bool,
    /// Test output, when non-empty
    pub output: Option<String>,
    /// Test error text, when non-empty
    pub error: Option<String>,
}

/// Change request outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeRequestView {
    /// A change request was opened
    Open {
        /// Change request URL
        url: String,
    },
    /// The job finished without opening one; a valid outcome, not an error
    NotOpened {
        /// Explanation shown to the user
        explanation: String,
    },
}

/// Display structure for a completed job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultReport {
    /// Summary message
    pub message: String,
    /// Branch holding the fix
    pub branch: Option<String>,
    /// Analysis section
    pub analysis: Option<AnalysisSection>,
    /// Test section
    pub tests: Option<TestSection>,
    /// Extra remark from the processor
    pub note: Option<String>,
    /// Change request outcome
    pub change_request: ChangeRequestView,
    /// Available actions, in display order
    pub actions: Vec<ResultAction>,
}

/// What the results view shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    /// No usable result; offers a way back to the form
    Missing {
        /// Why
        reason: MissingReason,
        /// Recovery action
        action: ResultAction,
    },
    /// A job result
    Complete(ResultReport),
}

impl ResultView {
    fn missing(reason: MissingReason) -> Self {
        Self::Missing {
            reason,
            action: ResultAction::ReturnToCompose,
        }
    }

    /// Build the recovery view for a load error
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::MalformedResult(detail) | Error::ResponseParse(detail) => {
                Self::missing(MissingReason::Malformed(detail.clone()))
            }
            Error::MissingResult => Self::missing(MissingReason::NoResult),
            other => Self::missing(MissingReason::Malformed(other.to_string())),
        }
    }

    /// Whether this is the recovery view
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

/// Render the stored result text (`None` when nothing is stored)
pub fn render_result(stored: Option<&str>) -> ResultView {
    let Some(text) = stored else {
        return ResultView::missing(MissingReason::NoResult);
    };
    match JobResult::parse(text) {
        Ok(result) => ResultView::Complete(render_job_result(&result)),
        Err(err) => ResultView::from_error(&err),
    }
}

/// Render a parsed job result
pub fn render_job_result(result: &JobResult) -> ResultReport {
    let analysis = result.analysis.as_ref().map(|a| AnalysisSection {
        summary: a
            .summary
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_ANALYSIS.to_string()),
        confidence: a
            .confidence
            .as_ref()
            .map(ToString::to_string)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_CONFIDENCE.to_string()),
        explanation: non_empty(a.explanation.as_ref()),
    });

    let tests = result.test_outcome.as_ref().map(|t| TestSection {
        passed: t.passed,
        output: non_empty(t.output.as_ref()),
        error: non_empty(t.error.as_ref()),
    });

    let mut actions = Vec::new();
    let change_request = match non_empty(result.change_request_url.as_ref()) {
        Some(url) => {
            actions.push(ResultAction::OpenChangeRequest(url.clone()));
            ChangeRequestView::Open { url }
        }
        None => ChangeRequestView::NotOpened {
            explanation: NO_CHANGE_REQUEST.to_string(),
        },
    };
    actions.push(ResultAction::SubmitAnother);

    ResultReport {
        message: result.message.clone().unwrap_or_default(),
        branch: non_empty(result.branch.as_ref()),
        analysis,
        tests,
        note: non_empty(result.note.as_ref()),
        change_request,
        actions,
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty()).cloned()
}
