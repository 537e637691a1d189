//! Core types for bugfix-profiler

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

/// A file attached to a bug report
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name sent with the multipart part
    pub file_name: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
    /// Optional MIME type for the part
    pub mime: Option<String>,
}

impl Attachment {
    /// Build an attachment from in-memory bytes
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            mime: None,
        }
    }

    /// Read an attachment from disk, named after the path's last component
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .field("mime", &self.mime)
            .finish()
    }
}

/// A user-authored bug report, immutable once submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugReport {
    /// What goes wrong
    pub description: String,
    /// What should happen instead
    pub expected_behavior: String,
    /// Optional supporting file
    pub attachment: Option<Attachment>,
}

impl BugReport {
    /// Create a report without an attachment
    pub fn new(description: impl Into<String>, expected_behavior: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            expected_behavior: expected_behavior.into(),
            attachment: None,
        }
    }

    /// Attach a file
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Check that both required fields have content after trimming
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("bug description", self.description.as_str()),
            ("expected behavior", self.expected_behavior.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "Please fill in both fields before submitting (missing: {})",
                missing.join(", ")
            )))
        }
    }
}

/// Model confidence, reported either as a label or a score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Confidence {
    /// e.g. "high"
    Text(String),
    /// e.g. 0.87
    Number(serde_json::Number),
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Analysis stage output
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "AnalysisFields")]
pub struct Analysis {
    /// Analysis text
    pub summary: Option<String>,
    /// Confidence in the generated fix
    pub confidence: Option<Confidence>,
    /// Explanation of the fix
    pub explanation: Option<String>,
}

// Wire key and camelCase key are read separately so a body carrying both
// still parses; the wire key wins.
#[derive(Deserialize)]
struct AnalysisFields {
    #[serde(default)]
    analysis: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    confidence: Option<Confidence>,
    #[serde(default)]
    explanation: Option<String>,
}

impl From<AnalysisFields> for Analysis {
    fn from(fields: AnalysisFields) -> Self {
        Self {
            summary: fields.analysis.or(fields.summary),
            confidence: fields.confidence,
            explanation: fields.explanation,
        }
    }
}

/// Test stage output
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "TestOutcomeFields")]
pub struct TestOutcome {
    /// Whether the generated tests passed; absent or null reads as failed
    pub passed: bool,
    /// Captured test stdout
    pub output: Option<String>,
    /// Captured test stderr or failure reason
    pub error: Option<String>,
}

#[derive(Deserialize)]
struct TestOutcomeFields {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    passed: Option<bool>,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl From<TestOutcomeFields> for TestOutcome {
    fn from(fields: TestOutcomeFields) -> Self {
        Self {
            passed: fields.success.or(fields.passed).unwrap_or(false),
            output: fields.output,
            error: fields.error,
        }
    }
}

#[derive(Deserialize)]
struct JobResultFields {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    branch: Option<String>,
    #[serde(default, rename = "branchName")]
    branch_name: Option<String>,
    #[serde(default)]
    ai_analysis: Option<Analysis>,
    #[serde(default)]
    analysis: Option<Analysis>,
    #[serde(default)]
    test_results: Option<TestOutcome>,
    #[serde(default, rename = "testOutcome")]
    test_outcome: Option<TestOutcome>,
    #[serde(default)]
    pr_url: Option<String>,
    #[serde(default, rename = "changeRequestUrl")]
    change_request_url: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

/// Result of one job, as returned by the processor
///
/// Every field is optional: a missing field means the stage produced
/// nothing. `Some("")` is kept distinct from `None`. The raw JSON object is
/// retained so it can be persisted verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    /// Summary message
    pub message: Option<String>,
    /// Branch the fix was committed to
    pub branch: Option<String>,
    /// Analysis stage output
    pub analysis: Option<Analysis>,
    /// Test stage output
    pub test_outcome: Option<TestOutcome>,
    /// URL of the opened change request
    pub change_request_url: Option<String>,
    /// Extra remark from the processor
    pub note: Option<String>,
    raw: Map<String, Value>,
}

impl JobResult {
    /// Interpret a JSON value as a job result
    ///
    /// Fails with [`Error::ResponseParse`] unless the value is an object whose
    /// known keys have the expected types.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(raw) = value else {
            return Err(Error::ResponseParse(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        };

        let fields: JobResultFields = serde_json::from_value(Value::Object(raw.clone()))
            .map_err(|e| Error::ResponseParse(e.to_string()))?;

        Ok(Self {
            message: fields.message,
            branch: fields.branch.or(fields.branch_name),
            analysis: fields.ai_analysis.or(fields.analysis),
            test_outcome: fields.test_results.or(fields.test_outcome),
            change_request_url: fields.pr_url.or(fields.change_request_url),
            note: fields.note,
            raw,
        })
    }

    /// Parse a job result from JSON text
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| Error::ResponseParse(e.to_string()))?;
        Self::from_value(value)
    }

    /// The JSON object this result was parsed from
    pub const fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Serialize the original JSON object
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.raw)?)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Stage of the fixing pipeline shown by the progress animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Analyzing the bug
    Analyze,
    /// Generating a fix
    GenerateFix,
    /// Running tests against the fix
    RunTests,
    /// Opening the change request
    OpenChangeRequest,
}

impl PipelineStage {
    /// All stages, in pipeline order
    pub const ALL: [Self; 4] = [
        Self::Analyze,
        Self::GenerateFix,
        Self::RunTests,
        Self::OpenChangeRequest,
    ];

    /// Display label
    pub const fn label(self) -> &'static str {
        match self {
            Self::Analyze => "AI Analyzing Bug",
            Self::GenerateFix => "Generating Fix",
            Self::RunTests => "Running Tests",
            Self::OpenChangeRequest => "Creating PR",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Snapshot of the session's login and repository state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionContext {
    /// Whether the user is logged in
    pub authenticated: bool,
    /// Registered repositories, in registration order (duplicates kept)
    pub repositories: Vec<String>,
}

/// Output of the repository registration form
#[derive(Clone, PartialEq, Eq)]
pub struct RepoRegistration {
    /// `owner/name` identifier
    pub repo_name: String,
    /// Repository web URL
    pub repo_url: String,
    /// Access token, never stored or sent by this crate
    pub token: String,
}

impl fmt::Debug for RepoRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoRegistration")
            .field("repo_name", &self.repo_name)
            .field("repo_url", &self.repo_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Logical navigation destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Bug report form
    Compose,
    /// Progress animation
    Processing,
    /// Job result
    Results,
    /// Login page
    Login,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compose => write!(f, "compose"),
            Self::Processing => write!(f, "processing"),
            Self::Results => write!(f, "results"),
            Self::Login => write!(f, "login"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_rejects_whitespace_fields() {
        let report = BugReport::new("   ", "returns 8");
        let err = report.validate().unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("bug description")));

        let report = BugReport::new("returns 2", "\n\t");
        let err = report.validate().unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("expected behavior")));
    }

    #[test]
    fn test_validate_accepts_filled_report() {
        assert!(BugReport::new("returns 2", "returns 8").validate().is_ok());
    }

    #[test]
    fn test_parse_wire_keys() {
        let result = JobResult::from_value(json!({
            "message": "done",
            "branch": "ai-fix-1",
            "pr_url": "https://github.com/o/r/pull/3",
            "ai_analysis": { "analysis": "off by one", "confidence": "high", "success": true },
            "test_results": { "success": true, "output": "ok", "return_code": 0 },
            "file_saved": null
        }))
        .unwrap();

        assert_eq!(result.message.as_deref(), Some("done"));
        assert_eq!(result.branch.as_deref(), Some("ai-fix-1"));
        assert_eq!(
            result.change_request_url.as_deref(),
            Some("https://github.com/o/r/pull/3")
        );
        let analysis = result.analysis.as_ref().unwrap();
        assert_eq!(analysis.summary.as_deref(), Some("off by one"));
        assert_eq!(analysis.confidence, Some(Confidence::Text("high".into())));
        assert!(result.test_outcome.as_ref().unwrap().passed);
        assert!(result.raw().contains_key("file_saved"));
    }

    #[test]
    fn test_parse_camel_case_aliases() {
        let result = JobResult::parse(
            r#"{"message":"ok","branchName":"fix/1","testOutcome":{"passed":false},"changeRequestUrl":"u"}"#,
        )
        .unwrap();
        assert_eq!(result.branch.as_deref(), Some("fix/1"));
        assert_eq!(result.change_request_url.as_deref(), Some("u"));
        let outcome = result.test_outcome.unwrap();
        assert!(!outcome.passed);
        assert!(outcome.output.is_none());
    }

    #[test]
    fn test_null_is_absent_and_empty_is_present() {
        let result = JobResult::parse(r#"{"message":"","pr_url":null}"#).unwrap();
        assert_eq!(result.message.as_deref(), Some(""));
        assert!(result.change_request_url.is_none());
    }

    #[test]
    fn test_null_sub_fields_are_absent() {
        let result = JobResult::parse(
            r#"{"message":"m","test_results":{"success":null,"output":"x","error":null},
                "ai_analysis":{"analysis":null,"confidence":null,"explanation":"e"}}"#,
        )
        .unwrap();

        let outcome = result.test_outcome.unwrap();
        assert!(!outcome.passed);
        assert_eq!(outcome.output.as_deref(), Some("x"));
        assert!(outcome.error.is_none());
        let analysis = result.analysis.unwrap();
        assert!(analysis.summary.is_none());
        assert!(analysis.confidence.is_none());
        assert_eq!(analysis.explanation.as_deref(), Some("e"));

        let result = JobResult::parse(r#"{"test_results":null,"ai_analysis":null}"#).unwrap();
        assert!(result.test_outcome.is_none());
        assert!(result.analysis.is_none());
    }

    #[test]
    fn test_wire_key_wins_over_camel_case_key() {
        let result = JobResult::parse(
            r#"{"message":"ok","branch":"main","branchName":"fix/1",
                "pr_url":"p","changeRequestUrl":"c",
                "ai_analysis":{"analysis":"a","summary":"s"},"analysis":{"summary":"b"},
                "test_results":{"success":true,"passed":false},"testOutcome":{"passed":false}}"#,
        )
        .unwrap();

        assert_eq!(result.branch.as_deref(), Some("main"));
        assert_eq!(result.change_request_url.as_deref(), Some("p"));
        assert_eq!(result.analysis.unwrap().summary.as_deref(), Some("a"));
        assert!(result.test_outcome.unwrap().passed);
    }

    #[test]
    fn test_camel_case_key_used_when_wire_key_null() {
        let result =
            JobResult::parse(r#"{"branch":null,"branchName":"fix/1","ai_analysis":null,"analysis":{"summary":"b"}}"#)
                .unwrap();
        assert_eq!(result.branch.as_deref(), Some("fix/1"));
        assert_eq!(result.analysis.unwrap().summary.as_deref(), Some("b"));
    }

    #[test]
    fn test_numeric_confidence() {
        let result = JobResult::parse(r#"{"ai_analysis":{"confidence":0.9}}"#).unwrap();
        let confidence = result.analysis.unwrap().confidence.unwrap();
        assert_eq!(confidence.to_string(), "0.9");
    }

    #[test]
    fn test_non_object_is_parse_error() {
        assert!(matches!(
            JobResult::parse("[1,2]"),
            Err(Error::ResponseParse(ref m)) if m.contains("an array")
        ));
        assert!(matches!(
            JobResult::parse("not json"),
            Err(Error::ResponseParse(_))
        ));
        assert!(matches!(
            JobResult::parse(r#"{"message": 5}"#),
            Err(Error::ResponseParse(_))
        ));
    }

    #[test]
    fn test_stage_order_and_labels() {
        assert_eq!(PipelineStage::ALL.len(), 4);
        assert_eq!(PipelineStage::ALL[0].to_string(), "AI Analyzing Bug");
        assert_eq!(PipelineStage::ALL[3].label(), "Creating PR");
    }

    #[test]
    fn test_registration_debug_redacts_token() {
        let reg = RepoRegistration {
            repo_name: "o/r".into(),
            repo_url: "https://github.com/o/r".into(),
            token: "ghp_secret".into(),
        };
        assert!(!format!("{reg:?}").contains("ghp_secret"));
    }

    #[test]
    fn test_attachment_load_uses_file_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("calculator.py");
        std::fs::write(&path, "return a - b\n").unwrap();

        let attachment = tokio_test::block_on(Attachment::load(&path)).unwrap();
        assert_eq!(attachment.file_name, "calculator.py");
        assert_eq!(attachment.bytes, b"return a - b\n");
        assert!(attachment.mime.is_none());
    }

    #[test]
    fn test_attachment_load_missing_file() {
        let err = tokio_test::block_on(Attachment::load(Path::new("/nonexistent/bug.py")));
        assert!(matches!(err, Err(Error::Io(_))));
    }
}
