//! HTTP job processor client

use crate::client::JobProcessor;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::{BugReport, JobResult};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

/// Multipart field carrying the bug description
pub const FIELD_BUG: &str = "actual_bug";
/// Multipart field carrying the expected behavior
pub const FIELD_EXPECTED: &str = "expected_fix";
/// Multipart field carrying the optional attachment
pub const FIELD_FILE: &str = "bug_file";

/// Posts bug reports to `<endpoint>/process-bug` as multipart forms
pub struct HttpJobClient {
    client: Client,
    url: Url,
}

impl HttpJobClient {
    /// Create a client from configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let url = config.process_url()?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        if is_loopback(&url) {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self { client, url })
    }

    /// Target URL
    pub const fn url(&self) -> &Url {
        &self.url
    }

    fn build_form(report: &BugReport) -> Result<Form> {
        let mut form = Form::new()
            .text(FIELD_BUG, report.description.clone())
            .text(FIELD_EXPECTED, report.expected_behavior.clone());

        if let Some(attachment) = &report.attachment {
            let mut part =
                Part::bytes(attachment.bytes.clone()).file_name(attachment.file_name.clone());
            if let Some(mime) = &attachment.mime {
                part = part
                    .mime_str(mime)
                    .map_err(|_| Error::Validation(format!("invalid attachment type: {mime}")))?;
            }
            form = form.part(FIELD_FILE, part);
        }

        Ok(form)
    }
}

#[async_trait]
impl JobProcessor for HttpJobClient {
    async fn submit(&self, report: &BugReport) -> Result<JobResult> {
        report.validate()?;
        let form = Self::build_form(report)?;

        info!(
            url = %self.url,
            attachment = report.attachment.as_ref().map(|a| a.file_name.as_str()),
            "submitting bug report"
        );

        let response = self.client.post(self.url.clone()).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "job processor responded");

        if !status.is_success() {
            let message = rejection_message(status, &body);
            warn!(%status, %message, "job processor rejected report");
            return Err(Error::RemoteRejected {
                status: status.as_u16(),
                message,
            });
        }

        JobResult::parse(&body)
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

/// Human-readable message for a rejected submission
///
/// Prefers the body's `detail` field, then the whole JSON body, then the
/// raw text, then the status line.
fn rejection_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(detail) => detail.to_string(),
            None => Value::Object(map).to_string(),
        },
        Ok(other) => other.to_string(),
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_message_prefers_detail() {
        let msg = rejection_message(StatusCode::UNPROCESSABLE_ENTITY, r#"{"detail":"bad input"}"#);
        assert_eq!(msg, "bad input");
    }

    #[test]
    fn test_rejection_message_structured_detail() {
        let msg = rejection_message(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":[{"loc":["body","actual_bug"],"msg":"field required"}]}"#,
        );
        assert!(msg.contains("field required"));
    }

    #[test]
    fn test_rejection_message_dumps_body_without_detail() {
        let msg = rejection_message(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"boom"}"#);
        assert_eq!(msg, r#"{"error":"boom"}"#);
    }

    #[test]
    fn test_rejection_message_plain_text_and_empty() {
        assert_eq!(
            rejection_message(StatusCode::BAD_GATEWAY, "upstream down\n"),
            "upstream down"
        );
        assert_eq!(
            rejection_message(StatusCode::SERVICE_UNAVAILABLE, ""),
            "503 Service Unavailable"
        );
    }

    #[test]
    fn test_client_targets_process_route() {
        let client = HttpJobClient::new(&ClientConfig::default()).unwrap();
        assert_eq!(client.url().as_str(), "http://127.0.0.1:8001/process-bug");
    }

    #[test]
    fn test_loopback_detection() {
        let local = |s: &str| is_loopback(&Url::parse(s).unwrap());
        assert!(local("http://127.0.0.1:8001/process-bug"));
        assert!(local("http://localhost:8001/"));
        assert!(local("http://[::1]:8001/"));
        assert!(!local("https://fixer.example.com/process-bug"));
    }
}
