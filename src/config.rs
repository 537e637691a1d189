//! Client configuration
//!
//! Defaults, overridden by environment variables, overridden by CLI flags.
//!
//! | Variable                    | Meaning                                 |
//! |-----------------------------|-----------------------------------------|
//! | `BUGFIX_ENDPOINT`           | Base URL of the job processor           |
//! | `BUGFIX_SESSION`            | Session name                            |
//! | `BUGFIX_SESSION_DIR`        | Directory holding session files         |
//! | `BUGFIX_STAGE_INTERVAL_MS`  | Progress animation step interval        |
//! | `BUGFIX_TIMEOUT_SECS`       | Request timeout (unset = no timeout)    |
//! | `BUGFIX_DEFAULT_REPO`       | Repository shown when none is registered|

use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default job processor base URL
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8001";

/// Default progress animation step interval in milliseconds
pub const DEFAULT_STAGE_INTERVAL_MS: u64 = 1500;

/// Default session name
pub const DEFAULT_SESSION: &str = "default";

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the job processor
    pub endpoint: Url,
    /// Name of the session whose store is used
    pub session_name: String,
    /// Directory holding session files (None = user cache dir)
    pub session_dir: Option<PathBuf>,
    /// Progress animation step interval
    pub stage_interval: Duration,
    /// Optional request timeout
    pub request_timeout: Option<Duration>,
    /// Repository reported when none has been registered
    pub default_repository: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("hardcoded endpoint is valid"),
            session_name: DEFAULT_SESSION.to_string(),
            session_dir: None,
            stage_interval: Duration::from_millis(DEFAULT_STAGE_INTERVAL_MS),
            request_timeout: None,
            default_repository: None,
        }
    }
}

impl ClientConfig {
    /// Build configuration from process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("BUGFIX_ENDPOINT") {
            config.set_endpoint(&endpoint)?;
        }
        if let Some(name) = lookup("BUGFIX_SESSION").filter(|s| !s.trim().is_empty()) {
            config.set_session_name(&name)?;
        }
        if let Some(dir) = lookup("BUGFIX_SESSION_DIR").filter(|s| !s.is_empty()) {
            config.session_dir = Some(PathBuf::from(dir));
        }
        if let Some(ms) = lookup("BUGFIX_STAGE_INTERVAL_MS") {
            config.stage_interval = Duration::from_millis(parse_number("BUGFIX_STAGE_INTERVAL_MS", &ms)?);
        }
        if let Some(secs) = lookup("BUGFIX_TIMEOUT_SECS") {
            let secs = parse_number("BUGFIX_TIMEOUT_SECS", &secs)?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(repo) = lookup("BUGFIX_DEFAULT_REPO").filter(|s| !s.trim().is_empty()) {
            config.default_repository = Some(repo);
        }

        Ok(config)
    }

    /// Override the processor base URL
    pub fn set_endpoint(&mut self, endpoint: &str) -> Result<()> {
        let url = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("invalid endpoint {endpoint:?}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "endpoint must be http or https: {endpoint}"
            )));
        }
        self.endpoint = url;
        Ok(())
    }

    /// Override the session name
    ///
    /// Names become file names, so only `[A-Za-z0-9_-]` is accepted.
    pub fn set_session_name(&mut self, name: &str) -> Result<()> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::Config(format!("invalid session name: {name:?}")));
        }
        self.session_name = name.to_string();
        Ok(())
    }

    /// URL of the bug processing route
    pub fn process_url(&self) -> Result<Url> {
        let mut base = self.endpoint.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join("process-bug")
            .map_err(|e| Error::Config(format!("cannot build process URL: {e}")))
    }

    /// Directory holding session files
    pub fn resolved_session_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.session_dir {
            return Ok(dir.clone());
        }
        dirs::cache_dir()
            .map(|d| d.join("bugfix-profiler").join("sessions"))
            .ok_or_else(|| Error::Config("cannot determine cache directory".to_string()))
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} must be a whole number, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.endpoint.as_str(), "http://127.0.0.1:8001/");
        assert_eq!(config.stage_interval, Duration::from_millis(1500));
        assert_eq!(config.session_name, "default");
        assert!(config.request_timeout.is_none());
        assert_eq!(
            config.process_url().unwrap().as_str(),
            "http://127.0.0.1:8001/process-bug"
        );
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("BUGFIX_ENDPOINT", "https://fixer.example.com/api"),
            ("BUGFIX_SESSION", "tab-2"),
            ("BUGFIX_STAGE_INTERVAL_MS", "10"),
            ("BUGFIX_TIMEOUT_SECS", "30"),
            ("BUGFIX_DEFAULT_REPO", "acme/widgets"),
        ]))
        .unwrap();

        assert_eq!(
            config.process_url().unwrap().as_str(),
            "https://fixer.example.com/api/process-bug"
        );
        assert_eq!(config.session_name, "tab-2");
        assert_eq!(config.stage_interval, Duration::from_millis(10));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.default_repository.as_deref(), Some("acme/widgets"));
    }

    #[test]
    fn test_zero_timeout_disables() {
        let config = ClientConfig::from_lookup(lookup(&[("BUGFIX_TIMEOUT_SECS", "0")])).unwrap();
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("BUGFIX_STAGE_INTERVAL_MS", "fast")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("BUGFIX_ENDPOINT", "ftp://host")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("BUGFIX_SESSION", "../etc")])),
            Err(Error::Config(_))
        ));
    }
}
