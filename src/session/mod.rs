//! Session-scoped key/value storage
//!
//! Everything that crosses a view boundary (login flag, registered
//! repositories, the latest job result) lives here rather than in the
//! views themselves.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::{Error, Result};
use crate::types::{JobResult, RepoRegistration, SessionContext};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Key holding the login flag
pub const KEY_LOGGED_IN: &str = "is_logged_in";
/// Key holding the JSON list of registered repositories
pub const KEY_REPOS: &str = "github_repos";
/// Legacy key holding a single repository
pub const KEY_REPO: &str = "github_repo";
/// Key holding the last registered repository URL
pub const KEY_REPO_URL: &str = "github_url";
/// Key holding the raw JSON of the latest job result
pub const KEY_RESULT: &str = "bug_result";

/// String-keyed store that lives as long as one session
///
/// Values are strings; structured data is stored as JSON.
pub trait SessionStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value (no-op when absent)
    fn remove(&self, key: &str) -> Result<()>;

    /// Delete every value
    fn clear(&self) -> Result<()>;
}

/// Typed view over a [`SessionStore`]
#[derive(Clone)]
pub struct SessionState {
    store: Arc<dyn SessionStore>,
    default_repository: Option<String>,
}

impl SessionState {
    /// Wrap a store
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            default_repository: None,
        }
    }

    /// Repository reported when none has been registered
    #[must_use]
    pub fn with_default_repository(mut self, repo: Option<String>) -> Self {
        self.default_repository = repo;
        self
    }

    /// Access the underlying store
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Whether the user is logged in
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.store.get(KEY_LOGGED_IN)?.as_deref() == Some("true"))
    }

    /// Set or drop the login flag
    pub fn set_authenticated(&self, authenticated: bool) -> Result<()> {
        if authenticated {
            self.store.set(KEY_LOGGED_IN, "true")
        } else {
            self.store.remove(KEY_LOGGED_IN)
        }
    }

    /// Registered repositories
    ///
    /// Falls back to the legacy single-repository key, then to the default
    /// repository.
    pub fn repositories(&self) -> Result<Vec<String>> {
        if let Some(list) = self.store.get(KEY_REPOS)? {
            return serde_json::from_str(&list)
                .map_err(|e| Error::Store(format!("corrupt repository list: {e}")));
        }
        if let Some(repo) = self.store.get(KEY_REPO)? {
            return Ok(vec![repo]);
        }
        Ok(self.default_repository.iter().cloned().collect())
    }

    /// Append a repository from the registration form
    ///
    /// Duplicates are kept. The token is ignored.
    pub fn add_repository(&self, registration: &RepoRegistration) -> Result<()> {
        let mut repos = match self.store.get(KEY_REPOS)? {
            Some(list) => serde_json::from_str::<Vec<String>>(&list)
                .map_err(|e| Error::Store(format!("corrupt repository list: {e}")))?,
            None => Vec::new(),
        };
        repos.push(registration.repo_name.clone());
        self.store.set(KEY_REPOS, &serde_json::to_string(&repos)?)?;
        self.store.set(KEY_REPO_URL, &registration.repo_url)?;
        debug!(repo = %registration.repo_name, count = repos.len(), "registered repository");
        Ok(())
    }

    /// Snapshot of login and repository state
    pub fn context(&self) -> Result<SessionContext> {
        Ok(SessionContext {
            authenticated: self.is_authenticated()?,
            repositories: self.repositories()?,
        })
    }

    /// Persist a job result, overwriting the previous one
    pub fn save_job_result(&self, result: &JobResult) -> Result<()> {
        self.store.set(KEY_RESULT, &result.to_json()?)
    }

    /// Stored job result text, exactly as persisted
    pub fn stored_job_result(&self) -> Result<Option<String>> {
        self.store.get(KEY_RESULT)
    }

    /// Stored job result as JSON
    pub fn raw_job_result(&self) -> Result<Option<Value>> {
        self.stored_job_result()?
            .map(|text| {
                serde_json::from_str(&text).map_err(|e| Error::MalformedResult(e.to_string()))
            })
            .transpose()
    }

    /// Stored job result
    ///
    /// Fails with [`Error::MissingResult`] when nothing is stored and
    /// [`Error::MalformedResult`] when the stored value is not a job result.
    pub fn load_job_result(&self) -> Result<JobResult> {
        let text = self.stored_job_result()?.ok_or(Error::MissingResult)?;
        JobResult::parse(&text).map_err(|e| match e {
            Error::ResponseParse(msg) => Error::MalformedResult(msg),
            other => other,
        })
    }

    /// Whether a job result is stored
    pub fn has_job_result(&self) -> Result<bool> {
        Ok(self.stored_job_result()?.is_some())
    }

    /// Drop everything in the session
    pub fn logout(&self) -> Result<()> {
        debug!("clearing session");
        self.store.clear()
    }
}
