//! CLI commands
//!
//! Command implementations for the `bugfix` binary. Each command plays the
//! part of one view: compose/submit, processing, results, login and the
//! repository form.

mod progress;
mod results;
mod session;
mod style;
mod submit;

pub use results::{run_processing, run_results};
pub use session::{run_login, run_logout, run_repo_add, run_repo_list, run_status};
pub use submit::{run_submit, SubmitArgs};

use bugfix_profiler::client::HttpJobClient;
use bugfix_profiler::config::ClientConfig;
use bugfix_profiler::error::{Error, Result};
use bugfix_profiler::flow::{FlowMode, Orchestrator};
use bugfix_profiler::progress::ProgressAnimator;
use bugfix_profiler::session::{FileStore, SessionState};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Settle delay used when the animation plays in place
const INLINE_SETTLE: Duration = Duration::from_millis(1000);

/// Resolved configuration plus the session it points at
pub struct App {
    config: ClientConfig,
    session: SessionState,
}

impl App {
    /// Open the configured session
    pub fn new(config: ClientConfig) -> Result<Self> {
        let dir = config.resolved_session_dir()?;
        let store = FileStore::open(&dir, &config.session_name);
        debug!(path = %store.path().display(), "using session file");
        let session = SessionState::new(Arc::new(store))
            .with_default_repository(config.default_repository.clone());
        Ok(Self { config, session })
    }

    /// Session state
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    fn animator(&self, mode: FlowMode) -> ProgressAnimator {
        let animator = ProgressAnimator::with_interval(self.config.stage_interval);
        match mode {
            FlowMode::Routed => animator,
            FlowMode::Inline => {
                animator.with_settle_delay(self.config.stage_interval.min(INLINE_SETTLE))
            }
        }
    }

    /// Build an orchestrator over this session
    pub fn orchestrator(&self, mode: FlowMode) -> Result<Orchestrator> {
        let client = HttpJobClient::new(&self.config)?;
        Ok(Orchestrator::new(
            Arc::new(client),
            self.session.clone(),
            self.animator(mode),
            mode,
        ))
    }
}

/// Wrap an interactive prompt failure
fn prompt_error(err: dialoguer::Error) -> Error {
    Error::Io(std::io::Error::other(err.to_string()))
}
