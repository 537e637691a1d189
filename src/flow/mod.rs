//! View orchestration
//!
//! Drives one front end through compose → submitting → animating → result.
//! Two modes share the same store and animator contract:
//! - [`FlowMode::Routed`]: a successful submission navigates to the
//!   processing route, whose entry starts the animation
//! - [`FlowMode::Inline`]: the animation plays in place on the compose route
//!
//! In both modes the animation's terminal notification navigates to the
//! results route, which reads the stored result.

mod form;

pub use form::ComposeForm;

use crate::client::{JobProcessor, submit_report};
use crate::error::{Error, Result};
use crate::progress::{AnimationCallback, AnimationHandle, NoopAnimation, ProgressAnimator};
use crate::render::{MissingReason, ResultReport, ResultView, render_result};
use crate::session::SessionState;
use crate::types::{BugReport, JobResult, RepoRegistration, Route, SessionContext};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How the processing and result views are reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowMode {
    /// Separate routes for processing and results
    Routed,
    /// Processing plays on the compose route
    Inline,
}

/// What the front end should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Bug report form, with the last submission error if any
    Compose {
        /// Error from the last submit attempt
        error: Option<String>,
    },
    /// Waiting for the job processor
    Submitting,
    /// Progress animation running
    Animating,
    /// Completed job result
    Result(Box<ResultReport>),
    /// No usable result; offer a way back to the form
    Missing(MissingReason),
    /// Login page
    Login,
}

impl View {
    const fn name(&self) -> &'static str {
        match self {
            Self::Compose { .. } => "compose",
            Self::Submitting => "submitting",
            Self::Animating => "animating",
            Self::Result(_) => "result",
            Self::Missing(_) => "missing",
            Self::Login => "login",
        }
    }
}

impl From<ResultView> for View {
    fn from(view: ResultView) -> Self {
        match view {
            ResultView::Complete(report) => Self::Result(Box::new(report)),
            ResultView::Missing { reason, .. } => Self::Missing(reason),
        }
    }
}

/// Per-instance state machine across the compose, processing and results views
pub struct Orchestrator {
    processor: Arc<dyn JobProcessor>,
    session: SessionState,
    animator: ProgressAnimator,
    observer: Arc<dyn AnimationCallback>,
    mode: FlowMode,
    route: Route,
    view: View,
    form: ComposeForm,
    in_flight: bool,
    animation: Option<AnimationHandle>,
}

impl Orchestrator {
    /// Create an orchestrator on the compose route
    pub fn new(
        processor: Arc<dyn JobProcessor>,
        session: SessionState,
        animator: ProgressAnimator,
        mode: FlowMode,
    ) -> Self {
        Self {
            processor,
            session,
            animator,
            observer: Arc::new(NoopAnimation),
            mode,
            route: Route::Compose,
            view: View::Compose { error: None },
            form: ComposeForm::default(),
            in_flight: false,
            animation: None,
        }
    }

    /// Forward animation updates to a front end
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn AnimationCallback>) -> Self {
        self.observer = observer;
        self
    }

    /// Current route
    pub const fn route(&self) -> Route {
        self.route
    }

    /// Current view
    pub const fn view(&self) -> &View {
        &self.view
    }

    /// Flow mode
    pub const fn mode(&self) -> FlowMode {
        self.mode
    }

    /// Session state shared with other views
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    /// Compose form contents
    pub const fn form(&self) -> &ComposeForm {
        &self.form
    }

    /// Edit the compose form
    pub fn compose_mut(&mut self) -> &mut ComposeForm {
        &mut self.form
    }

    /// Whether a submission is waiting for the processor
    pub const fn is_submitting(&self) -> bool {
        self.in_flight
    }

    /// Highlighted stage while animating
    pub fn stage_index(&self) -> Option<usize> {
        self.animation.as_ref().map(|a| a.status().stage_index)
    }

    /// Whether the submit action is enabled
    pub fn can_submit(&self) -> bool {
        matches!(self.view, View::Compose { .. }) && !self.in_flight && self.form.is_complete()
    }

    fn set_view(&mut self, view: View) {
        debug!(route = %self.route, from = self.view.name(), to = view.name(), "view change");
        self.view = view;
    }

    fn stop_animation(&mut self) {
        if let Some(mut handle) = self.animation.take() {
            handle.cancel();
        }
    }

    /// Start a submission from the compose form
    ///
    /// Validates the form and enters the submitting view. Only one
    /// submission may be in flight at a time.
    pub fn begin_submit(&mut self) -> Result<BugReport> {
        if self.in_flight {
            return Err(Error::SubmissionInFlight);
        }
        if !matches!(self.view, View::Compose { .. }) {
            return Err(Error::InvalidState(format!(
                "cannot submit from the {} view",
                self.view.name()
            )));
        }

        let report = self.form.to_report();
        if let Err(err) = report.validate() {
            self.set_view(View::Compose {
                error: Some(err.to_string()),
            });
            return Err(err);
        }

        self.in_flight = true;
        self.set_view(View::Submitting);
        Ok(report)
    }

    /// Resolve the submission started by [`begin_submit`](Self::begin_submit)
    ///
    /// On success the result is persisted before any animation starts. On
    /// failure the compose view shows the error and nothing is persisted.
    pub fn finish_submit(&mut self, outcome: Result<JobResult>) -> Result<()> {
        if !self.in_flight {
            return Err(Error::InvalidState("no submission in progress".to_string()));
        }
        self.in_flight = false;

        let persisted = outcome.and_then(|result| self.session.save_job_result(&result));
        if let Err(err) = persisted {
            warn!(error = %err, "submission failed");
            self.set_view(View::Compose {
                error: Some(err.to_string()),
            });
            return Err(err);
        }

        info!("job result stored");
        match self.mode {
            FlowMode::Routed => self.navigate(Route::Processing),
            FlowMode::Inline => self.start_animation(),
        }
        Ok(())
    }

    /// Submit the compose form and wait for the processor
    pub async fn submit(&mut self) -> Result<()> {
        let report = self.begin_submit()?;
        let outcome = submit_report(self.processor.as_ref(), &report).await;
        self.finish_submit(outcome)
    }

    fn start_animation(&mut self) {
        self.stop_animation();
        self.animation = Some(self.animator.start(Arc::clone(&self.observer)));
        self.set_view(View::Animating);
    }

    /// Enter the processing view
    ///
    /// The animation only starts when a job result is stored; otherwise the
    /// view offers a way back to the form.
    pub fn enter_processing(&mut self) {
        self.route = Route::Processing;
        match self.session.has_job_result() {
            Ok(true) => self.start_animation(),
            Ok(false) => {
                self.stop_animation();
                self.set_view(View::Missing(MissingReason::NoResult));
            }
            Err(err) => {
                self.stop_animation();
                self.set_view(ResultView::from_error(&err).into());
            }
        }
    }

    /// Wait for the running animation's terminal notification
    ///
    /// On notification, navigates to the results route. Returns the route
    /// the flow ends up on; without a running animation nothing changes.
    pub async fn wait_for_navigation(&mut self) -> Route {
        let finished = match &self.animation {
            Some(handle) => handle.finished().await,
            None => return self.route,
        };
        self.animation = None;
        if finished {
            self.enter_results();
        }
        self.route
    }

    /// Enter the results view and render the stored result
    pub fn enter_results(&mut self) {
        self.stop_animation();
        self.route = Route::Results;
        let view = match self.session.stored_job_result() {
            Ok(stored) => render_result(stored.as_deref()),
            Err(err) => ResultView::from_error(&err),
        };
        self.set_view(view.into());
    }

    /// Clear the form and return to compose; the stored result stays
    pub fn submit_another(&mut self) {
        self.stop_animation();
        self.form.clear();
        self.route = Route::Compose;
        self.set_view(View::Compose { error: None });
    }

    /// Navigate to a route, tearing down the current view
    pub fn navigate(&mut self, route: Route) {
        self.stop_animation();
        match route {
            Route::Compose => {
                self.route = Route::Compose;
                self.set_view(View::Compose { error: None });
            }
            Route::Processing => self.enter_processing(),
            Route::Results => self.enter_results(),
            Route::Login => {
                self.route = Route::Login;
                self.set_view(View::Login);
            }
        }
    }

    /// Tear down the view
    ///
    /// Stops any running animation and waits out a callback in progress, so
    /// the observer sees nothing after this returns.
    pub async fn leave(&mut self) {
        if let Some(mut handle) = self.animation.take() {
            handle.stop().await;
        }
    }

    /// Mark the session as logged in and go to the form
    pub fn login(&mut self) -> Result<()> {
        self.session.set_authenticated(true)?;
        self.navigate(Route::Compose);
        Ok(())
    }

    /// Clear the whole session and go to the login page
    pub fn logout(&mut self) -> Result<()> {
        self.session.logout()?;
        self.form.clear();
        self.navigate(Route::Login);
        Ok(())
    }

    /// Apply the repository registration form's output
    ///
    /// `None` means the form was cancelled. Returns the repository list.
    pub fn register_repository(
        &mut self,
        registration: Option<RepoRegistration>,
    ) -> Result<Vec<String>> {
        if let Some(registration) = registration {
            self.session.add_repository(&registration)?;
        }
        self.session.repositories()
    }

    /// Login and repository snapshot
    pub fn context(&self) -> Result<SessionContext> {
        self.session.context()
    }
}
