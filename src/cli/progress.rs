//! Terminal rendering of the pipeline progress animation

use crate::cli::style::{spinner_style, Marker, Stylize};
use anstream::{eprintln, println};
use async_trait::async_trait;
use bugfix_profiler::flow::Orchestrator;
use bugfix_profiler::progress::AnimationCallback;
use bugfix_profiler::types::PipelineStage;
use indicatif::ProgressBar;
use std::time::Duration;

/// Spinner showing the highlighted stage, with finished stages printed above
pub struct CliAnimation {
    bar: ProgressBar,
    stages: Vec<PipelineStage>,
}

impl CliAnimation {
    /// Create for the given stage list
    pub fn new(stages: &[PipelineStage]) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style());
        Self {
            bar,
            stages: stages.to_vec(),
        }
    }

    /// Spin while the report is on its way to the processor
    pub fn submitting(&self) {
        self.bar.set_message("Submitting bug report...");
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn begin(&self) {
        self.bar.suspend(|| {
            println!("{}", "Processing Your Bug Report...".emphasis());
            println!();
        });
        self.bar.enable_steady_tick(Duration::from_millis(80));
        self.highlight(0);
    }

    /// Stop the spinner without marking anything done
    pub fn abandon(&self) {
        self.bar.finish_and_clear();
    }

    fn label(&self, index: usize) -> Option<String> {
        self.stages
            .get(index)
            .map(|stage| format!("{} {stage}", index + 1))
    }

    fn highlight(&self, index: usize) {
        let Some(label) = self.label(index) else {
            return;
        };
        if self.bar.is_hidden() {
            println!("  {} {}", Marker::Active, label.emphasis());
        }
        self.bar.set_message(label);
    }

    fn complete(&self, index: usize) {
        let Some(label) = self.label(index) else {
            return;
        };
        if self.bar.is_hidden() {
            println!("  {} {label}", Marker::Done);
        } else {
            self.bar.println(format!("  {} {label}", Marker::Done));
        }
    }
}

#[async_trait]
impl AnimationCallback for CliAnimation {
    async fn on_started(&self) {
        self.begin();
    }

    async fn on_stage(&self, index: usize, _stage: PipelineStage) {
        if index > 0 {
            self.complete(index - 1);
        }
        self.highlight(index);
    }

    async fn on_finished(&self) {
        if let Some(last) = self.stages.len().checked_sub(1) {
            self.complete(last);
        }
        self.bar.finish_and_clear();
        println!();
    }
}

/// Play the animation until it navigates to the results view
///
/// Ctrl-C tears the view down instead. Returns `false` when interrupted.
pub async fn follow_animation(flow: &mut Orchestrator, animation: &CliAnimation) -> bool {
    let interrupted = tokio::select! {
        _ = flow.wait_for_navigation() => false,
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        flow.leave().await;
        animation.abandon();
        eprintln!(
            "{} {}",
            "Interrupted.".warn(),
            "The job result is kept; view it with `bugfix results`.".muted()
        );
    }
    !interrupted
}
