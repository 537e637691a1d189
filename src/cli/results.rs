//! Processing and results views

use crate::cli::progress::{follow_animation, CliAnimation};
use crate::cli::style::{hyperlink_url, Marker, Stream, Stylize};
use crate::cli::App;
use anstream::{eprintln, println};
use bugfix_profiler::error::Result;
use bugfix_profiler::flow::{FlowMode, View};
use bugfix_profiler::render::{ChangeRequestView, ResultAction, ResultReport};
use bugfix_profiler::types::{PipelineStage, Route};
use std::sync::Arc;

/// Resume the progress animation for the stored result
pub async fn run_processing(app: &App) -> Result<()> {
    let animation = Arc::new(CliAnimation::new(&PipelineStage::ALL));
    let mut flow = app
        .orchestrator(FlowMode::Routed)?
        .with_observer(animation.clone());

    flow.navigate(Route::Processing);
    if !matches!(flow.view(), View::Animating) {
        print_view(flow.view());
        return Ok(());
    }

    if follow_animation(&mut flow, &animation).await {
        print_view(flow.view());
    }
    Ok(())
}

/// Show the stored result
pub fn run_results(app: &App) -> Result<()> {
    let mut flow = app.orchestrator(FlowMode::Routed)?;
    flow.navigate(Route::Results);
    print_view(flow.view());
    Ok(())
}

/// Print whatever the orchestrator is showing
pub fn print_view(view: &View) {
    match view {
        View::Result(report) => print_report(report),
        View::Missing(reason) => {
            eprintln!("{} {}", Marker::Failed, "Error".error());
            eprintln!("{}", reason.message());
            println!();
            print_action(&ResultAction::ReturnToCompose);
        }
        View::Compose { error: Some(error) } => {
            eprintln!("{} {}", Marker::Failed, error.error());
        }
        View::Compose { error: None } => {
            println!("To submit a bug: {}", "bugfix submit".accent());
        }
        View::Submitting => println!("{}", "Submitting...".muted()),
        View::Animating => println!("{}", "Processing...".muted()),
        View::Login => {
            println!("Logged out.");
            println!("{} Log in again: {}", Marker::Next, "bugfix login".accent());
        }
    }
}

fn print_report(report: &ResultReport) {
    println!("{} {}", Marker::Done, "Bug Fix Pipeline Complete".success());
    println!();
    println!("{}", "AI Processing Result:".emphasis());
    println!("  {}", report.message);
    if let Some(branch) = &report.branch {
        println!("  Branch: {}", branch.accent());
    }

    if let Some(analysis) = &report.analysis {
        println!();
        println!("{}", "AI Analysis:".emphasis());
        println!("  {}", analysis.summary);
        println!("  Confidence: {}", analysis.confidence.accent());
        if let Some(explanation) = &analysis.explanation {
            println!("  Explanation: {explanation}");
        }
    }

    if let Some(tests) = &report.tests {
        println!();
        println!("{}", "Test Results:".emphasis());
        if tests.passed {
            println!("  Status: {} {}", Marker::Done, "Passed".success());
        } else {
            println!("  Status: {} {}", Marker::Failed, "Failed".error().for_stdout());
        }
        if let Some(output) = &tests.output {
            for line in output.lines() {
                println!("    {}", line.muted());
            }
        }
        if let Some(error) = &tests.error {
            for line in error.lines() {
                println!("    {}", line.error().for_stdout());
            }
        }
    }

    if let Some(note) = &report.note {
        println!();
        println!("{} {}", "Note:".emphasis(), note);
    }

    println!();
    if let ChangeRequestView::NotOpened { explanation } = &report.change_request {
        println!("{}", explanation.warn().for_stdout());
        println!();
    }
    for action in &report.actions {
        print_action(action);
    }
}

fn print_action(action: &ResultAction) {
    match action {
        ResultAction::OpenChangeRequest(url) => println!(
            "{} View Pull Request: {}",
            Marker::Next,
            hyperlink_url(Stream::Stdout, url).accent()
        ),
        ResultAction::SubmitAnother => {
            println!("{} Submit another bug: {}", Marker::Next, "bugfix submit".accent());
        }
        ResultAction::ReturnToCompose => {
            println!("{} Go back: {}", Marker::Next, "bugfix submit".accent());
        }
    }
}
