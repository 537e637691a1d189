//! Submit command - compose a bug report, submit it and follow the job

use crate::cli::progress::{follow_animation, CliAnimation};
use crate::cli::results::print_view;
use crate::cli::{prompt_error, App};
use bugfix_profiler::error::Result;
use bugfix_profiler::flow::FlowMode;
use bugfix_profiler::types::{Attachment, PipelineStage};
use dialoguer::Input;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

/// Compose view input
#[derive(Debug, Default)]
pub struct SubmitArgs {
    /// Bug description (prompted for when missing on a terminal)
    pub description: Option<String>,
    /// Expected behavior (prompted for when missing on a terminal)
    pub expected: Option<String>,
    /// Optional attachment path
    pub file: Option<PathBuf>,
    /// Play the animation in place instead of routing through processing
    pub inline: bool,
}

fn field(value: Option<String>, prompt: &str, interactive: bool) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None if interactive => Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error),
        None => Ok(String::new()),
    }
}

/// Run the submit command
pub async fn run_submit(app: &App, args: SubmitArgs) -> Result<()> {
    let mode = if args.inline {
        FlowMode::Inline
    } else {
        FlowMode::Routed
    };
    let animation = Arc::new(CliAnimation::new(&PipelineStage::ALL));
    let mut flow = app.orchestrator(mode)?.with_observer(animation.clone());

    let interactive = std::io::stdin().is_terminal();
    let description = field(args.description, "Bug description", interactive)?;
    let expected = field(args.expected, "Expected behavior", interactive)?;
    let attachment = match &args.file {
        Some(path) => Some(Attachment::load(path).await?),
        None => None,
    };

    let form = flow.compose_mut();
    form.description = description;
    form.expected_behavior = expected;
    form.attachment = attachment;

    animation.submitting();
    if let Err(err) = flow.submit().await {
        animation.abandon();
        return Err(err);
    }

    if follow_animation(&mut flow, &animation).await {
        print_view(flow.view());
    }
    Ok(())
}
