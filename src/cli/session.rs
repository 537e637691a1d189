//! Session commands - login, logout, repositories and status

use crate::cli::results::print_view;
use crate::cli::style::{Marker, Stylize};
use crate::cli::{prompt_error, App};
use anstream::println;
use bugfix_profiler::error::{Error, Result};
use bugfix_profiler::flow::FlowMode;
use bugfix_profiler::types::RepoRegistration;
use dialoguer::Password;
use std::io::IsTerminal;

/// Default command: show the session's state
pub fn run_status(app: &App) -> Result<()> {
    let context = app.session().context()?;
    let has_result = app.session().has_job_result()?;

    println!("{}", "BugFix Profiler".emphasis());
    println!();
    if context.authenticated {
        println!("{} Logged in", Marker::Done);
    } else {
        println!("{}", "Not logged in".muted());
    }

    print_repositories(&context.repositories);

    println!();
    if has_result {
        println!("A job result is stored: {}", "bugfix results".accent());
    }
    println!("To submit a bug: {}", "bugfix submit".accent());
    Ok(())
}

/// Mark the session as logged in
pub fn run_login(app: &App) -> Result<()> {
    let mut flow = app.orchestrator(FlowMode::Routed)?;
    flow.login()?;
    println!("{} Logged in", Marker::Done);
    println!("{} Submit a bug: {}", Marker::Next, "bugfix submit".accent());
    Ok(())
}

/// Clear the session
pub fn run_logout(app: &App) -> Result<()> {
    let mut flow = app.orchestrator(FlowMode::Routed)?;
    flow.logout()?;
    print_view(flow.view());
    Ok(())
}

/// Register a repository with the session
///
/// The token is collected to honour the registration form but is neither
/// stored nor sent anywhere.
pub fn run_repo_add(app: &App, name: String, url: String, token: Option<String>) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation("repository name must not be empty".to_string()));
    }

    let token = match token {
        Some(token) => token,
        None if std::io::stdin().is_terminal() => Password::new()
            .with_prompt("Personal access token")
            .allow_empty_password(true)
            .interact()
            .map_err(prompt_error)?,
        None => String::new(),
    };

    let mut flow = app.orchestrator(FlowMode::Routed)?;
    let repos = flow.register_repository(Some(RepoRegistration {
        repo_name: name.clone(),
        repo_url: url,
        token,
    }))?;

    println!("{} Connected {}", Marker::Done, name.accent());
    print_repositories(&repos);
    Ok(())
}

/// List registered repositories
pub fn run_repo_list(app: &App) -> Result<()> {
    print_repositories(&app.session().repositories()?);
    Ok(())
}

fn print_repositories(repos: &[String]) {
    if repos.is_empty() {
        println!("{}", "No repositories connected".muted());
        println!(
            "{}",
            "Connect one with: bugfix repo add <owner/name> --url <url>".muted()
        );
        return;
    }
    println!("{}", "Repositories:".emphasis());
    for repo in repos {
        println!("  {} {}", Marker::Item, repo.accent());
    }
}
