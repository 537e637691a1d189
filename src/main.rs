//! bugfix - describe a bug, let the fixer open a pull request
//!
//! CLI binary for submitting bug reports to the automated fixing service.

use anyhow::Result;
use bugfix_profiler::config::ClientConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "bugfix")]
#[command(about = "Submit bugs to the automated fixer and follow the job to its pull request")]
#[command(version)]
struct Cli {
    /// Job processor base URL (overrides BUGFIX_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Session name (overrides BUGFIX_SESSION)
    #[arg(long, global = true)]
    session: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe a bug and submit it
    Submit {
        /// What goes wrong
        #[arg(short, long)]
        description: Option<String>,

        /// What should happen instead
        #[arg(short, long)]
        expected: Option<String>,

        /// File to attach to the report
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Show progress in place instead of the processing view
        #[arg(long)]
        inline: bool,
    },

    /// Replay the progress view for the stored result
    Processing,

    /// Show the stored job result
    Results,

    /// Log in to this session
    Login,

    /// Clear this session
    Logout,

    /// Repository management
    Repo {
        #[command(subcommand)]
        action: RepoAction,
    },
}

#[derive(Subcommand)]
enum RepoAction {
    /// Connect a repository
    Add {
        /// Repository as owner/name
        name: String,

        /// Repository URL
        #[arg(long)]
        url: String,

        /// Personal access token (prompted for when omitted)
        #[arg(long)]
        token: Option<String>,
    },
    /// List connected repositories
    List,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = ClientConfig::from_env()?;
    if let Some(endpoint) = &cli.endpoint {
        config.set_endpoint(endpoint)?;
    }
    if let Some(session) = &cli.session {
        config.set_session_name(session)?;
    }
    let app = cli::App::new(config)?;

    match cli.command {
        None => cli::run_status(&app)?,
        Some(Commands::Submit {
            description,
            expected,
            file,
            inline,
        }) => {
            let args = cli::SubmitArgs {
                description,
                expected,
                file,
                inline,
            };
            cli::run_submit(&app, args).await?;
        }
        Some(Commands::Processing) => cli::run_processing(&app).await?,
        Some(Commands::Results) => cli::run_results(&app)?,
        Some(Commands::Login) => cli::run_login(&app)?,
        Some(Commands::Logout) => cli::run_logout(&app)?,
        Some(Commands::Repo { action }) => match action {
            RepoAction::Add { name, url, token } => cli::run_repo_add(&app, name, url, token)?,
            RepoAction::List => cli::run_repo_list(&app)?,
        },
    }

    Ok(())
}
