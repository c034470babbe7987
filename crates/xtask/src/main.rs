//! xtask: project tasks for cafe-e2e
//!
//! ```bash
//! cargo xtask e2e                          # Run the default suite on every project
//! cargo xtask e2e --project chromium       # One project only
//! cargo xtask e2e --grep "Name" --headed   # Filter scenarios, show the browser
//! cargo xtask list --archived              # Show the scenario catalogue
//! ```

use anyhow::Context;
use cafe_e2e::{RunConfig, Runner, scenarios};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "xtask", about = "cafe-e2e project tasks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the end-to-end suite
    E2e(E2eArgs),
    /// List scenarios
    List(ListArgs),
}

#[derive(Args, Debug)]
struct E2eArgs {
    /// Only run these projects (repeatable)
    #[arg(long = "project", value_name = "NAME")]
    projects: Vec<String>,

    /// Storefront to test (overrides BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Extra attempts after a failure
    #[arg(long)]
    retries: Option<u32>,

    /// Concurrent tests
    #[arg(long)]
    workers: Option<usize>,

    /// Only run scenarios whose name matches this regex
    #[arg(long)]
    grep: Option<String>,

    /// JSON run configuration, layered under the environment and flags
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Include archived scenarios
    #[arg(long)]
    archived: bool,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Include archived scenarios
    #[arg(long)]
    archived: bool,
}

impl E2eArgs {
    fn into_config(self) -> anyhow::Result<RunConfig> {
        let base = match &self.config {
            Some(path) => RunConfig::load(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => RunConfig::default(),
        };
        let mut config = base.with_env(|key| std::env::var(key).ok());

        config.select_projects(&self.projects)?;
        if let Some(url) = self.base_url {
            config.base_url = url;
        }
        if self.headed {
            config.headless = false;
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.grep.is_some() {
            config.grep = self.grep;
        }
        if self.archived {
            config.include_archived = true;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    match Cli::parse().command {
        Command::E2e(args) => run_e2e(args).await,
        Command::List(args) => {
            list(&args);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_e2e(args: E2eArgs) -> anyhow::Result<ExitCode> {
    let config = args.into_config()?;
    tracing::info!(
        base_url = %config.base_url,
        projects = config.projects.len(),
        "Starting e2e run"
    );

    let summary = Runner::new(config)?
        .with_configured_reporters()
        .run(scenarios::all())
        .await
        .context("E2E run failed")?;

    Ok(if summary.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn list(args: &ListArgs) {
    for scenario in scenarios::all() {
        if !args.archived && scenario.has_tag(scenarios::ARCHIVE_TAG) {
            continue;
        }
        println!("{}  [{}]", scenario.name(), scenario.tags().join(", "));
    }
}
