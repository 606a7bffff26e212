mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod output;
mod services;
mod telemetry;
mod workflow;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, Parser};
use tracing::info;

use crate::cmd::scan::{self, ScanArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::git::GitCli;
use crate::workflow::scan::ScanSummary;

#[derive(Parser)]
#[command(
    name = "stale",
    author,
    version,
    about = "Report git repositories that are out of sync or have local changes"
)]
struct Cli {
    /// Increase log verbosity (-v warn, -vv info, -vvv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    scan: ScanArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.verbose);

    match run(cli).await {
        Ok(summary) if summary.is_clean() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> AppResult<ScanSummary> {
    let config = AppConfig::from_args(&cli.scan)?;
    colored::control::set_override(config.output.colorize);

    let git = Arc::new(GitCli::new());
    let context = AppContext::new(config, git);

    let summary = scan::run(&context).await?;
    info!(
        stale = summary.stale().count(),
        failed = summary.failures().count(),
        "scan finished"
    );
    Ok(summary)
}
