use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;

use crate::config::{DEFAULT_TIMEOUT_SECS, OutputFormat};
use crate::context::AppContext;
use crate::domain::Precedence;
use crate::error::AppResult;
use crate::output;
use crate::workflow::scan::{ScanSummary, scan};

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Directory whose subdirectories are checked.
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Depth of the tree to check, 1-99.
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    pub depth: i64,

    /// List modified and untracked files.
    #[arg(short = 'l', long = "list")]
    pub list_files: bool,

    /// Colorize output.
    #[arg(short = 'c', long = "color")]
    pub color: bool,

    /// Don't show status lines or file lists.
    #[arg(short = 'S', long)]
    pub no_status: bool,

    /// String inserted per level of indentation.
    #[arg(short, long, default_value = "\t", hide_default_value = true)]
    pub indent: String,

    /// Skip the check for modified tracked files.
    #[arg(long)]
    pub no_local: bool,

    /// Skip the check for untracked files.
    #[arg(long)]
    pub no_untracked: bool,

    /// Skip the ahead/behind comparison with the upstream branch.
    #[arg(long)]
    pub no_remote: bool,

    /// Which conditions win when several hold at once.
    #[arg(long, value_enum, default_value_t = Precedence::RemoteFirst)]
    pub precedence: Precedence,

    /// Directories classified concurrently.
    #[arg(short, long, env = "STALE_JOBS")]
    pub jobs: Option<usize>,

    /// Seconds allowed per directory before it is reported as unknown.
    #[arg(long, env = "STALE_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also show clean repositories and plain directories.
    #[arg(short, long)]
    pub all: bool,
}

pub async fn run(ctx: &AppContext) -> AppResult<ScanSummary> {
    let summary = scan(ctx).await?;
    let rendered = output::render(&summary, &ctx.config.output)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;

    Ok(summary)
}
