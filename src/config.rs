use std::env;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::cmd::scan::ScanArgs;
use crate::error::{AppError, AppResult};
use crate::workflow::classify::ClassifyOptions;

pub const MIN_DEPTH: usize = 1;
pub const MAX_DEPTH: usize = 99;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scan: ScanConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub root: PathBuf,
    pub depth: usize,
    pub jobs: usize,
    pub timeout: Duration,
    pub classify: ClassifyOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub list_files: bool,
    pub colorize: bool,
    pub show_status: bool,
    pub indent: String,
    pub format: OutputFormat,
    pub show_all: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            list_files: false,
            colorize: false,
            show_status: true,
            indent: "\t".to_string(),
            format: OutputFormat::Text,
            show_all: false,
        }
    }
}

impl AppConfig {
    pub fn from_args(args: &ScanArgs) -> AppResult<Self> {
        let classify = ClassifyOptions {
            check_local_changes: !args.no_local,
            check_untracked: !args.no_untracked,
            check_remote: !args.no_remote,
            precedence: args.precedence,
        };
        let scan = ScanConfig::new(
            args.root.clone(),
            args.depth,
            args.jobs,
            args.timeout,
            classify,
        )?;

        let output = OutputConfig {
            list_files: args.list_files,
            colorize: args.color && env::var_os("NO_COLOR").is_none(),
            show_status: !args.no_status,
            indent: args.indent.clone(),
            format: args.format,
            show_all: args.all,
        };

        Ok(Self { scan, output })
    }
}

impl ScanConfig {
    pub fn new(
        root: PathBuf,
        depth: i64,
        jobs: Option<usize>,
        timeout_secs: u64,
        classify: ClassifyOptions,
    ) -> AppResult<Self> {
        if !root.is_dir() {
            return Err(AppError::Configuration(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let jobs = jobs.unwrap_or_else(default_jobs);
        if jobs == 0 {
            return Err(AppError::Configuration(
                "jobs must be at least 1".to_string(),
            ));
        }
        if timeout_secs == 0 {
            return Err(AppError::Configuration(
                "timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(Self {
            root,
            depth: clamp_depth(depth),
            jobs,
            timeout: Duration::from_secs(timeout_secs),
            classify,
        })
    }
}

pub fn clamp_depth(depth: i64) -> usize {
    let clamped = depth.clamp(MIN_DEPTH as i64, MAX_DEPTH as i64);
    if clamped != depth {
        warn!("depth {depth} is outside of {MIN_DEPTH}-{MAX_DEPTH}, using {clamped}");
    }
    clamped as usize
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(4)
}
