use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::context::AppContext;
use crate::domain::RepositoryReport;
use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;
use crate::workflow::classify::{ClassifyOptions, classify};

#[derive(Debug)]
pub enum ScanEntry {
    Report(RepositoryReport),
    Failed { path: PathBuf, error: AppError },
}

impl ScanEntry {
    pub fn path(&self) -> &Path {
        match self {
            ScanEntry::Report(report) => &report.path,
            ScanEntry::Failed { path, .. } => path,
        }
    }

    pub fn needs_attention(&self) -> bool {
        match self {
            ScanEntry::Report(report) => report.is_stale(),
            ScanEntry::Failed { .. } => true,
        }
    }
}

/// Entries sorted by path.
#[derive(Debug)]
pub struct ScanSummary {
    pub entries: Vec<ScanEntry>,
}

impl ScanSummary {
    fn new(mut entries: Vec<ScanEntry>) -> Self {
        entries.sort_by(|a, b| a.path().cmp(b.path()));
        Self { entries }
    }

    pub fn stale(&self) -> impl Iterator<Item = &RepositoryReport> {
        self.entries.iter().filter_map(|entry| match entry {
            ScanEntry::Report(report) if report.is_stale() => Some(report),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &AppError)> {
        self.entries.iter().filter_map(|entry| match entry {
            ScanEntry::Failed { path, error } => Some((path.as_path(), error)),
            ScanEntry::Report(_) => None,
        })
    }

    pub fn is_clean(&self) -> bool {
        !self.entries.iter().any(ScanEntry::needs_attention)
    }
}

/// Directories to classify, plus the ones the walk could not read.
#[derive(Debug, Default)]
pub struct Discovery {
    pub candidates: Vec<PathBuf>,
    pub failures: Vec<ScanEntry>,
}

/// Classifies the root when it is a repository, otherwise every directory
/// below it down to the configured depth.
pub async fn scan(ctx: &AppContext) -> AppResult<ScanSummary> {
    let config = &ctx.config.scan;
    let vcs = Arc::clone(&ctx.version_control);
    info!(root = %config.root.display(), depth = config.depth, "checking root directory");

    let root = classify_entry(
        vcs.as_ref(),
        config.root.clone(),
        &config.classify,
        config.timeout,
    )
    .await;
    match root {
        ScanEntry::Report(report) if report.is_repository => {
            return Ok(ScanSummary::new(vec![ScanEntry::Report(report)]));
        }
        ScanEntry::Failed { error, .. } => return Err(error),
        ScanEntry::Report(_) => {}
    }

    let Discovery {
        candidates,
        failures: mut entries,
    } = discover(&config.root, config.depth);

    let semaphore = Arc::new(Semaphore::new(config.jobs));
    let mut tasks = JoinSet::new();
    let mut in_flight = HashMap::new();
    for path in candidates {
        let vcs = Arc::clone(&vcs);
        let semaphore = Arc::clone(&semaphore);
        let options = config.classify;
        let timeout = config.timeout;
        let task_path = path.clone();
        let handle = tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            classify_entry(vcs.as_ref(), task_path, &options, timeout).await
        });
        in_flight.insert(handle.id(), path);
    }

    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((id, entry)) => {
                in_flight.remove(&id);
                entries.push(entry);
            }
            Err(err) => {
                let Some(path) = in_flight.remove(&err.id()) else {
                    error!("classification task failed: {err}");
                    continue;
                };
                error!(path = %path.display(), "classification task failed: {err}");
                entries.push(ScanEntry::Failed {
                    path,
                    error: AppError::Task(err.to_string()),
                });
            }
        }
    }

    Ok(ScanSummary::new(entries))
}

async fn classify_entry(
    vcs: &dyn VersionControlService,
    path: PathBuf,
    options: &ClassifyOptions,
    timeout: Duration,
) -> ScanEntry {
    match tokio::time::timeout(timeout, classify(vcs, &path, options)).await {
        Ok(Ok(report)) => ScanEntry::Report(report),
        Ok(Err(error)) => {
            error!(path = %path.display(), "{error}");
            ScanEntry::Failed { path, error }
        }
        Err(_) => {
            warn!(path = %path.display(), "timed out after {timeout:?}");
            let message = format!("timed out after {}s", timeout.as_secs_f32());
            ScanEntry::Report(RepositoryReport::unknown(&path, message))
        }
    }
}

/// Walks `root` down to `depth` levels. `.git` directories are skipped and the
/// walk does not descend below a directory holding git metadata. Symlinks to
/// directories are candidates but are never walked through.
pub fn discover(root: &Path, depth: usize) -> Discovery {
    let mut discovery = Discovery::default();
    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(depth)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                warn!(path = %path.display(), "{err}");
                // An unreadable directory was already yielded and will fail
                // its own classification.
                if discovery.candidates.contains(&path) {
                    continue;
                }
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("filesystem loop"));
                discovery.failures.push(ScanEntry::Failed {
                    error: AppError::access(&path, source),
                    path,
                });
                continue;
            }
        };

        let is_dir = entry.file_type().is_dir()
            || (entry.path_is_symlink() && entry.path().is_dir());
        if !is_dir {
            continue;
        }
        if entry.file_name() == ".git" {
            walker.skip_current_dir();
            continue;
        }

        let is_repository = entry.path().join(".git").exists();
        discovery.candidates.push(entry.into_path());
        if is_repository {
            walker.skip_current_dir();
        }
    }

    discovery
}
