use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Divergence, Upstream};
use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;

#[derive(Debug, Clone, Default)]
pub struct FakeRepo {
    pub modified: Vec<String>,
    pub untracked: Vec<String>,
    pub branch: Option<String>,
    pub upstream: Option<String>,
    pub divergence: Divergence,
    /// Every query after detection fails.
    pub broken: bool,
    /// Detection sleeps this long first.
    pub delay: Option<Duration>,
    /// Detection panics.
    pub panics: bool,
}

impl FakeRepo {
    pub fn tracking(upstream: &str) -> Self {
        Self {
            branch: Some("main".to_string()),
            upstream: Some(upstream.to_string()),
            ..Self::default()
        }
    }
}

/// In-memory working directories keyed by path, counting every query.
#[derive(Default)]
pub struct FakeVersionControl {
    repos: HashMap<PathBuf, FakeRepo>,
    calls: AtomicUsize,
}

impl FakeVersionControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(mut self, path: impl Into<PathBuf>, repo: FakeRepo) -> Self {
        self.repos.insert(path.into(), repo);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn repo(&self, path: &Path) -> AppResult<&FakeRepo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let repo = self.repos.get(path).ok_or_else(|| {
            AppError::VersionControl(format!("not a git repository: {}", path.display()))
        })?;
        if repo.broken {
            return Err(AppError::VersionControl("index file corrupt".to_string()));
        }
        Ok(repo)
    }
}

#[async_trait]
impl VersionControlService for FakeVersionControl {
    async fn is_working_directory(&self, path: &Path) -> AppResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some(repo) = self.repos.get(path) else {
            return Ok(false);
        };
        if repo.panics {
            panic!("detection crashed for {}", path.display());
        }
        if let Some(delay) = repo.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(true)
    }

    async fn list_modified_files(&self, path: &Path) -> AppResult<Vec<String>> {
        Ok(self.repo(path)?.modified.clone())
    }

    async fn list_untracked_files(&self, path: &Path) -> AppResult<Vec<String>> {
        Ok(self.repo(path)?.untracked.clone())
    }

    async fn current_branch(&self, path: &Path) -> AppResult<Option<String>> {
        Ok(self.repo(path)?.branch.clone())
    }

    async fn current_branch_upstream(
        &self,
        path: &Path,
        branch: &str,
    ) -> AppResult<Option<Upstream>> {
        let repo = self.repo(path)?;
        if repo.branch.as_deref() != Some(branch) {
            return Err(AppError::VersionControl(format!("unknown branch {branch}")));
        }
        Ok(repo.upstream.as_ref().map(|name| Upstream {
            name: name.clone(),
            refname: format!("refs/remotes/{name}"),
        }))
    }

    async fn ahead_behind_counts(
        &self,
        path: &Path,
        upstream: &Upstream,
    ) -> AppResult<Divergence> {
        let repo = self.repo(path)?;
        if repo.upstream.as_deref() != Some(upstream.name.as_str()) {
            return Err(AppError::VersionControl(format!(
                "unknown upstream {}",
                upstream.refname
            )));
        }
        Ok(repo.divergence)
    }
}
