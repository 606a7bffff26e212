use std::path::Path;

use async_trait::async_trait;

use crate::domain::{Divergence, Upstream};
use crate::error::AppResult;

/// Read-only queries against a working directory and its local metadata.
///
/// Implementations must never touch the network: remote state is whatever the
/// remote-tracking refs recorded at the last fetch.
#[async_trait]
pub trait VersionControlService: Send + Sync {
    /// Whether `path` is the root of a working directory.
    async fn is_working_directory(&self, path: &Path) -> AppResult<bool>;
    /// Tracked files with staged or unstaged changes.
    async fn list_modified_files(&self, path: &Path) -> AppResult<Vec<String>>;
    async fn list_untracked_files(&self, path: &Path) -> AppResult<Vec<String>>;
    /// Checked-out branch, `None` on a detached HEAD.
    async fn current_branch(&self, path: &Path) -> AppResult<Option<String>>;
    /// Upstream configured for `branch`, if its remote-tracking ref exists.
    async fn current_branch_upstream(
        &self,
        path: &Path,
        branch: &str,
    ) -> AppResult<Option<Upstream>>;
    async fn ahead_behind_counts(&self, path: &Path, upstream: &Upstream)
    -> AppResult<Divergence>;
}
