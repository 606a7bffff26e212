use std::path::Path;

use tracing::{debug, info, warn};

use crate::domain::{Precedence, RepositoryReport, RepositoryState};
use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;

/// Which dimensions of staleness to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyOptions {
    pub check_local_changes: bool,
    pub check_untracked: bool,
    pub check_remote: bool,
    pub precedence: Precedence,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            check_local_changes: true,
            check_untracked: true,
            check_remote: true,
            precedence: Precedence::default(),
        }
    }
}

/// Classifies a single directory.
///
/// Fails only when `path` cannot be read. Query failures against an existing
/// repository come back as an `Unknown` report carrying the error.
pub async fn classify(
    vcs: &dyn VersionControlService,
    path: &Path,
    options: &ClassifyOptions,
) -> AppResult<RepositoryReport> {
    debug!(path = %path.display(), "checking directory");

    tokio::fs::read_dir(path)
        .await
        .map_err(|err| AppError::access(path, err))?;

    let report = match inspect(vcs, path, options).await {
        Ok(report) => report,
        Err(err) => {
            warn!(path = %path.display(), "{err}");
            RepositoryReport::unknown(path, err.to_string())
        }
    };

    if report.is_stale() {
        info!(path = %path.display(), classification = %report.classification, "directory is stale");
    }
    Ok(report)
}

async fn inspect(
    vcs: &dyn VersionControlService,
    path: &Path,
    options: &ClassifyOptions,
) -> AppResult<RepositoryReport> {
    if !vcs.is_working_directory(path).await? {
        debug!(path = %path.display(), "not a git repository");
        return Ok(RepositoryReport::not_a_repository(path));
    }

    let mut state = RepositoryState::default();

    if options.check_local_changes {
        state.modified_files = vcs.list_modified_files(path).await?;
    }
    if options.check_untracked {
        state.untracked_files = vcs.list_untracked_files(path).await?;
    }
    if options.check_remote {
        state.remote_checked = true;
        state.branch = vcs.current_branch(path).await?;
        // A detached HEAD has no upstream to compare against.
        if let Some(branch) = state.branch.as_deref() {
            if let Some(upstream) = vcs.current_branch_upstream(path, branch).await? {
                state.divergence = Some(vcs.ahead_behind_counts(path, &upstream).await?);
                state.upstream = Some(upstream.name);
            }
        }
    }

    Ok(RepositoryReport::from_state(path, state, options.precedence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Classification, Divergence};
    use crate::services::fakes::{FakeRepo, FakeVersionControl};

    fn local_only() -> ClassifyOptions {
        ClassifyOptions {
            check_remote: false,
            ..ClassifyOptions::default()
        }
    }

    #[tokio::test]
    async fn plain_directory_stops_after_detection() {
        let dir = tempfile::tempdir().unwrap();
        let vcs = FakeVersionControl::new();

        let report = classify(&vcs, dir.path(), &ClassifyOptions::default())
            .await
            .unwrap();

        assert!(!report.is_repository);
        assert_eq!(report.classification, Classification::NotARepository);
        assert_eq!(vcs.calls(), 1);
    }

    #[tokio::test]
    async fn synced_repository_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let vcs = FakeVersionControl::new().with_repo(dir.path(), FakeRepo::tracking("origin/main"));

        let report = classify(&vcs, dir.path(), &ClassifyOptions::default())
            .await
            .unwrap();

        assert_eq!(report.classification, Classification::Clean);
        assert_eq!(report.current_branch_has_upstream, Some(true));
        assert_eq!(report.divergence, Some(Divergence::new(0, 0)));
        assert_eq!(report.branch.as_deref(), Some("main"));
    }

    #[tokio::test]
    async fn local_changes_win_over_untracked_files() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FakeRepo {
            modified: vec!["src/main.rs".to_string(), "Cargo.toml".to_string()],
            untracked: vec!["notes.txt".to_string()],
            ..FakeRepo::tracking("origin/main")
        };
        let vcs = FakeVersionControl::new().with_repo(dir.path(), repo);

        let report = classify(&vcs, dir.path(), &local_only()).await.unwrap();

        assert_eq!(report.local_change_count, 2);
        assert_eq!(report.untracked_count, 1);
        assert_eq!(report.classification, Classification::LocalChanges);
    }

    #[tokio::test]
    async fn ahead_and_behind_is_diverged() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FakeRepo {
            divergence: Divergence::new(3, 2),
            ..FakeRepo::tracking("origin/main")
        };
        let vcs = FakeVersionControl::new().with_repo(dir.path(), repo);

        let report = classify(&vcs, dir.path(), &ClassifyOptions::default())
            .await
            .unwrap();

        assert_eq!(report.classification, Classification::Diverged);
        assert_eq!(report.ahead_count(), Some(3));
        assert_eq!(report.behind_count(), Some(2));
    }

    #[tokio::test]
    async fn branch_without_upstream_leaves_counts_unevaluated() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FakeRepo {
            branch: Some("feature".to_string()),
            untracked: vec!["scratch.md".to_string()],
            ..FakeRepo::default()
        };
        let vcs = FakeVersionControl::new().with_repo(dir.path(), repo);

        let report = classify(&vcs, dir.path(), &ClassifyOptions::default())
            .await
            .unwrap();

        assert_eq!(report.current_branch_has_upstream, Some(false));
        assert_eq!(report.ahead_count(), None);
        assert_eq!(report.behind_count(), None);
        assert_eq!(report.classification, Classification::Untracked);
    }

    #[tokio::test]
    async fn detached_head_skips_the_upstream_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FakeRepo {
            branch: None,
            upstream: Some("origin/main".to_string()),
            ..FakeRepo::default()
        };
        let vcs = FakeVersionControl::new().with_repo(dir.path(), repo);

        let report = classify(&vcs, dir.path(), &ClassifyOptions::default())
            .await
            .unwrap();

        assert_eq!(report.current_branch_has_upstream, Some(false));
        assert_eq!(report.divergence, None);
        assert_eq!(report.classification, Classification::Clean);
        // Detection, modified, untracked and branch only.
        assert_eq!(vcs.calls(), 4);
    }

    #[tokio::test]
    async fn disabled_remote_check_never_populates_counts() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FakeRepo {
            divergence: Divergence::new(5, 0),
            ..FakeRepo::tracking("origin/main")
        };
        let vcs = FakeVersionControl::new().with_repo(dir.path(), repo);

        let report = classify(&vcs, dir.path(), &local_only()).await.unwrap();

        assert_eq!(report.divergence, None);
        assert_eq!(report.current_branch_has_upstream, None);
        assert_eq!(report.classification, Classification::Clean);
    }

    #[tokio::test]
    async fn local_first_precedence_reports_local_changes() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FakeRepo {
            modified: vec!["lib.rs".to_string()],
            divergence: Divergence::new(1, 1),
            ..FakeRepo::tracking("origin/main")
        };
        let vcs = FakeVersionControl::new().with_repo(dir.path(), repo);
        let options = ClassifyOptions {
            precedence: Precedence::LocalFirst,
            ..ClassifyOptions::default()
        };

        let report = classify(&vcs, dir.path(), &options).await.unwrap();

        assert_eq!(report.classification, Classification::LocalChanges);
        assert_eq!(report.divergence, Some(Divergence::new(1, 1)));
    }

    #[tokio::test]
    async fn failing_query_yields_unknown_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FakeRepo {
            broken: true,
            ..FakeRepo::default()
        };
        let vcs = FakeVersionControl::new().with_repo(dir.path(), repo);

        let report = classify(&vcs, dir.path(), &ClassifyOptions::default())
            .await
            .unwrap();

        assert_eq!(report.classification, Classification::Unknown);
        assert!(report.error.unwrap().contains("index file corrupt"));
    }

    #[tokio::test]
    async fn missing_path_is_an_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let vcs = FakeVersionControl::new();

        let err = classify(&vcs, &missing, &ClassifyOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Access { .. }));
        assert_eq!(vcs.calls(), 0);
    }

    #[tokio::test]
    async fn repeated_classification_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FakeRepo {
            modified: vec!["a".to_string()],
            untracked: vec!["b".to_string()],
            divergence: Divergence::new(0, 4),
            ..FakeRepo::tracking("origin/main")
        };
        let vcs = FakeVersionControl::new().with_repo(dir.path(), repo);
        let options = ClassifyOptions::default();

        let first = classify(&vcs, dir.path(), &options).await.unwrap();
        let second = classify(&vcs, dir.path(), &options).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.classification, Classification::Behind);
    }
}
