use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::domain::classification::{Classification, Divergence, Precedence};

/// Upstream of a branch: short name for display and the full ref used in
/// comparisons, so a same-named tag can't shadow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    pub name: String,
    pub refname: String,
}

/// Writes a path as a string, replacing bytes that are not valid UTF-8.
pub fn serialize_lossy_path<P, S>(path: &P, serializer: S) -> Result<S::Ok, S::Error>
where
    P: AsRef<Path>,
    S: Serializer,
{
    serializer.serialize_str(&path.as_ref().to_string_lossy())
}

/// Everything the checks learned about a working directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryState {
    pub branch: Option<String>,
    pub remote_checked: bool,
    pub upstream: Option<String>,
    pub modified_files: Vec<String>,
    pub untracked_files: Vec<String>,
    pub divergence: Option<Divergence>,
}

/// Outcome of classifying one directory. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryReport {
    #[serde(serialize_with = "serialize_lossy_path")]
    pub path: PathBuf,
    pub is_repository: bool,
    pub branch: Option<String>,
    /// `None` when the remote check was disabled.
    pub current_branch_has_upstream: Option<bool>,
    pub upstream: Option<String>,
    pub local_change_count: usize,
    pub untracked_count: usize,
    pub modified_files: Vec<String>,
    pub untracked_files: Vec<String>,
    /// `None` means ahead/behind were not evaluated.
    pub divergence: Option<Divergence>,
    pub classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RepositoryReport {
    pub fn not_a_repository(path: &Path) -> Self {
        Self::empty(path, false, Classification::NotARepository, None)
    }

    pub fn unknown(path: &Path, error: impl Into<String>) -> Self {
        Self::empty(path, true, Classification::Unknown, Some(error.into()))
    }

    pub fn from_state(path: &Path, state: RepositoryState, precedence: Precedence) -> Self {
        let classification = Classification::from_state(
            state.modified_files.len(),
            state.untracked_files.len(),
            state.divergence,
            precedence,
        );

        Self {
            path: path.to_path_buf(),
            is_repository: true,
            branch: state.branch,
            current_branch_has_upstream: state
                .remote_checked
                .then_some(state.upstream.is_some()),
            upstream: state.upstream,
            local_change_count: state.modified_files.len(),
            untracked_count: state.untracked_files.len(),
            modified_files: state.modified_files,
            untracked_files: state.untracked_files,
            divergence: state.divergence,
            classification,
            error: None,
        }
    }

    fn empty(
        path: &Path,
        is_repository: bool,
        classification: Classification,
        error: Option<String>,
    ) -> Self {
        Self {
            path: path.to_path_buf(),
            is_repository,
            branch: None,
            current_branch_has_upstream: None,
            upstream: None,
            local_change_count: 0,
            untracked_count: 0,
            modified_files: Vec::new(),
            untracked_files: Vec::new(),
            divergence: None,
            classification,
            error,
        }
    }

    pub fn ahead_count(&self) -> Option<u32> {
        self.divergence.map(|d| d.ahead)
    }

    pub fn behind_count(&self) -> Option<u32> {
        self.divergence.map(|d| d.behind)
    }

    pub fn is_stale(&self) -> bool {
        self.classification.is_stale()
    }
}
