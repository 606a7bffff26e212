use std::fmt;

use serde::Serialize;

/// Single label surfaced for a scanned directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Clean,
    LocalChanges,
    Untracked,
    Ahead,
    Behind,
    Diverged,
    NotARepository,
    Unknown,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Clean => "clean",
            Classification::LocalChanges => "local changes",
            Classification::Untracked => "untracked",
            Classification::Ahead => "ahead",
            Classification::Behind => "behind",
            Classification::Diverged => "diverged",
            Classification::NotARepository => "not a repository",
            Classification::Unknown => "unknown",
        }
    }

    /// A repository that needs attention. Directories without version control
    /// metadata are never stale.
    pub fn is_stale(&self) -> bool {
        !matches!(
            self,
            Classification::Clean | Classification::NotARepository
        )
    }

    /// Picks the label for a repository whose checks have run.
    ///
    /// Dimensions that were not evaluated count as zero. Local changes and
    /// untracked files may co-occur with any remote state; `precedence`
    /// decides which one wins.
    pub fn from_state(
        local_changes: usize,
        untracked: usize,
        divergence: Option<Divergence>,
        precedence: Precedence,
    ) -> Self {
        let remote = divergence.and_then(|d| d.classification());
        let local = if local_changes > 0 {
            Some(Classification::LocalChanges)
        } else if untracked > 0 {
            Some(Classification::Untracked)
        } else {
            None
        };

        let picked = match precedence {
            Precedence::RemoteFirst => remote.or(local),
            Precedence::LocalFirst => local.or(remote),
        };
        picked.unwrap_or(Classification::Clean)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commit counts of the current branch relative to its upstream, as of the
/// last fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Divergence {
    pub ahead: u32,
    pub behind: u32,
}

impl Divergence {
    pub fn new(ahead: u32, behind: u32) -> Self {
        Self { ahead, behind }
    }

    pub fn classification(&self) -> Option<Classification> {
        match (self.ahead > 0, self.behind > 0) {
            (true, true) => Some(Classification::Diverged),
            (false, true) => Some(Classification::Behind),
            (true, false) => Some(Classification::Ahead),
            (false, false) => None,
        }
    }
}

/// Which family of conditions wins when several hold at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Precedence {
    /// Diverged > Behind > Ahead > LocalChanges > Untracked.
    #[default]
    RemoteFirst,
    /// LocalChanges > Untracked > Diverged > Behind > Ahead.
    LocalFirst,
}
