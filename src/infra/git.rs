use std::ffi::OsString;
use std::path::Path;
use std::process::{Output, Stdio};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::{Divergence, Upstream};
use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;

/// `VersionControlService` backed by the `git` binary.
pub struct GitCli {
    program: OsString,
}

impl GitCli {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn output(&self, path: &Path, args: &[&str]) -> AppResult<Output> {
        debug!(path = %path.display(), "git {}", args.join(" "));
        Command::new(&self.program)
            .args(args)
            .current_dir(path)
            // Status queries must not rewrite the index or prompt for credentials.
            .env("GIT_OPTIONAL_LOCKS", "0")
            .env("GIT_TERMINAL_PROMPT", "0")
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| {
                AppError::VersionControl(format!(
                    "failed to run {}: {err}",
                    self.program.to_string_lossy()
                ))
            })
    }

    async fn run(&self, path: &Path, args: &[&str]) -> AppResult<String> {
        let output = self.output(path, args).await?;
        if !output.status.success() {
            return Err(command_failed(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VersionControlService for GitCli {
    async fn is_working_directory(&self, path: &Path) -> AppResult<bool> {
        // `.git` is a directory for regular clones and a file for worktrees
        // and submodules. Without it git would search parent directories.
        if !path.join(".git").exists() {
            return Ok(false);
        }
        let stdout = self
            .run(path, &["rev-parse", "--is-inside-work-tree"])
            .await?;
        Ok(stdout.trim() == "true")
    }

    async fn list_modified_files(&self, path: &Path) -> AppResult<Vec<String>> {
        let stdout = self
            .run(
                path,
                &["status", "--porcelain=v1", "-z", "--untracked-files=no"],
            )
            .await?;
        Ok(parse_porcelain(&stdout))
    }

    async fn list_untracked_files(&self, path: &Path) -> AppResult<Vec<String>> {
        let stdout = self
            .run(path, &["ls-files", "--others", "--exclude-standard", "-z"])
            .await?;
        Ok(split_nul(&stdout))
    }

    async fn current_branch(&self, path: &Path) -> AppResult<Option<String>> {
        let args = ["symbolic-ref", "--quiet", "--short", "HEAD"];
        let output = self.output(path, &args).await?;
        if output.status.success() {
            let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
            return Ok((!branch.is_empty()).then_some(branch));
        }
        // Exit code 1 with --quiet means HEAD is detached.
        if output.status.code() == Some(1) {
            return Ok(None);
        }
        Err(command_failed(&args, &output))
    }

    async fn current_branch_upstream(
        &self,
        path: &Path,
        branch: &str,
    ) -> AppResult<Option<Upstream>> {
        let ref_name = format!("refs/heads/{branch}");
        let stdout = self
            .run(
                path,
                &[
                    "for-each-ref",
                    "--format=%(upstream:short)%00%(upstream)%00%(upstream:track)",
                    &ref_name,
                ],
            )
            .await?;

        let mut fields = stdout.trim_end_matches('\n').split('\0');
        let name = fields.next().unwrap_or_default();
        let refname = fields.next().unwrap_or_default();
        let track = fields.next().unwrap_or_default();
        if name.is_empty() || refname.is_empty() {
            return Ok(None);
        }
        if track == "[gone]" {
            debug!(path = %path.display(), upstream = name, "upstream ref no longer exists");
            return Ok(None);
        }
        Ok(Some(Upstream {
            name: name.to_string(),
            refname: refname.to_string(),
        }))
    }

    async fn ahead_behind_counts(
        &self,
        path: &Path,
        upstream: &Upstream,
    ) -> AppResult<Divergence> {
        let range = format!("HEAD...{}", upstream.refname);
        let stdout = self
            .run(path, &["rev-list", "--left-right", "--count", &range])
            .await?;
        parse_left_right(&stdout)
    }
}

fn command_failed(args: &[&str], output: &Output) -> AppError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    AppError::VersionControl(format!("git {} failed: {}", args.join(" "), stderr.trim()))
}

fn split_nul(stdout: &str) -> Vec<String> {
    stdout
        .split('\0')
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Paths from `git status --porcelain=v1 -z`. Renames and copies carry their
/// source path as an extra field, which is skipped.
fn parse_porcelain(stdout: &str) -> Vec<String> {
    let mut files = Vec::new();
    let mut fields = stdout.split('\0').filter(|field| !field.is_empty());
    while let Some(entry) = fields.next() {
        if entry.len() < 4 {
            continue;
        }
        let (status, file) = entry.split_at(3);
        files.push(file.to_string());
        if status.contains('R') || status.contains('C') {
            fields.next();
        }
    }
    files
}

fn parse_left_right(stdout: &str) -> AppResult<Divergence> {
    let mut counts = stdout.split_whitespace().map(str::parse::<u32>);
    match (counts.next(), counts.next()) {
        (Some(Ok(ahead)), Some(Ok(behind))) => Ok(Divergence::new(ahead, behind)),
        _ => Err(AppError::VersionControl(format!(
            "unexpected rev-list output: {:?}",
            stdout.trim()
        ))),
    }
}
