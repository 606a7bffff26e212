use std::path::Path;

use colored::Colorize;

use crate::config::OutputConfig;
use crate::domain::{Classification, RepositoryReport};
use crate::error::AppError;
use crate::workflow::scan::ScanEntry;

/// Applies the output colors when colorizing is on.
struct Palette {
    enabled: bool,
}

impl Palette {
    fn repo(&self, text: &str) -> String {
        self.paint(text, |t| t.green().bold().to_string())
    }

    fn status(&self, text: &str) -> String {
        self.paint(text, |t| t.bright_cyan().bold().to_string())
    }

    fn modified(&self, text: &str) -> String {
        self.paint(text, |t| t.bright_red().dimmed().to_string())
    }

    fn untracked(&self, text: &str) -> String {
        self.paint(text, |t| t.bright_yellow().dimmed().to_string())
    }

    fn ahead(&self, text: &str) -> String {
        self.paint(text, |t| t.bright_green().to_string())
    }

    fn behind(&self, text: &str) -> String {
        self.paint(text, |t| t.bright_red().to_string())
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> String) -> String {
        if self.enabled {
            style(text)
        } else {
            text.to_string()
        }
    }
}

pub fn render(entries: &[ScanEntry], config: &OutputConfig) -> String {
    let palette = Palette {
        enabled: config.colorize,
    };
    let mut lines = Vec::new();

    for entry in entries {
        match entry {
            ScanEntry::Report(report) => {
                if !config.show_all && !report.is_stale() {
                    continue;
                }
                render_report(&mut lines, report, config, &palette);
            }
            ScanEntry::Failed { path, error } => {
                render_failure(&mut lines, path, error, &palette);
            }
        }
        lines.push(String::new());
    }

    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn render_report(
    lines: &mut Vec<String>,
    report: &RepositoryReport,
    config: &OutputConfig,
    palette: &Palette,
) {
    let mut header = format!(
        "{} [{}",
        palette.repo(&report.path.display().to_string()),
        report.classification
    );
    if let (Some(ahead), Some(behind)) = (report.ahead_count(), report.behind_count()) {
        header.push_str(&format!(
            " {} {}",
            palette.ahead(&format!("+{ahead}")),
            palette.behind(&format!("-{behind}"))
        ));
    }
    header.push(']');
    lines.push(header);

    if !config.show_status {
        return;
    }

    for status in status_lines(report) {
        lines.push(format!("{}{}", config.indent, palette.status(&status)));
    }

    if config.list_files {
        render_files(lines, report, config, palette);
    }
}

fn render_failure(lines: &mut Vec<String>, path: &Path, error: &AppError, palette: &Palette) {
    lines.push(format!(
        "{} [error] {}",
        palette.repo(&path.display().to_string()),
        palette.status(&error.to_string())
    ));
}

fn status_lines(report: &RepositoryReport) -> Vec<String> {
    let mut lines = Vec::new();

    if report.classification == Classification::Unknown {
        if let Some(error) = &report.error {
            lines.push(error.clone());
        }
        return lines;
    }
    if !report.is_repository {
        return lines;
    }

    let branch = report.branch.as_deref().unwrap_or("HEAD");
    match (&report.upstream, report.divergence) {
        (Some(upstream), Some(d)) if d.ahead > 0 && d.behind > 0 => lines.push(format!(
            "'{branch}' and '{upstream}' have diverged: {} ahead, {} behind.",
            d.ahead, d.behind
        )),
        (Some(upstream), Some(d)) if d.ahead > 0 => lines.push(format!(
            "'{branch}' is ahead of '{upstream}' by {}.",
            commits(d.ahead)
        )),
        (Some(upstream), Some(d)) if d.behind > 0 => lines.push(format!(
            "'{branch}' is behind '{upstream}' by {}.",
            commits(d.behind)
        )),
        (Some(upstream), Some(_)) => {
            lines.push(format!("'{branch}' is up to date with '{upstream}'."))
        }
        _ if report.current_branch_has_upstream == Some(false) => {
            if report.branch.is_some() {
                lines.push(format!("'{branch}' has no upstream branch."));
            } else {
                lines.push("HEAD is detached.".to_string());
            }
        }
        _ => {}
    }

    if report.local_change_count > 0 || report.untracked_count > 0 {
        lines.push(format!(
            "{} modified, {} untracked.",
            report.local_change_count, report.untracked_count
        ));
    }

    lines
}

fn render_files(
    lines: &mut Vec<String>,
    report: &RepositoryReport,
    config: &OutputConfig,
    palette: &Palette,
) {
    let nested = config.indent.repeat(2);

    if !report.modified_files.is_empty() {
        lines.push(format!("{}Modified:", config.indent));
        for file in &report.modified_files {
            lines.push(format!("{nested}{}", palette.modified(file)));
        }
    }

    if !report.untracked_files.is_empty() {
        if !report.modified_files.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("{}Untracked:", config.indent));
        for file in &report.untracked_files {
            lines.push(format!("{nested}{}", palette.untracked(file)));
        }
    }
}

fn commits(count: u32) -> String {
    if count == 1 {
        "1 commit".to_string()
    } else {
        format!("{count} commits")
    }
}
