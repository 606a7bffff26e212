use std::path::Path;

use serde::Serialize;

use crate::config::OutputConfig;
use crate::domain::{RepositoryReport, serialize_lossy_path};
use crate::error::{AppError, AppResult};
use crate::workflow::scan::ScanEntry;

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum JsonEntry<'a> {
    Report(&'a RepositoryReport),
    Failed {
        #[serde(serialize_with = "serialize_lossy_path")]
        path: &'a Path,
        error: String,
    },
}

pub fn render(entries: &[ScanEntry], config: &OutputConfig) -> AppResult<String> {
    let visible: Vec<JsonEntry<'_>> = entries
        .iter()
        .filter_map(|entry| match entry {
            ScanEntry::Report(report) if config.show_all || report.is_stale() => {
                Some(JsonEntry::Report(report))
            }
            ScanEntry::Report(_) => None,
            ScanEntry::Failed { path, error } => Some(JsonEntry::Failed {
                path,
                error: error.to_string(),
            }),
        })
        .collect();

    let mut out = serde_json::to_string_pretty(&visible)
        .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
    out.push('\n');
    Ok(out)
}
