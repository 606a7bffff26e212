pub mod json;
pub mod text;

use crate::config::{OutputConfig, OutputFormat};
use crate::error::AppResult;
use crate::workflow::scan::ScanSummary;

pub fn render(summary: &ScanSummary, config: &OutputConfig) -> AppResult<String> {
    match config.format {
        OutputFormat::Text => Ok(text::render(&summary.entries, config)),
        OutputFormat::Json => json::render(&summary.entries, config),
    }
}
