//! Report rendering.
//!
//! Turns a finished [`AnalysisResult`] into Markdown, JSON or HTML.

mod generator;
mod html;

pub use generator::{generate_json_report, generate_markdown_report};
pub use html::generate_html_report;

use crate::config::ReportConfig;
use crate::models::AnalysisResult;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// Standalone HTML page
    Html,
}

/// Render `result` in the requested format.
pub fn render_report(
    result: &AnalysisResult,
    format: OutputFormat,
    config: &ReportConfig,
) -> Result<String> {
    match format {
        OutputFormat::Markdown => Ok(generate_markdown_report(result, config)),
        OutputFormat::Json => generate_json_report(result),
        OutputFormat::Html => Ok(generate_html_report(result, config)),
    }
}

/// Render `result` and write it to `path`, creating parent directories.
pub fn write_report(
    result: &AnalysisResult,
    format: OutputFormat,
    config: &ReportConfig,
    path: &Path,
) -> Result<()> {
    let content = render_report(result, format, config)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    info!("Report written to {}", path.display());

    Ok(())
}
