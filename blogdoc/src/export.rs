//! Writing documents to files
//!
//! Dispatches to the HTML or Markdown exporter and writes the result,
//! creating parent directories as needed.

use crate::document_model::Document;
use crate::metrics::ContentMetrics;
use crate::{html_exporter, markdown_exporter};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Output format for an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Serialized editor markup
    Html,
    /// Lossy Markdown conversion
    Markdown,
}

impl ExportFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("html") | Some("htm") => Some(ExportFormat::Html),
            Some("md") | Some("markdown") => Some(ExportFormat::Markdown),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Markdown => "md",
        }
    }
}

/// Export options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,

    /// Wrap HTML output in a styled page; ignored for Markdown
    pub standalone: bool,

    /// Page title for standalone HTML
    pub title: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Html,
            standalone: false,
            title: String::new(),
        }
    }
}

/// Errors that can occur while exporting
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error writing {path}: {source}", path = .0.display(), source = .1)]
    IoError(PathBuf, #[source] std::io::Error),
}

/// Render a document in the requested format
pub fn render(doc: &Document, options: &ExportOptions, metrics: &ContentMetrics) -> String {
    match options.format {
        ExportFormat::Html if options.standalone => {
            html_exporter::to_standalone_html(doc, &options.title, metrics)
        }
        ExportFormat::Html => html_exporter::to_html(doc),
        ExportFormat::Markdown => markdown_exporter::to_markdown(doc),
    }
}

/// Export a document to a file
///
/// # Parameters
/// * `doc` - The document to export
/// * `output_path` - File to write
/// * `options` - Format and page options
/// * `metrics` - Shown in the standalone page header
///
/// # Returns
/// * `Ok(())` - The file was written
/// * `Err(ExportError)` - The directory or file could not be written
pub fn export_to_file(
    doc: &Document,
    output_path: &Path,
    options: &ExportOptions,
    metrics: &ContentMetrics,
) -> Result<(), ExportError> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| ExportError::IoError(parent.to_path_buf(), e))?;
        }
    }

    let content = render(doc, options, metrics);
    fs::write(output_path, &content)
        .map_err(|e| ExportError::IoError(output_path.to_path_buf(), e))?;

    log::info!(
        "Exported {} ({} bytes) to {}",
        options.format.extension(),
        content.len(),
        output_path.display()
    );
    Ok(())
}
