//! Loading content from local files
//!
//! HTML files replace the document through the normal markup boundary. Any
//! other file is taken as plain text and becomes a single paragraph.

use crate::document_model::Document;
use crate::editor::{Change, DocumentAdapter};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while importing
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error reading {path}: {source}", path = .0.display(), source = .1)]
    IoError(PathBuf, #[source] std::io::Error),
}

/// How a file's content is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Html,
    PlainText,
}

impl ImportKind {
    /// `.html`/`.htm` files are HTML and any other extension is plain text.
    /// Only a file without an extension is sniffed for a leading tag.
    pub fn detect(path: &Path, content: &str) -> Self {
        match path.extension().map(|ext| ext.to_string_lossy()) {
            Some(ext) if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm") => {
                ImportKind::Html
            }
            Some(_) => ImportKind::PlainText,
            None if content.trim_start().starts_with('<') => ImportKind::Html,
            None => ImportKind::PlainText,
        }
    }
}

/// Read a file into the markup the editor would load
///
/// # Parameters
/// * `path` - File to import
///
/// # Returns
/// * `Ok(String)` - Markup ready for [`DocumentAdapter::set_content`]
/// * `Err(ImportError)` - The file could not be read
pub fn read_markup(path: &Path) -> Result<String, ImportError> {
    let bytes = fs::read(path).map_err(|e| ImportError::IoError(path.to_path_buf(), e))?;
    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("{} is not valid UTF-8, decoding lossily", path.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    let kind = ImportKind::detect(path, &content);
    log::debug!("Importing {} as {:?}", path.display(), kind);
    Ok(match kind {
        ImportKind::Html => content,
        ImportKind::PlainText => Document::from_plain_text(&content).to_html(),
    })
}

/// Replace the adapter's document with a file's content
pub fn import_file(adapter: &mut DocumentAdapter, path: &Path) -> Result<Change, ImportError> {
    let markup = read_markup(path)?;
    let change = adapter.set_content(&markup);
    log::info!("Imported {}", path.display());
    Ok(change)
}
