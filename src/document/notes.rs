//! Notes document reader.
//!
//! Loads the user's study notes from plain-text or Markdown files.

use std::path::Path;

use tracing::debug;

use crate::error::{DaemonError, Result};

/// File extensions accepted as notes documents.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["txt", "text", "md", "markdown"];

/// Reads a notes document and returns its text.
///
/// # Errors
///
/// `UNSUPPORTED_DOCUMENT` for unknown extensions, `DOCUMENT_READ_FAILED` if
/// the file cannot be read as UTF-8, `EMPTY_NOTES` if it has no text.
pub fn read_notes(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(DaemonError::unsupported_document(path.display().to_string()));
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| DaemonError::document_read_failed(path.display().to_string(), e))?;

    if text.trim().is_empty() {
        return Err(DaemonError::empty_notes());
    }

    debug!(path = %path.display(), chars = text.len(), "Read notes");
    Ok(text)
}
