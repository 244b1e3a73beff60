//! Loads files from disk into `SelectedFile`s.

use std::path::Path;
use tokio::fs;

use copycoder_core::error::{CopyCoderError, Result};
use copycoder_core::upload::SelectedFile;

/// Reads `path`, guessing its MIME type from the extension.
///
/// Unknown extensions become `application/octet-stream`, which upload
/// validation then rejects.
pub async fn load_selected_file(path: &Path) -> Result<SelectedFile> {
    let data = fs::read(path)
        .await
        .map_err(|e| CopyCoderError::io(format!("Failed to read {}: {}", path.display(), e)))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    tracing::debug!("[Files] Loaded {} ({}, {} bytes)", name, mime_type, data.len());
    Ok(SelectedFile::new(name, mime_type, data))
}
