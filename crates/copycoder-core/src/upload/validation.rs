//! Per-file validation.

use thiserror::Error;

use super::model::SelectedFile;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("File size exceeds {limit} limit ({actual})")]
    TooLarge { limit: String, actual: String },

    #[error("Only image files are allowed")]
    NotAnImage,
}

/// A single file turned away by validation; its siblings are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file_name}: {reason}")]
pub struct FileRejection {
    pub file_name: String,
    pub reason: RejectionReason,
}

/// Checks size first, then MIME type.
pub fn validate_file(file: &SelectedFile, max_size: u64) -> Result<(), RejectionReason> {
    if file.size() > max_size {
        return Err(RejectionReason::TooLarge {
            limit: format_file_size(max_size).replace(' ', ""),
            actual: format_file_size(file.size()),
        });
    }

    if !file.mime_type.starts_with("image/") {
        return Err(RejectionReason::NotAnImage);
    }

    Ok(())
}

/// Formats a byte count as e.g. `512 Bytes`, `1.5 KB`, `10 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
