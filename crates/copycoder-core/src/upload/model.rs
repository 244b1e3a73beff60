//! Upload domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::Display;
use uuid::Uuid;

/// A file handed over by the file picker or a drop.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub data: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageStatus {
    Uploading,
    Complete,
    Error,
}

/// An image registered with the upload manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub id: String,
    pub name: String,
    /// Transient URL; only valid while the image is registered.
    pub url: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
    /// 0..=100
    pub progress: u8,
    pub status: ImageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadedImage {
    /// A freshly accepted image: status `uploading`, progress 0.
    pub fn new_uploading(file: &SelectedFile, url: String, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: file.name.clone(),
            url,
            size: file.size(),
            mime_type: file.mime_type.clone(),
            uploaded_at,
            progress: 0,
            status: ImageStatus::Uploading,
            error: None,
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.status == ImageStatus::Uploading
    }

    /// Records a progress report.
    ///
    /// Ignored unless uploading; never moves progress backwards. Returns
    /// `true` when this report completed the upload.
    pub fn apply_progress(&mut self, progress: u8) -> bool {
        if !self.is_uploading() {
            return false;
        }
        self.progress = self.progress.max(progress.min(100));
        if self.progress == 100 {
            self.status = ImageStatus::Complete;
            return true;
        }
        false
    }

    /// Forces completion. Returns `true` if the status changed.
    pub fn complete(&mut self) -> bool {
        self.apply_progress(100)
    }

    /// Marks the upload as failed. Returns `true` if the status changed.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if !self.is_uploading() {
            return false;
        }
        self.status = ImageStatus::Error;
        self.error = Some(message.into());
        true
    }
}
