//! Application state domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::project::AnalysisSettings;
use crate::prompt::GeneratedPrompt;
use crate::upload::UploadedImage;

/// Maximum number of entries kept in each history list.
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

/// Metadata of an image that contributed to a generation.
///
/// The transient URL is not kept; it does not outlive the upload manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryImage {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&UploadedImage> for HistoryImage {
    fn from(image: &UploadedImage) -> Self {
        Self {
            id: image.id.clone(),
            name: image.name.clone(),
            size: image.size,
            mime_type: image.mime_type.clone(),
            uploaded_at: image.uploaded_at,
        }
    }
}

/// Newest-first history, each list capped at `HISTORY_LIMIT`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub files: Vec<HistoryImage>,
    #[serde(default)]
    pub prompts: Vec<GeneratedPrompt>,
}

impl History {
    /// Prepends a prompt and the images it was generated from.
    pub fn record(&mut self, prompt: GeneratedPrompt, images: &[UploadedImage]) {
        self.prompts.insert(0, prompt);
        self.prompts.truncate(HISTORY_LIMIT);

        let mut files: Vec<HistoryImage> = images.iter().map(HistoryImage::from).collect();
        files.append(&mut self.files);
        files.truncate(HISTORY_LIMIT);
        self.files = files;
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.prompts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.prompts.is_empty()
    }
}

/// Everything stored under the `appState` key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppState {
    pub theme: Theme,
    pub settings: AnalysisSettings,
    pub history: History,
}
