//! AppState DTOs and migrations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use copycoder_core::project::{AnalysisFocus, AnalysisSettings, ProcessingOption};
use copycoder_core::prompt::GeneratedPrompt;
use copycoder_core::state::{AppState, History, HistoryImage, Theme};

/// Application state V1.0.0: only the theme was persisted.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct AppStateV1_0 {
    #[serde(default = "default_theme")]
    pub theme: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDTO {
    pub temperature: f64,
    pub analysis_focus: AnalysisFocus,
    pub processing_option: ProcessingOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFileDTO {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPromptDTO {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub image_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryDTO {
    #[serde(default)]
    pub files: Vec<HistoryFileDTO>,
    #[serde(default)]
    pub prompts: Vec<HistoryPromptDTO>,
}

/// Application state V1.1.0.
///
/// Adds generation settings and the prompt/file history.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.1.0")]
#[serde(rename_all = "camelCase")]
pub struct AppStateV1_1 {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub settings: SettingsDTO,
    #[serde(default)]
    pub history: HistoryDTO,
}

/// Type alias for the latest AppState version.
pub type AppStateDTO = AppStateV1_1;

fn default_theme() -> String {
    Theme::default().to_string()
}

impl Default for SettingsDTO {
    fn default() -> Self {
        AnalysisSettings::default().into()
    }
}

// ============================================================================
// Migration implementations
// ============================================================================

/// Keeps the theme; settings and history start at their defaults.
impl MigratesTo<AppStateV1_1> for AppStateV1_0 {
    fn migrate(self) -> AppStateV1_1 {
        AppStateV1_1 {
            theme: self.theme,
            settings: SettingsDTO::default(),
            history: HistoryDTO::default(),
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl From<AnalysisSettings> for SettingsDTO {
    fn from(settings: AnalysisSettings) -> Self {
        Self {
            temperature: settings.temperature,
            analysis_focus: settings.analysis_focus,
            processing_option: settings.processing_option,
        }
    }
}

impl From<SettingsDTO> for AnalysisSettings {
    fn from(dto: SettingsDTO) -> Self {
        let defaults = AnalysisSettings::default();
        // Out-of-range values from hand-edited files fall back to the default.
        let temperature = copycoder_core::project::normalize_temperature(dto.temperature)
            .unwrap_or(defaults.temperature);
        Self {
            temperature,
            analysis_focus: dto.analysis_focus,
            processing_option: dto.processing_option,
        }
    }
}

impl From<HistoryImage> for HistoryFileDTO {
    fn from(file: HistoryImage) -> Self {
        Self {
            id: file.id,
            name: file.name,
            size: file.size,
            mime_type: file.mime_type,
            uploaded_at: file.uploaded_at,
        }
    }
}

impl From<HistoryFileDTO> for HistoryImage {
    fn from(dto: HistoryFileDTO) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            size: dto.size,
            mime_type: dto.mime_type,
            uploaded_at: dto.uploaded_at,
        }
    }
}

impl From<GeneratedPrompt> for HistoryPromptDTO {
    fn from(prompt: GeneratedPrompt) -> Self {
        Self {
            id: prompt.id,
            content: prompt.content,
            created_at: prompt.created_at,
            image_ids: prompt.image_ids,
        }
    }
}

impl From<HistoryPromptDTO> for GeneratedPrompt {
    fn from(dto: HistoryPromptDTO) -> Self {
        Self {
            id: dto.id,
            content: dto.content,
            created_at: dto.created_at,
            image_ids: dto.image_ids,
        }
    }
}

/// Convert AppStateV1_1 DTO to domain model.
impl IntoDomain<AppState> for AppStateV1_1 {
    fn into_domain(self) -> AppState {
        let mut history = History {
            files: self.history.files.into_iter().map(Into::into).collect(),
            prompts: self.history.prompts.into_iter().map(Into::into).collect(),
        };
        history.files.truncate(copycoder_core::state::HISTORY_LIMIT);
        history.prompts.truncate(copycoder_core::state::HISTORY_LIMIT);

        AppState {
            theme: Theme::from_str(&self.theme).unwrap_or_default(),
            settings: self.settings.into(),
            history,
        }
    }
}

/// Convert domain model to AppStateV1_1 DTO for persistence.
impl FromDomain<AppState> for AppStateV1_1 {
    fn from_domain(state: AppState) -> Self {
        AppStateV1_1 {
            theme: state.theme.to_string(),
            settings: state.settings.into(),
            history: HistoryDTO {
                files: state.history.files.into_iter().map(Into::into).collect(),
                prompts: state.history.prompts.into_iter().map(Into::into).collect(),
            },
        }
    }
}

/// Creates a Migrator for AppState entities.
///
/// Migration path: V1.0 -> V1.1 -> AppState
pub fn create_app_state_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let app_state_path = version_migrate::Migrator::define("app_state")
        .from::<AppStateV1_0>()
        .step::<AppStateV1_1>()
        .into_with_save::<AppState>();

    migrator
        .register(app_state_path)
        .expect("Failed to register app_state migration path");

    migrator
}
