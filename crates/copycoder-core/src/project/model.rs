//! Project and settings domain models.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// User-entered project metadata. Empty strings mean "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub custom_prompt: String,
}

impl ProjectInfo {
    pub fn name_or_default(&self) -> &str {
        non_empty_or(&self.name, "Unnamed Project")
    }

    pub fn author_or_default(&self) -> &str {
        non_empty_or(&self.author, "Anonymous")
    }

    pub fn description_or_default(&self) -> &str {
        non_empty_or(&self.description, "A web application")
    }

    /// Custom requirements, or `None` when empty.
    pub fn custom_prompt(&self) -> Option<&str> {
        (!self.custom_prompt.is_empty()).then_some(self.custom_prompt.as_str())
    }
}

// Only the empty string falls back; whitespace is user input and is kept.
fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// What kind of interface the mockups show.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AnalysisFocus {
    #[default]
    Web,
    Mobile,
    Desktop,
    Ui,
    Landing,
}

/// Processing tier; controls which optional sections are appended.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProcessingOption {
    #[default]
    Standard,
    Enhanced,
    Expert,
}

impl ProcessingOption {
    /// Whether the "Animation Guidelines" section is included.
    pub fn includes_animation(self) -> bool {
        matches!(self, Self::Enhanced | Self::Expert)
    }

    /// Whether the "Performance Optimization" section is included.
    pub fn includes_performance(self) -> bool {
        matches!(self, Self::Expert)
    }
}

/// Generation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSettings {
    /// 0.0 ..= 1.0, one decimal.
    pub temperature: f64,
    pub analysis_focus: AnalysisFocus,
    pub processing_option: ProcessingOption,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            analysis_focus: AnalysisFocus::Web,
            processing_option: ProcessingOption::Standard,
        }
    }
}
