//! Partial settings updates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{AnalysisFocus, AnalysisSettings, ProcessingOption};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("Temperature must be between 0.0 and 1.0 (got {0})")]
    TemperatureOutOfRange(f64),
}

/// A partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub temperature: Option<f64>,
    pub analysis_focus: Option<AnalysisFocus>,
    pub processing_option: Option<ProcessingOption>,
}

impl AnalysisSettings {
    /// Applies `patch`, snapping temperature to one decimal.
    ///
    /// Nothing is changed when the patch is invalid.
    pub fn apply(&mut self, patch: &SettingsPatch) -> Result<(), SettingsError> {
        let temperature = match patch.temperature {
            Some(t) => Some(normalize_temperature(t)?),
            None => None,
        };

        if let Some(t) = temperature {
            self.temperature = t;
        }
        if let Some(focus) = patch.analysis_focus {
            self.analysis_focus = focus;
        }
        if let Some(option) = patch.processing_option {
            self.processing_option = option;
        }
        Ok(())
    }
}

/// Validates the 0.0..=1.0 range and rounds to the slider step of 0.1.
pub fn normalize_temperature(value: f64) -> Result<f64, SettingsError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(SettingsError::TemperatureOutOfRange(value));
    }
    Ok((value * 10.0).round() / 10.0)
}
