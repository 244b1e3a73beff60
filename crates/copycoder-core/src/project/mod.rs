//! Project metadata and generation settings.
//!
//! # Module Structure
//!
//! - `model`: `ProjectInfo`, `AnalysisSettings` and their enumerations
//! - `settings`: partial updates and validation

mod model;
mod settings;

pub use model::{AnalysisFocus, AnalysisSettings, ProcessingOption, ProjectInfo};
pub use settings::{SettingsError, SettingsPatch, normalize_temperature};
