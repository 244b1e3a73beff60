//! Prompt generation.
//!
//! # Module Structure
//!
//! - `model`: `GeneratedPrompt`
//! - `generator`: the `PromptGenerator` seam and the template implementation

mod generator;
mod model;

pub use generator::{ANALYSIS_PHRASES, PromptGenerator, TemplatePromptGenerator};
pub use model::GeneratedPrompt;
