//! Template-based prompt generator.

use async_trait::async_trait;
use chrono::SecondsFormat;
use minijinja::{Environment, context};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use super::model::GeneratedPrompt;
use crate::clock::{Clock, SystemClock};
use crate::config::GenerationConfig;
use crate::error::Result;
use crate::project::{AnalysisFocus, AnalysisSettings, ProjectInfo};
use crate::upload::UploadedImage;

const TEMPLATE_NAME: &str = "implementation_spec.md";
const TEMPLATE: &str = include_str!("implementation_spec.md");

/// Per-image analysis phrases. `{focus}` is replaced with the analysis focus.
pub const ANALYSIS_PHRASES: [&str; 10] = [
    "Shows a clean {focus} interface with dark theme and blue accents",
    "Displays a navigation structure with dropdown menus",
    "Features a card-based layout with hover effects",
    "Shows form elements with validation states",
    "Demonstrates a responsive grid layout",
    "Illustrates a modal dialog with backdrop blur",
    "Shows a data visualization component",
    "Features a multi-step wizard interface",
    "Displays a notification system with different states",
    "Shows a file upload component with progress indicators",
];

/// Turns images, settings and project metadata into a prompt.
///
/// Implementations do not check preconditions (non-empty input, finished
/// uploads); callers do.
#[async_trait]
pub trait PromptGenerator: Send + Sync {
    async fn generate(
        &self,
        images: &[UploadedImage],
        settings: &AnalysisSettings,
        project: &ProjectInfo,
    ) -> Result<GeneratedPrompt>;
}

#[derive(Serialize)]
struct ImageAnalysis<'a> {
    name: &'a str,
    analysis: String,
}

pub struct TemplatePromptGenerator {
    env: Environment<'static>,
    latency: Duration,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl TemplatePromptGenerator {
    pub fn new(latency: Duration, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::with_rng(latency, clock, StdRng::from_entropy())
    }

    pub fn with_seed(latency: Duration, clock: Arc<dyn Clock>, seed: u64) -> Result<Self> {
        Self::with_rng(latency, clock, StdRng::seed_from_u64(seed))
    }

    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        Self::new(config.latency(), Arc::new(SystemClock))
    }

    fn with_rng(latency: Duration, clock: Arc<dyn Clock>, rng: StdRng) -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(Self {
            env,
            latency,
            clock,
            rng: Mutex::new(rng),
        })
    }

    fn random_analysis(&self, focus: AnalysisFocus) -> String {
        let index = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.gen_range(0..ANALYSIS_PHRASES.len())
        };
        ANALYSIS_PHRASES[index].replace("{focus}", &focus.to_string())
    }

    fn render(
        &self,
        images: &[UploadedImage],
        settings: &AnalysisSettings,
        project: &ProjectInfo,
    ) -> Result<String> {
        let image_count = images.len();
        let image_text = if image_count == 1 {
            "the uploaded mockup".to_string()
        } else {
            format!("the {} uploaded mockups", image_count)
        };

        // The per-image summary only appears for multi-image generations.
        let analyses: Vec<ImageAnalysis<'_>> = if image_count > 1 {
            images
                .iter()
                .map(|image| ImageAnalysis {
                    name: &image.name,
                    analysis: self.random_analysis(settings.analysis_focus),
                })
                .collect()
        } else {
            Vec::new()
        };

        let generated_at = self
            .clock
            .now()
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        let template = self.env.get_template(TEMPLATE_NAME)?;
        let content = template.render(context! {
            project_name => project.name_or_default(),
            author => project.author_or_default(),
            description => project.description_or_default(),
            custom_prompt => project.custom_prompt(),
            image_text => image_text,
            image_count => image_count,
            analyses => analyses,
            include_performance => settings.processing_option.includes_performance(),
            include_animation => settings.processing_option.includes_animation(),
            temperature => format_temperature(settings.temperature),
            processing => settings.processing_option.to_string(),
            generated_at => generated_at,
        })?;
        Ok(content)
    }
}

/// Shortest decimal form: `0.7`, `1`, `0`.
fn format_temperature(value: f64) -> String {
    format!("{}", value)
}

#[async_trait]
impl PromptGenerator for TemplatePromptGenerator {
    async fn generate(
        &self,
        images: &[UploadedImage],
        settings: &AnalysisSettings,
        project: &ProjectInfo,
    ) -> Result<GeneratedPrompt> {
        tracing::info!(
            "[Prompt] Generating for {} image(s), focus={}, processing={}",
            images.len(),
            settings.analysis_focus,
            settings.processing_option
        );
        tokio::time::sleep(self.latency).await;

        let content = self.render(images, settings, project)?;
        let prompt = GeneratedPrompt {
            id: Uuid::new_v4().to_string(),
            content,
            created_at: self.clock.now(),
            image_ids: images.iter().map(|image| image.id.clone()).collect(),
        };
        tracing::debug!("[Prompt] Generated {} ({} chars)", prompt.id, prompt.content.len());
        Ok(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::project::ProcessingOption;
    use crate::upload::SelectedFile;
    use chrono::{TimeZone, Utc};

    fn generator() -> TemplatePromptGenerator {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
        ));
        TemplatePromptGenerator::with_seed(Duration::from_millis(2500), clock, 1).unwrap()
    }

    fn images(names: &[&str]) -> Vec<UploadedImage> {
        names
            .iter()
            .map(|name| {
                let file = SelectedFile::new(*name, "image/png", vec![0u8; 4]);
                UploadedImage::new_uploading(&file, format!("blob:copycoder/{name}"), Utc::now())
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_image_document() {
        let images = images(&["home.png"]);
        let project = ProjectInfo {
            name: "Acme Dashboard".to_string(),
            author: "Jo".to_string(),
            ..Default::default()
        };

        let prompt = generator()
            .generate(&images, &AnalysisSettings::default(), &project)
            .await
            .unwrap();

        assert_eq!(prompt.image_ids, vec![images[0].id.clone()]);
        let content = &prompt.content;
        assert!(content.starts_with("# UI Implementation Specification for Acme Dashboard\n\n## Overview\n"));
        assert!(content.contains(
            "as shown in the uploaded mockup. The application is A web application by Jo.\n\n\n\n## Layout Structure"
        ));
        assert!(!content.contains("## Image Analysis Summary"));
        assert!(!content.contains("## Custom Requirements"));
        assert!(!content.contains("## Performance Optimization"));
        assert!(!content.contains("## Animation Guidelines"));
        assert!(content.ends_with(
            "- Optimize image loading with next/image\n\n\n\n\nTemperature: 0.7 | Processing: standard | Generated at: 2025-03-14T09:26:53.000Z | Images: 1"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_multi_image_summary_and_ids_in_order() {
        let images = images(&["a.png", "b.png", "c.png"]);
        let settings = AnalysisSettings {
            temperature: 0.3,
            analysis_focus: AnalysisFocus::Mobile,
            processing_option: ProcessingOption::Expert,
        };

        let prompt = generator()
            .generate(&images, &settings, &ProjectInfo::default())
            .await
            .unwrap();

        let ids: Vec<String> = images.iter().map(|i| i.id.clone()).collect();
        assert_eq!(prompt.image_ids, ids);

        let content = &prompt.content;
        assert!(content.contains("# UI Implementation Specification for Unnamed Project"));
        assert!(content.contains("as shown in the 3 uploaded mockups"));
        assert!(content.contains("by Anonymous."));
        assert!(content.contains("## Image Analysis Summary\n- **Image 1**: a.png - "));
        assert!(content.contains("- **Image 2**: b.png - "));
        assert!(content.contains("- **Image 3**: c.png - "));
        assert!(content.contains(
            "\n\n## Consolidated Requirements\nThe following specifications are derived from analyzing all 3 images:\n\n\n## Layout Structure"
        ));
        assert!(content.contains("next/image\n\n## Performance Optimization\n"));
        assert!(content.contains("## Animation Guidelines"));
        assert!(content.contains("Temperature: 0.3 | Processing: expert |"));
        assert!(content.ends_with("| Images: 3"));
        assert!(!content.contains("{focus}"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_requirements_block() {
        let project = ProjectInfo {
            custom_prompt: "Use a sidebar.".to_string(),
            ..Default::default()
        };
        let prompt = generator()
            .generate(&images(&["a.png"]), &AnalysisSettings::default(), &project)
            .await
            .unwrap();
        assert!(prompt
            .content
            .contains("by Anonymous.\n\n## Custom Requirements\nUse a sidebar.\n\n\n\n## Layout Structure"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_enhanced_adds_animation_only() {
        let settings = AnalysisSettings {
            temperature: 1.0,
            processing_option: ProcessingOption::Enhanced,
            ..Default::default()
        };
        let prompt = generator()
            .generate(&images(&["a.png"]), &settings, &ProjectInfo::default())
            .await
            .unwrap();
        assert!(!prompt.content.contains("## Performance Optimization"));
        assert!(prompt
            .content
            .contains("next/image\n\n\n\n## Animation Guidelines\n"));
        assert!(prompt.content.contains("Temperature: 1 | Processing: enhanced |"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_waits_for_latency() {
        let start = tokio::time::Instant::now();
        generator()
            .generate(&images(&["a.png"]), &AnalysisSettings::default(), &ProjectInfo::default())
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(2500));
    }

    #[test]
    fn test_first_phrase_interpolates_focus() {
        assert_eq!(
            ANALYSIS_PHRASES[0].replace("{focus}", &AnalysisFocus::Landing.to_string()),
            "Shows a clean landing interface with dark theme and blue accents"
        );
    }
}
