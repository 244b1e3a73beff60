//! Application shell use case.
//!
//! `AppShell` owns the top-level state: theme, generation settings, project
//! info, the current prompt and the history. It drives the upload manager
//! and the prompt generator, and persists what outlives a run.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

use copycoder_core::error::CopyCoderError;
use copycoder_core::project::{AnalysisSettings, ProjectInfo, SettingsPatch};
use copycoder_core::prompt::{GeneratedPrompt, PromptGenerator};
use copycoder_core::state::{AppState, History, StateRepository, Theme};
use copycoder_core::upload::{
    AddFilesOutcome, ImageUploadManager, SelectedFile, UploadError, UploadedImage,
};

use crate::clipboard::Clipboard;
use crate::notification::{Notification, Notifier};

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("A generation is already in progress.")]
    AlreadyGenerating,

    #[error("No images uploaded.")]
    NoImages,

    #[error("Images still uploading.")]
    StillUploading,

    #[error("Generation failed: {0}")]
    Failed(#[from] CopyCoderError),
}

impl GenerationError {
    fn notification(&self) -> Notification {
        match self {
            Self::AlreadyGenerating => Notification::destructive(
                "Generation in progress",
                "Please wait for the current generation to finish.",
            ),
            Self::NoImages => Notification::destructive(
                "No images uploaded",
                "Please upload at least one image first.",
            ),
            Self::StillUploading => Notification::destructive(
                "Images still uploading",
                "Please wait for all images to finish uploading.",
            ),
            Self::Failed(_) => Notification::destructive(
                "Generation failed",
                "An error occurred while generating the prompt. Please try again.",
            ),
        }
    }
}

/// Holds the generating flag for the lifetime of one generation.
struct GeneratingGuard<'a>(&'a AtomicBool);

impl<'a> GeneratingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct ShellState {
    app: AppState,
    project: ProjectInfo,
    current_prompt: Option<GeneratedPrompt>,
}

pub struct AppShell {
    uploads: ImageUploadManager,
    generator: Arc<dyn PromptGenerator>,
    state_repository: Arc<dyn StateRepository>,
    notifier: Arc<dyn Notifier>,
    clipboard: Arc<dyn Clipboard>,
    state: Mutex<ShellState>,
    is_generating: AtomicBool,
}

impl AppShell {
    /// Creates the shell, restoring theme, settings and history.
    pub async fn load(
        uploads: ImageUploadManager,
        generator: Arc<dyn PromptGenerator>,
        state_repository: Arc<dyn StateRepository>,
        notifier: Arc<dyn Notifier>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Result<Self> {
        let app = state_repository
            .get_state()
            .await
            .context("Failed to load application state")?;
        tracing::debug!(
            "[Shell] Restored theme={} settings={:?} history={} prompt(s)",
            app.theme,
            app.settings,
            app.history.prompts.len()
        );

        Ok(Self {
            uploads,
            generator,
            state_repository,
            notifier,
            clipboard,
            state: Mutex::new(ShellState {
                app,
                project: ProjectInfo::default(),
                current_prompt: None,
            }),
            is_generating: AtomicBool::new(false),
        })
    }

    fn lock(&self) -> MutexGuard<'_, ShellState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn persist(&self) -> Result<()> {
        let snapshot = self.lock().app.clone();
        self.state_repository
            .save_state(&snapshot)
            .await
            .context("Failed to save application state")
    }

    // ------------------------------------------------------------------
    // Uploads
    // ------------------------------------------------------------------

    /// Hands files to the upload manager, notifying about every rejection.
    pub fn add_files(&self, files: Vec<SelectedFile>) -> Result<AddFilesOutcome, UploadError> {
        match self.uploads.add_files(files) {
            Ok(outcome) => {
                for rejection in &outcome.rejected {
                    self.notifier.notify(Notification::destructive(
                        "Upload failed",
                        rejection.reason.to_string(),
                    ));
                }
                Ok(outcome)
            }
            Err(e) => {
                self.notifier
                    .notify(Notification::destructive("Too many files", e.to_string()));
                Err(e)
            }
        }
    }

    pub fn remove_image(&self, id: &str) -> bool {
        self.uploads.remove(id)
    }

    pub fn clear_images(&self) {
        self.uploads.clear();
    }

    pub fn images(&self) -> Vec<UploadedImage> {
        self.uploads.images()
    }

    pub fn uploads(&self) -> &ImageUploadManager {
        &self.uploads
    }

    pub async fn wait_for_uploads(&self) {
        self.uploads.wait_until_settled().await;
    }

    // ------------------------------------------------------------------
    // Generation
    // ------------------------------------------------------------------

    pub fn is_generating(&self) -> bool {
        self.is_generating.load(Ordering::Acquire)
    }

    /// Generates a prompt from the current images, settings and project info.
    ///
    /// Precondition failures change nothing. Every failure is also reported
    /// through the notifier.
    pub async fn generate(&self) -> Result<GeneratedPrompt, GenerationError> {
        let result = self.try_generate().await;
        if let Err(e) = &result {
            self.notifier.notify(e.notification());
        }
        result
    }

    async fn try_generate(&self) -> Result<GeneratedPrompt, GenerationError> {
        if self.is_generating() {
            return Err(GenerationError::AlreadyGenerating);
        }

        let images = self.uploads.images();
        if images.is_empty() {
            return Err(GenerationError::NoImages);
        }
        if images.iter().any(UploadedImage::is_uploading) {
            return Err(GenerationError::StillUploading);
        }

        let _guard =
            GeneratingGuard::acquire(&self.is_generating).ok_or(GenerationError::AlreadyGenerating)?;

        let (settings, project) = {
            let mut state = self.lock();
            state.current_prompt = None;
            (state.app.settings.clone(), state.project.clone())
        };

        tracing::info!("[Shell] Generating prompt from {} image(s)", images.len());
        let prompt = match self.generator.generate(&images, &settings, &project).await {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::error!("[Shell] Prompt generation failed: {}", e);
                return Err(GenerationError::Failed(e));
            }
        };

        {
            let mut state = self.lock();
            state.current_prompt = Some(prompt.clone());
            state.app.history.record(prompt.clone(), &images);
        }
        if let Err(e) = self.persist().await {
            tracing::warn!("[Shell] Generated prompt not persisted: {:#}", e);
        }

        let noun = if images.len() == 1 { "image" } else { "images" };
        self.notifier.notify(Notification::info(
            "Prompt generated",
            format!("Successfully analyzed {} {}.", images.len(), noun),
        ));
        Ok(prompt)
    }

    pub fn current_prompt(&self) -> Option<GeneratedPrompt> {
        self.lock().current_prompt.clone()
    }

    /// Copies the current prompt. Returns `false` when there is none.
    pub async fn copy_current_prompt(&self) -> Result<bool> {
        let Some(prompt) = self.current_prompt() else {
            return Ok(false);
        };
        self.clipboard
            .write_text(&prompt.content)
            .await
            .context("Failed to copy prompt")?;
        self.notifier.notify(Notification::info(
            "Copied to clipboard",
            "The prompt has been copied to your clipboard.",
        ));
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Theme, settings, project info, history
    // ------------------------------------------------------------------

    pub fn theme(&self) -> Theme {
        self.lock().app.theme
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<Theme> {
        self.lock().app.theme = theme;
        self.persist().await?;
        tracing::info!("[Shell] Theme set to {}", theme);
        Ok(theme)
    }

    pub async fn toggle_theme(&self) -> Result<Theme> {
        let next = self.theme().toggled();
        self.set_theme(next).await
    }

    pub fn settings(&self) -> AnalysisSettings {
        self.lock().app.settings.clone()
    }

    /// Applies a partial settings update and persists it.
    ///
    /// An invalid patch leaves the settings untouched.
    pub async fn update_settings(&self, patch: &SettingsPatch) -> Result<AnalysisSettings> {
        let updated = {
            let mut state = self.lock();
            let mut settings = state.app.settings.clone();
            settings.apply(patch)?;
            state.app.settings = settings.clone();
            settings
        };
        self.persist().await?;
        Ok(updated)
    }

    pub fn project_info(&self) -> ProjectInfo {
        self.lock().project.clone()
    }

    pub fn set_project_info(&self, project: ProjectInfo) {
        self.lock().project = project;
    }

    pub fn history(&self) -> History {
        self.lock().app.history.clone()
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.lock().app.history.clear();
        self.persist().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::notification::RecordingNotifier;
    use async_trait::async_trait;
    use copycoder_core::clock::SystemClock;
    use copycoder_core::config::UploadConfig;
    use copycoder_core::project::SettingsError;
    use copycoder_core::upload::{ObjectUrlRegistry, SimulatedUpload};
    use copycoder_infrastructure::StateRepositoryImpl;
    use copycoder_core::storage::MemoryStore;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Counts calls and echoes the image count.
    #[derive(Default)]
    struct CountingGenerator {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl PromptGenerator for CountingGenerator {
        async fn generate(
            &self,
            images: &[UploadedImage],
            settings: &AnalysisSettings,
            _project: &ProjectInfo,
        ) -> copycoder_core::Result<GeneratedPrompt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            if self.fail {
                return Err(CopyCoderError::internal("model unavailable"));
            }
            Ok(GeneratedPrompt {
                id: "prompt-1".to_string(),
                content: format!("Temperature: {}", settings.temperature),
                created_at: chrono::Utc::now(),
                image_ids: images.iter().map(|i| i.id.clone()).collect(),
            })
        }
    }

    struct Fixture {
        shell: Arc<AppShell>,
        generator: Arc<CountingGenerator>,
        notifier: Arc<RecordingNotifier>,
    }

    async fn fixture(generator: CountingGenerator) -> Fixture {
        let uploads = ImageUploadManager::new(
            Arc::new(ObjectUrlRegistry::new()),
            Arc::new(SimulatedUpload::with_seed(Duration::from_millis(300), 15, 9)),
            Arc::new(SystemClock),
            &UploadConfig::default(),
        );
        let generator = Arc::new(generator);
        let notifier = Arc::new(RecordingNotifier::new());
        let repository = Arc::new(StateRepositoryImpl::new(Arc::new(MemoryStore::new())));
        let shell = AppShell::load(
            uploads,
            generator.clone(),
            repository,
            notifier.clone(),
            Arc::new(MemoryClipboard::new()),
        )
        .await
        .unwrap();
        Fixture {
            shell: Arc::new(shell),
            generator,
            notifier,
        }
    }

    fn png(name: &str) -> SelectedFile {
        SelectedFile::new(name, "image/png", vec![0u8; 32])
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_images_never_calls_generator() {
        let f = fixture(CountingGenerator::default()).await;

        let err = f.shell.generate().await.unwrap_err();
        assert_eq!(err.to_string(), "No images uploaded.");
        assert_eq!(f.generator.calls.load(Ordering::SeqCst), 0);
        assert!(!f.shell.is_generating());

        let notification = &f.notifier.all()[0];
        assert_eq!(notification.title, "No images uploaded");
        assert_eq!(notification.description, "Please upload at least one image first.");
        assert!(notification.is_destructive());
    }

    #[tokio::test(start_paused = true)]
    async fn test_still_uploading_is_refused() {
        let f = fixture(CountingGenerator::default()).await;
        f.shell.add_files(vec![png("a.png")]).unwrap();

        let err = f.shell.generate().await.unwrap_err();
        assert!(matches!(err, GenerationError::StillUploading));
        assert_eq!(f.generator.calls.load(Ordering::SeqCst), 0);
        assert!(f.shell.current_prompt().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_generation_records_history() {
        let f = fixture(CountingGenerator::default()).await;
        let outcome = f.shell.add_files(vec![png("a.png"), png("b.png")]).unwrap();
        f.shell.wait_for_uploads().await;

        let prompt = f.shell.generate().await.unwrap();
        let ids: Vec<String> = outcome.accepted.iter().map(|i| i.id.clone()).collect();
        assert_eq!(prompt.image_ids, ids);
        assert_eq!(f.shell.current_prompt(), Some(prompt.clone()));
        assert!(!f.shell.is_generating());

        let history = f.shell.history();
        assert_eq!(history.prompts, vec![prompt]);
        assert_eq!(history.files.len(), 2);

        let last = f.notifier.all().pop().unwrap();
        assert_eq!(last.title, "Prompt generated");
        assert_eq!(last.description, "Successfully analyzed 2 images.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_generation_is_refused() {
        let f = fixture(CountingGenerator::default()).await;
        f.shell.add_files(vec![png("a.png")]).unwrap();
        f.shell.wait_for_uploads().await;

        let shell = f.shell.clone();
        let first = tokio::spawn(async move { shell.generate().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(f.shell.is_generating());

        let err = f.shell.generate().await.unwrap_err();
        assert!(matches!(err, GenerationError::AlreadyGenerating));

        assert!(first.await.unwrap().is_ok());
        assert_eq!(f.generator.calls.load(Ordering::SeqCst), 1);
        assert!(!f.shell.is_generating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_resets_flag_and_notifies() {
        let f = fixture(CountingGenerator {
            fail: true,
            ..Default::default()
        })
        .await;
        f.shell.add_files(vec![png("a.png")]).unwrap();
        f.shell.wait_for_uploads().await;

        let err = f.shell.generate().await.unwrap_err();
        assert!(matches!(err, GenerationError::Failed(_)));
        assert!(!f.shell.is_generating());
        assert!(f.shell.current_prompt().is_none());
        assert!(f.shell.history().prompts.is_empty());
        assert_eq!(f.notifier.titles().last().unwrap(), "Generation failed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejections_are_notified() {
        let f = fixture(CountingGenerator::default()).await;
        let outcome = f
            .shell
            .add_files(vec![SelectedFile::new("a.gif.txt", "text/plain", vec![1u8])])
            .unwrap();
        assert_eq!(outcome.rejected.len(), 1);
        assert!(f.shell.images().is_empty());

        let notification = &f.notifier.all()[0];
        assert_eq!(notification.title, "Upload failed");
        assert_eq!(notification.description, "Only image files are allowed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_settings_patch_is_rejected() {
        let f = fixture(CountingGenerator::default()).await;
        let err = f
            .shell
            .update_settings(&SettingsPatch {
                temperature: Some(-0.5),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<SettingsError>().is_some());
        assert_eq!(f.shell.settings(), AnalysisSettings::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_current_prompt() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let uploads = ImageUploadManager::new(
            Arc::new(ObjectUrlRegistry::new()),
            Arc::new(SimulatedUpload::with_seed(Duration::from_millis(300), 15, 9)),
            Arc::new(SystemClock),
            &UploadConfig::default(),
        );
        let notifier = Arc::new(RecordingNotifier::new());
        let shell = AppShell::load(
            uploads,
            Arc::new(CountingGenerator::default()),
            Arc::new(StateRepositoryImpl::new(Arc::new(MemoryStore::new()))),
            notifier.clone(),
            clipboard.clone(),
        )
        .await
        .unwrap();

        assert!(!shell.copy_current_prompt().await.unwrap());

        shell.add_files(vec![png("a.png")]).unwrap();
        shell.wait_for_uploads().await;
        let prompt = shell.generate().await.unwrap();
        assert!(shell.copy_current_prompt().await.unwrap());
        assert_eq!(clipboard.contents(), Some(prompt.content));
        assert_eq!(notifier.titles().last().unwrap(), "Copied to clipboard");
    }
}
