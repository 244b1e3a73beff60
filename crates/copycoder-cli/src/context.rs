//! Wires configuration, storage and services together for one CLI run.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use copycoder_application::{AppShell, Clipboard, MemoryClipboard, Notifier, UploadNotifications};
use copycoder_core::auth::AuthService;
use copycoder_core::clock::SystemClock;
use copycoder_core::config::CopyCoderConfig;
use copycoder_core::prompt::TemplatePromptGenerator;
use copycoder_core::state::StateRepository;
use copycoder_core::upload::ImageUploadManager;
use copycoder_infrastructure::{ConfigService, CopyCoderPaths, JsonFileStore, StateRepositoryImpl};

use crate::console::ConsoleNotifier;

pub struct AppContext {
    pub config: CopyCoderConfig,
    pub notifier: Arc<dyn Notifier>,
    pub state_repository: Arc<dyn StateRepository>,
    pub auth: Arc<AuthService>,
}

impl AppContext {
    pub async fn bootstrap(config_dir: Option<PathBuf>) -> Result<Self> {
        let paths = CopyCoderPaths::resolve(config_dir)?;
        tracing::debug!("[Bootstrap] Config dir: {}", paths.config_dir().display());

        let config = ConfigService::new(&paths)
            .get_config()
            .context("Failed to load configuration")?;

        let local_storage = JsonFileStore::open(paths.local_storage_file())
            .await
            .context("Failed to open local storage")?;
        let session_storage = JsonFileStore::open(paths.session_storage_file())
            .await
            .context("Failed to open session storage")?;

        let auth = Arc::new(AuthService::new(
            Arc::new(SystemClock),
            Arc::new(session_storage),
            config.auth.clone(),
        ));

        Ok(Self {
            state_repository: Arc::new(StateRepositoryImpl::new(Arc::new(local_storage))),
            notifier: Arc::new(ConsoleNotifier),
            config,
            auth,
        })
    }

    /// Builds the application shell. `clipboard` defaults to an in-memory one.
    pub async fn shell(&self, clipboard: Option<Arc<dyn Clipboard>>) -> Result<AppShell> {
        let uploads = ImageUploadManager::from_config(&self.config.upload)
            .with_observer(Arc::new(UploadNotifications::new(self.notifier.clone())));
        let generator = TemplatePromptGenerator::from_config(&self.config.generation)
            .context("Failed to prepare the prompt template")?;

        AppShell::load(
            uploads,
            Arc::new(generator),
            self.state_repository.clone(),
            self.notifier.clone(),
            clipboard.unwrap_or_else(|| Arc::new(MemoryClipboard::new())),
        )
        .await
    }
}
