//! Terminal implementations of the application seams.

use anyhow::Context;
use async_trait::async_trait;
use std::path::PathBuf;

use copycoder_application::{Clipboard, Notification, NotificationVariant, Notifier};
use copycoder_core::error::{CopyCoderError, Result};

/// Prints notifications to stderr, keeping stdout for command output.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let marker = match notification.variant {
            NotificationVariant::Default => "+",
            NotificationVariant::Destructive => "!",
        };
        eprintln!("[{}] {}: {}", marker, notification.title, notification.description);
    }
}

/// "Copies" by writing the text to a file.
pub struct FileClipboard {
    path: PathBuf,
}

impl FileClipboard {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Clipboard for FileClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        tokio::fs::write(&self.path, text)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))
            .map_err(CopyCoderError::from)
    }
}
