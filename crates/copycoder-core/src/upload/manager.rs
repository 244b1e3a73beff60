//! Image upload manager.
//!
//! Owns the ordered image collection. Each accepted file gets a transient URL
//! and a spawned upload task; both are released on `remove`, `clear`, or when
//! the manager is dropped.

use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use super::model::{SelectedFile, UploadedImage};
use super::transport::{SimulatedUpload, UploadTransport};
use super::url::{ObjectUrlRegistry, TransientUrlStore};
use super::validation::{FileRejection, validate_file};
use crate::clock::{Clock, SystemClock};
use crate::config::UploadConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("You can upload a maximum of {max} images.")]
    TooManyFiles { max: usize },
}

/// Receives upload lifecycle events. Called outside the manager's lock.
pub trait UploadObserver: Send + Sync {
    fn on_complete(&self, _image: &UploadedImage) {}
    fn on_failed(&self, _image: &UploadedImage) {}
}

pub struct NoopUploadObserver;

impl UploadObserver for NoopUploadObserver {}

/// Result of a batch that passed the count check.
#[derive(Debug, Default)]
pub struct AddFilesOutcome {
    pub accepted: Vec<UploadedImage>,
    pub rejected: Vec<FileRejection>,
}

struct Entry {
    image: UploadedImage,
    cancel: CancellationToken,
}

struct Shared {
    entries: Mutex<Vec<Entry>>,
    changed: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Applies `f` to the image with `id`. Returns a snapshot when `f`
    /// reports a status change. Unknown ids are ignored.
    fn update<F>(&self, id: &str, f: F) -> Option<UploadedImage>
    where
        F: FnOnce(&mut UploadedImage) -> bool,
    {
        let changed = {
            let mut entries = self.lock();
            let entry = entries.iter_mut().find(|e| e.image.id == id)?;
            f(&mut entry.image).then(|| entry.image.clone())
        };
        self.changed.notify_waiters();
        changed
    }
}

pub struct ImageUploadManager {
    shared: Arc<Shared>,
    urls: Arc<dyn TransientUrlStore>,
    transport: Arc<dyn UploadTransport>,
    observer: Arc<dyn UploadObserver>,
    clock: Arc<dyn Clock>,
    max_files: usize,
    max_file_size: u64,
    shutdown: CancellationToken,
}

impl ImageUploadManager {
    pub fn new(
        urls: Arc<dyn TransientUrlStore>,
        transport: Arc<dyn UploadTransport>,
        clock: Arc<dyn Clock>,
        config: &UploadConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: Mutex::new(Vec::new()),
                changed: Notify::new(),
            }),
            urls,
            transport,
            observer: Arc::new(NoopUploadObserver),
            clock,
            max_files: config.max_files,
            max_file_size: config.max_file_size,
            shutdown: CancellationToken::new(),
        }
    }

    /// Simulated transport, in-process URL registry and system clock.
    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(
            Arc::new(ObjectUrlRegistry::new()),
            Arc::new(SimulatedUpload::from_config(config)),
            Arc::new(SystemClock),
            config,
        )
    }

    pub fn with_observer(mut self, observer: Arc<dyn UploadObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Validates and registers a batch of files.
    ///
    /// The batch is refused as a whole when it would exceed `max_files`.
    /// Otherwise each file is validated on its own; rejected files do not
    /// affect their siblings. Must be called within a Tokio runtime.
    pub fn add_files(&self, files: Vec<SelectedFile>) -> Result<AddFilesOutcome, UploadError> {
        let mut outcome = AddFilesOutcome::default();
        let mut spawns = Vec::new();

        {
            let mut entries = self.shared.lock();
            if entries.len() + files.len() > self.max_files {
                tracing::warn!(
                    "[Upload] Refusing {} file(s): {} already held, max {}",
                    files.len(),
                    entries.len(),
                    self.max_files
                );
                return Err(UploadError::TooManyFiles {
                    max: self.max_files,
                });
            }

            for file in files {
                if let Err(reason) = validate_file(&file, self.max_file_size) {
                    tracing::info!("[Upload] Rejected {}: {}", file.name, reason);
                    outcome.rejected.push(FileRejection {
                        file_name: file.name.clone(),
                        reason,
                    });
                    continue;
                }

                let url = self.urls.create(&file);
                let image = UploadedImage::new_uploading(&file, url, self.clock.now());
                let cancel = self.shutdown.child_token();
                tracing::debug!("[Upload] Registered {} as {}", image.name, image.id);

                outcome.accepted.push(image.clone());
                spawns.push((image.id.clone(), file, cancel.clone()));
                entries.push(Entry { image, cancel });
            }
        }

        self.shared.changed.notify_waiters();
        for (id, file, cancel) in spawns {
            self.spawn_upload(id, file, cancel);
        }
        Ok(outcome)
    }

    fn spawn_upload(&self, id: String, file: SelectedFile, cancel: CancellationToken) {
        let shared = Arc::clone(&self.shared);
        let transport = Arc::clone(&self.transport);
        let observer = Arc::clone(&self.observer);

        tokio::spawn(async move {
            let progress_shared = Arc::clone(&shared);
            let progress_observer = Arc::clone(&observer);
            let progress_id = id.clone();
            let on_progress = move |progress: u8| {
                if let Some(done) =
                    progress_shared.update(&progress_id, |image| image.apply_progress(progress))
                {
                    progress_observer.on_complete(&done);
                }
            };

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("[Upload] Cancelled upload of {}", id);
                    return;
                }
                result = transport.upload(&file, &on_progress) => result,
            };

            match result {
                Ok(()) => {
                    if let Some(done) = shared.update(&id, UploadedImage::complete) {
                        observer.on_complete(&done);
                    }
                }
                Err(e) => {
                    tracing::warn!("[Upload] Upload of {} failed: {}", file.name, e);
                    if let Some(failed) = shared.update(&id, |image| image.fail("Upload failed")) {
                        observer.on_failed(&failed);
                    }
                }
            }
        });
    }

    /// Removes an image, cancelling its upload and revoking its URL.
    /// Returns `false` if no image had that id.
    pub fn remove(&self, id: &str) -> bool {
        let removed = {
            let mut entries = self.shared.lock();
            entries
                .iter()
                .position(|e| e.image.id == id)
                .map(|index| entries.remove(index))
        };

        match removed {
            Some(entry) => {
                self.release(entry);
                self.shared.changed.notify_waiters();
                true
            }
            None => false,
        }
    }

    /// Removes every image.
    pub fn clear(&self) {
        let drained: Vec<Entry> = self.shared.lock().drain(..).collect();
        if drained.is_empty() {
            return;
        }
        tracing::debug!("[Upload] Clearing {} image(s)", drained.len());
        for entry in drained {
            self.release(entry);
        }
        self.shared.changed.notify_waiters();
    }

    fn release(&self, entry: Entry) {
        entry.cancel.cancel();
        self.urls.revoke(&entry.image.url);
    }

    /// Snapshot of the collection in insertion order.
    pub fn images(&self) -> Vec<UploadedImage> {
        self.shared.lock().iter().map(|e| e.image.clone()).collect()
    }

    pub fn get(&self, id: &str) -> Option<UploadedImage> {
        self.shared
            .lock()
            .iter()
            .find(|e| e.image.id == id)
            .map(|e| e.image.clone())
    }

    pub fn len(&self) -> usize {
        self.shared.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_uploading(&self) -> bool {
        self.shared.lock().iter().any(|e| e.image.is_uploading())
    }

    /// Resolves until no image is uploading.
    pub async fn wait_until_settled(&self) {
        loop {
            let notified = self.shared.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if !self.has_uploading() {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for ImageUploadManager {
    fn drop(&mut self) {
        self.shutdown.cancel();
        let drained: Vec<Entry> = self.shared.lock().drain(..).collect();
        for entry in drained {
            self.urls.revoke(&entry.image.url);
        }
    }
}
