//! Turns upload lifecycle events into notifications.

use std::sync::Arc;

use copycoder_core::upload::{UploadObserver, UploadedImage};

use crate::notification::{Notification, Notifier};

pub struct UploadNotifications {
    notifier: Arc<dyn Notifier>,
}

impl UploadNotifications {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

impl UploadObserver for UploadNotifications {
    fn on_complete(&self, image: &UploadedImage) {
        self.notifier.notify(Notification::info(
            "Image uploaded",
            format!("{} has been uploaded successfully.", image.name),
        ));
    }

    fn on_failed(&self, image: &UploadedImage) {
        self.notifier.notify(Notification::destructive(
            "Upload failed",
            format!("Failed to upload {}.", image.name),
        ));
    }
}
