//! Application layer for CopyCoder.
//!
//! Composes the core services into the use cases the user-facing surface
//! drives: the application shell (uploads, settings, generation, history),
//! notifications, and the login-link flow.

pub mod auth_flow;
pub mod clipboard;
pub mod notification;
pub mod shell;
pub mod upload_notifications;

pub use clipboard::{Clipboard, MemoryClipboard};
pub use notification::{Notification, NotificationVariant, Notifier, RecordingNotifier, TracingNotifier};
pub use shell::{AppShell, GenerationError};
pub use upload_notifications::UploadNotifications;
