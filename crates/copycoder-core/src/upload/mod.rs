//! Image upload domain module.
//!
//! # Module Structure
//!
//! - `model`: `UploadedImage`, `ImageStatus`, `SelectedFile`
//! - `validation`: per-file checks and human-readable sizes
//! - `url`: transient URL allocation and revocation
//! - `transport`: the upload seam and its simulated implementation
//! - `manager`: `ImageUploadManager`, which ties the above together

mod manager;
mod model;
mod transport;
mod url;
mod validation;

pub use manager::{AddFilesOutcome, ImageUploadManager, NoopUploadObserver, UploadError, UploadObserver};
pub use model::{ImageStatus, SelectedFile, UploadedImage};
pub use transport::{SimulatedUpload, UploadTransport};
pub use url::{ObjectUrlRegistry, TransientUrlStore};
pub use validation::{FileRejection, RejectionReason, format_file_size, validate_file};
