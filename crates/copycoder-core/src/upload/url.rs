//! Transient URLs for in-memory file content.
//!
//! A transient URL resolves to file bytes for as long as it is live. Every
//! `create` must be paired with exactly one `revoke`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::model::SelectedFile;

pub trait TransientUrlStore: Send + Sync {
    /// Allocates a new URL for `file`'s content.
    fn create(&self, file: &SelectedFile) -> String;

    /// Releases `url`. Returns `false` if it was not live.
    fn revoke(&self, url: &str) -> bool;

    /// Resolves a live URL to its content.
    fn resolve(&self, url: &str) -> Option<Arc<[u8]>>;
}

/// In-process registry handing out `blob:copycoder/<uuid>` URLs.
#[derive(Debug, Default)]
pub struct ObjectUrlRegistry {
    live: Mutex<HashMap<String, Arc<[u8]>>>,
}

impl ObjectUrlRegistry {
    pub const SCHEME_PREFIX: &'static str = "blob:copycoder/";

    pub fn new() -> Self {
        Self::default()
    }

    /// Number of URLs allocated and not yet revoked.
    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl TransientUrlStore for ObjectUrlRegistry {
    fn create(&self, file: &SelectedFile) -> String {
        let url = format!("{}{}", Self::SCHEME_PREFIX, Uuid::new_v4());
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.clone(), Arc::clone(&file.data));
        url
    }

    fn revoke(&self, url: &str) -> bool {
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(url)
            .is_some()
    }

    fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(url)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_resolve_revoke() {
        let registry = ObjectUrlRegistry::new();
        let file = SelectedFile::new("a.png", "image/png", vec![7u8, 8, 9]);

        let url = registry.create(&file);
        assert!(url.starts_with(ObjectUrlRegistry::SCHEME_PREFIX));
        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.resolve(&url).as_deref(), Some(&[7u8, 8, 9][..]));

        assert!(registry.revoke(&url));
        assert!(!registry.revoke(&url));
        assert!(registry.resolve(&url).is_none());
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_same_content_gets_distinct_urls() {
        let registry = ObjectUrlRegistry::new();
        let file = SelectedFile::new("a.png", "image/png", vec![1u8]);
        let first = registry.create(&file);
        let second = registry.create(&file);
        assert_ne!(first, second);
        assert!(registry.revoke(&first));
        assert!(registry.resolve(&second).is_some());
    }
}
