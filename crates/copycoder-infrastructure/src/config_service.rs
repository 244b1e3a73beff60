//! Configuration service.
//!
//! Loads `config.toml` from the config directory and caches it.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use copycoder_core::config::CopyCoderConfig;
use copycoder_core::error::{CopyCoderError, Result};

use crate::paths::CopyCoderPaths;

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration, filled on first access.
    config: Arc<RwLock<Option<CopyCoderConfig>>>,
}

impl ConfigService {
    pub fn new(paths: &CopyCoderPaths) -> Self {
        Self::with_path(paths.config_file())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the configuration, loading it on first access.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn get_config(&self) -> Result<CopyCoderConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        {
            let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn load_config(&self) -> Result<CopyCoderConfig> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "[Config] {} not found, using defaults",
                    self.path.display()
                );
                return Ok(CopyCoderConfig::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: CopyCoderConfig = toml::from_str(&content).map_err(|e| {
            CopyCoderError::Config(format!("Invalid {}: {}", self.path.display(), e))
        })?;
        config.validate()?;
        tracing::info!("[Config] Loaded {}", self.path.display());
        Ok(config)
    }
}
