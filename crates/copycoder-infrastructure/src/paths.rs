//! Path resolution for CopyCoder files.
//!
//! ```text
//! ~/.config/copycoder/         # Config directory (AppPaths default)
//! ├── config.toml              # Runtime configuration
//! ├── local_storage.json       # Persisted app state (`appState`)
//! └── session_storage.json     # Logged-in user (`auth_user`, `auth_token`)
//! ```

use std::path::{Path, PathBuf};
use version_migrate::AppPaths;

use copycoder_core::error::{CopyCoderError, Result};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "COPYCODER_CONFIG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyCoderPaths {
    config_dir: PathBuf,
}

impl CopyCoderPaths {
    /// Uses `dir` as the config directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: dir.into(),
        }
    }

    /// Resolves the config directory: explicit override, then
    /// `COPYCODER_CONFIG_DIR`, then the platform default.
    pub fn resolve(override_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = override_dir {
            return Ok(Self::new(dir));
        }
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(dir));
        }
        Self::platform_default().map(Self::new)
    }

    fn platform_default() -> Result<PathBuf> {
        match AppPaths::new("copycoder").config_dir() {
            Ok(dir) => Ok(dir),
            Err(_) => {
                tracing::debug!("[Paths] AppPaths failed, falling back to home dir");
                dirs::home_dir()
                    .map(|home| home.join(".copycoder"))
                    .ok_or_else(|| CopyCoderError::config("Cannot find home directory"))
            }
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn local_storage_file(&self) -> PathBuf {
        self.config_dir.join("local_storage.json")
    }

    pub fn session_storage_file(&self) -> PathBuf {
        self.config_dir.join("session_storage.json")
    }
}
