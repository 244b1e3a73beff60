//! Runtime configuration for CopyCoder.
//!
//! Every field has a default so a partial (or missing) `config.toml` is valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{CopyCoderError, Result};

/// Maximum accepted image size (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Upper bound for `auth.token_ttl_minutes` (one year).
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct CopyCoderConfig {
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum number of images held at once.
    pub max_files: usize,
    /// Maximum size of a single image in bytes.
    pub max_file_size: u64,
    /// Interval between simulated progress ticks.
    pub tick_ms: u64,
    /// Upper bound of a single progress increment.
    pub max_step: u8,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_file_size: MAX_FILE_SIZE,
            tick_ms: 300,
            max_step: 15,
        }
    }
}

impl UploadConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Artificial latency standing in for a real analysis call.
    pub latency_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { latency_ms: 2500 }
    }
}

impl GenerationConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    /// Lifetime of a verification token or code.
    pub token_ttl_minutes: i64,
    /// Base URL used to build login links.
    pub base_url: String,
    /// Simulated delay of a login request.
    pub request_latency_ms: u64,
    /// Simulated delay of a verification.
    pub verify_latency_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_minutes: 15,
            base_url: "http://localhost:3000".to_string(),
            request_latency_ms: 800,
            verify_latency_ms: 600,
        }
    }
}

impl CopyCoderConfig {
    /// Rejects values that would be unusable at runtime.
    pub fn validate(&self) -> Result<()> {
        self.auth.validate()
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<()> {
        let minutes = self.token_ttl_minutes;
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes)
            || chrono::Duration::try_minutes(minutes).is_none()
        {
            return Err(CopyCoderError::config(format!(
                "auth.token_ttl_minutes must be between 1 and {} (got {})",
                MAX_TOKEN_TTL_MINUTES, minutes
            )));
        }
        Ok(())
    }

    /// Token lifetime, clamped to the accepted range so an unvalidated
    /// config cannot overflow timestamp arithmetic.
    pub fn token_ttl(&self) -> chrono::Duration {
        let minutes = self.token_ttl_minutes.clamp(1, MAX_TOKEN_TTL_MINUTES);
        chrono::Duration::try_minutes(minutes).unwrap_or_else(|| chrono::Duration::minutes(15))
    }

    pub fn request_latency(&self) -> Duration {
        Duration::from_millis(self.request_latency_ms)
    }

    pub fn verify_latency(&self) -> Duration {
        Duration::from_millis(self.verify_latency_ms)
    }
}
