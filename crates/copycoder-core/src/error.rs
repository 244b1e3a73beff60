//! Error types for the CopyCoder application.

use thiserror::Error;

/// Storage, configuration, migration and rendering failures that cross
/// layers.
///
/// User-facing validation failures have their own small enums (see
/// `upload::UploadError`, `auth::LoginRejection`, ...).
#[derive(Error, Debug, Clone)]
pub enum CopyCoderError {
    /// File system read or write failed
    #[error("IO error: {message}")]
    Io { message: String },

    /// Stored or rendered data could not be encoded or decoded
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", "template", "migration"
        message: String,
    },

    /// `config.toml` or the config directory is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted state could not be brought to the current version
    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CopyCoderError {
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<std::io::Error> for CopyCoderError {
    fn from(err: std::io::Error) -> Self {
        Self::io(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for CopyCoderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CopyCoderError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<minijinja::Error> for CopyCoderError {
    fn from(err: minijinja::Error) -> Self {
        Self::Serialization {
            format: "template".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<version_migrate::MigrationError> for CopyCoderError {
    fn from(err: version_migrate::MigrationError) -> Self {
        use version_migrate::MigrationError;

        match err {
            MigrationError::DeserializationError(_) | MigrationError::SerializationError(_) => {
                Self::Serialization {
                    format: "migration".to_string(),
                    message: err.to_string(),
                }
            }
            _ => Self::Migration(err.to_string()),
        }
    }
}

/// Collaborators such as the CLI clipboard report through anyhow.
impl From<anyhow::Error> for CopyCoderError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{:#}", err))
    }
}

pub type Result<T> = std::result::Result<T, CopyCoderError>;
