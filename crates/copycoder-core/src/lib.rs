//! Core domain of CopyCoder: uploads, settings, prompt generation, mock
//! authentication and persisted state, plus the trait seams the outer layers
//! implement.

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod project;
pub mod prompt;
pub mod state;
pub mod storage;
pub mod upload;

pub use error::{CopyCoderError, Result};
