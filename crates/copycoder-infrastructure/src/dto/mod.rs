//! Versioned persistence DTOs.
//!
//! Every persisted entity carries a `version` field and is read through a
//! `version_migrate::Migrator`, so older blobs are upgraded on load.

pub mod app_state;

pub use app_state::{AppStateDTO, AppStateV1_0, AppStateV1_1, create_app_state_migrator};
