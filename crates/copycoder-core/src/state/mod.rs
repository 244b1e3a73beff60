//! Persisted application state.
//!
//! # Module Structure
//!
//! - `model`: `AppState`, `Theme`, `History`
//! - `repository`: the `StateRepository` trait

mod model;
mod repository;

pub use model::{AppState, HISTORY_LIMIT, History, HistoryImage, Theme};
pub use repository::StateRepository;
