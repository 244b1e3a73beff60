use async_trait::async_trait;

use super::model::AppState;
use crate::error::Result;

/// Loads and stores the application state.
///
/// Implementations return the default state when nothing (or nothing
/// readable) has been stored.
#[async_trait]
pub trait StateRepository: Send + Sync {
    async fn get_state(&self) -> Result<AppState>;

    async fn save_state(&self, state: &AppState) -> Result<()>;
}
