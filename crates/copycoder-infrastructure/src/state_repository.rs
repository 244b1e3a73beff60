//! Application state repository.
//!
//! Persists `AppState` as one versioned JSON blob under the `appState` key of
//! a key/value store and caches it in memory.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use version_migrate::Migrator;

use copycoder_core::error::{CopyCoderError, Result};
use copycoder_core::state::{AppState, StateRepository};
use copycoder_core::storage::{APP_STATE_KEY, KeyValueStore};

use crate::dto::create_app_state_migrator;

const ENTITY: &str = "app_state";

pub struct StateRepositoryImpl {
    store: Arc<dyn KeyValueStore>,
    migrator: Migrator,
    /// Last loaded or saved state.
    cache: Mutex<Option<AppState>>,
}

impl StateRepositoryImpl {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            migrator: create_app_state_migrator(),
            cache: Mutex::new(None),
        }
    }

    /// Reads the stored blob. Anything unreadable yields the default state.
    async fn load(&self) -> Result<AppState> {
        let Some(raw) = self.store.get(APP_STATE_KEY).await? else {
            tracing::debug!("[State] No stored state, using defaults");
            return Ok(AppState::default());
        };

        let parsed: Result<AppState> = serde_json::from_str::<serde_json::Value>(&raw)
            .map_err(CopyCoderError::from)
            .and_then(|value| {
                self.migrator
                    .load_flat_from(ENTITY, value)
                    .map_err(CopyCoderError::from)
            });

        match parsed {
            Ok(state) => Ok(state),
            Err(e) => {
                tracing::warn!("[State] Ignoring unreadable stored state: {}", e);
                Ok(AppState::default())
            }
        }
    }
}

#[async_trait]
impl StateRepository for StateRepositoryImpl {
    async fn get_state(&self) -> Result<AppState> {
        let mut cache = self.cache.lock().await;
        if let Some(state) = cache.as_ref() {
            return Ok(state.clone());
        }

        let state = self.load().await?;
        *cache = Some(state.clone());
        Ok(state)
    }

    async fn save_state(&self, state: &AppState) -> Result<()> {
        let serialized = self
            .migrator
            .save_domain_flat(ENTITY, state.clone())
            .map_err(|e| CopyCoderError::Config(format!("Failed to serialize app state: {}", e)))?;

        let mut cache = self.cache.lock().await;
        self.store.set(APP_STATE_KEY, serialized).await?;
        *cache = Some(state.clone());
        tracing::debug!("[State] Saved app state");
        Ok(())
    }
}
