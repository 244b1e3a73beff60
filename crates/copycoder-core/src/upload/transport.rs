//! Upload transport seam.
//!
//! The only shipped transport is simulated: progress advances by a random
//! step on a fixed tick until it reaches 100.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

use super::model::SelectedFile;
use crate::config::UploadConfig;
use crate::error::Result;

#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Uploads `file`, reporting progress (0..=100) through `on_progress`.
    async fn upload(
        &self,
        file: &SelectedFile,
        on_progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<()>;
}

pub struct SimulatedUpload {
    tick: Duration,
    max_step: u8,
    rng: Mutex<StdRng>,
}

impl SimulatedUpload {
    pub fn new(tick: Duration, max_step: u8) -> Self {
        Self::with_rng(tick, max_step, StdRng::from_entropy())
    }

    /// Deterministic progress steps for tests.
    pub fn with_seed(tick: Duration, max_step: u8, seed: u64) -> Self {
        Self::with_rng(tick, max_step, StdRng::seed_from_u64(seed))
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.tick(), config.max_step)
    }

    fn with_rng(tick: Duration, max_step: u8, rng: StdRng) -> Self {
        Self {
            tick,
            max_step: max_step.max(1),
            rng: Mutex::new(rng),
        }
    }

    fn next_step(&self) -> u8 {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(1..=self.max_step)
    }
}

#[async_trait]
impl UploadTransport for SimulatedUpload {
    async fn upload(
        &self,
        file: &SelectedFile,
        on_progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<()> {
        let mut progress: u8 = 0;
        loop {
            tokio::time::sleep(self.tick).await;
            progress = progress.saturating_add(self.next_step()).min(100);
            tracing::trace!("[Upload] {} at {}%", file.name, progress);
            on_progress(progress);
            if progress == 100 {
                return Ok(());
            }
        }
    }
}
