// Expiry Sweeper
// Periodic PUBLISHED -> EXPIRED sweep, independent of request handling

use super::JobPublishingManager;
use crate::application::shutdown::ShutdownToken;
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

pub struct ExpirySweeper {
    publishing: Arc<JobPublishingManager>,
    interval_secs: u64,
}

impl ExpirySweeper {
    /// # Arguments
    /// * `publishing` - Job publishing manager that owns the sweep query
    /// * `interval_secs` - Seconds between sweeps (the first sweep runs immediately)
    pub fn new(publishing: Arc<JobPublishingManager>, interval_secs: u64) -> Self {
        Self {
            publishing,
            interval_secs: interval_secs.max(1),
        }
    }

    /// Sweep loop (background task), exits on shutdown
    pub async fn run(self, mut shutdown: ShutdownToken) {
        info!(interval_secs = self.interval_secs, "Expiry sweeper started");

        let mut tick = interval(Duration::from_secs(self.interval_secs));

        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                _ = tick.tick() => {
                    if let Err(e) = self.publishing.sweep_expired().await {
                        error!(error = ?e, "Scheduled expiry sweep failed");
                    }
                }
            }
        }

        info!("Expiry sweeper stopped");
    }

    /// Run one sweep immediately (manual trigger)
    pub async fn run_now(&self) -> Result<u64> {
        info!("Running manual expiry sweep...");
        self.publishing.sweep_expired().await
    }
}
