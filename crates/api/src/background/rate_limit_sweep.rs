//! Periodic pruning of idle rate limiter clients.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::middleware::rate_limit::RateLimiter;

/// How often the sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(limiter: Arc<RateLimiter>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Rate limit sweep started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Rate limit sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let removed = limiter.cleanup();
                if removed > 0 {
                    tracing::debug!(removed, remaining = limiter.tracked_clients(), "Rate limit sweep: dropped idle clients");
                }
            }
        }
    }
}

/// Spawn [`run`] with the default interval.
pub fn spawn_sweeper(limiter: Arc<RateLimiter>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(run(limiter, SWEEP_INTERVAL, cancel))
}
