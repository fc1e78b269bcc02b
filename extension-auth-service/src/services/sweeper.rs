//! Expiry sweeper.
//!
//! One recurring task owns both cleanup and occupancy logging. Entries older
//! than the configured TTL (one hour by default; the documented policy) are
//! evicted. Eviction never signals failure to request handlers.

use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::services::registry::PendingRequestRegistry;

pub fn spawn_sweeper(
    registry: Arc<PendingRequestRegistry>,
    period: Duration,
    ttl: ChronoDuration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; skip it so a freshly started
        // service does not log a pointless empty sweep.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let evicted = registry.sweep_expired(ttl);
            tracing::info!(
                evicted,
                active = registry.len(),
                "Swept expired extension handshake requests"
            );
        }
    })
}
