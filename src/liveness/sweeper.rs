//! Background eviction task.

use log::info;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time;

use crate::broadcast::broadcast_presence;
use crate::liveness::LivenessTracker;
use crate::registry::ConnectionRegistry;

/// Spawns the recurring sweep task. Each tick evicts identifiers silent for
/// longer than `timeout` from both the liveness tracker and the registry, and
/// rebroadcasts presence once per sweep if anything was evicted.
pub fn spawn_sweeper(
    registry: Arc<Mutex<ConnectionRegistry>>,
    liveness: Arc<Mutex<LivenessTracker>>,
    interval: Duration,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        // The first tick of a tokio interval fires immediately; skip it so
        // sweeps start one full interval after startup.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let evicted = {
                // Lock order: registry before liveness, same as every other
                // path that holds both.
                let mut registry_guard = registry.lock().await;
                let mut liveness_guard = liveness.lock().await;

                let evicted = liveness_guard.sweep(Instant::now(), timeout);
                for id in &evicted {
                    registry_guard.unregister(id);
                }
                evicted
            };

            if evicted.is_empty() {
                continue;
            }

            info!("Evicted {} stale connection(s): {:?}", evicted.len(), evicted);
            broadcast_presence(&registry, &liveness).await;
        }
    })
}
