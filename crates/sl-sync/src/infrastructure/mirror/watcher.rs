use crate::application::services::MirrorStore;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Polls the mirror backend for writes made by other processes and turns
/// them into change notices on the in-process channel.
pub fn spawn_revision_watcher(mirror: MirrorStore, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(err) = mirror.prime_revision().await {
            tracing::warn!(error = %err, "mirror revision watcher could not read initial revision");
        }

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match mirror.poll_revision().await {
                Ok(true) => tracing::debug!(key = %mirror.storage_key(), "mirror changed externally"),
                Ok(false) => {}
                Err(err) => tracing::warn!(error = %err, "mirror revision poll failed"),
            }
        }
    })
}
