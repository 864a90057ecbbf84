use crate::application::ports::{ListingView, TrackingGateway};
use crate::application::services::MirrorStore;
use crate::domain::{MirrorSnapshot, MirroredEntry, RemoteOutcome};
use crate::shared::error::AppError;
use sl_core::TrackingNumber;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshReport {
    /// The remote list was unavailable; the mirror was left untouched.
    Skipped { reason: String },
    Merged {
        remote: usize,
        kept_unsynced: Vec<TrackingNumber>,
        evicted: Vec<TrackingNumber>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SyncStatus {
    /// At least one refresh is running.
    pub is_syncing: bool,
    pub last_sync: Option<i64>,
    pub consecutive_failures: u32,
}

/// Marks a refresh as running until dropped, so a refresh future that is
/// cancelled mid-flight still clears `is_syncing`.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Reconciles the mirror with the remote store.
///
/// Refreshes are not serialized against each other or against writes; the
/// last one to persist the mirror wins.
pub struct SyncEngine {
    gateway: Arc<dyn TrackingGateway>,
    mirror: MirrorStore,
    view: Arc<dyn ListingView>,
    in_flight: AtomicUsize,
    status: RwLock<SyncStatus>,
}

impl SyncEngine {
    pub fn new(
        gateway: Arc<dyn TrackingGateway>,
        mirror: MirrorStore,
        view: Arc<dyn ListingView>,
    ) -> Self {
        Self {
            gateway,
            mirror,
            view,
            in_flight: AtomicUsize::new(0),
            status: RwLock::new(SyncStatus::default()),
        }
    }

    pub async fn status(&self) -> SyncStatus {
        let mut status = self.status.read().await.clone();
        status.is_syncing = self.in_flight.load(Ordering::SeqCst) > 0;
        status
    }

    /// Pulls the remote list and merges it into the mirror.
    ///
    /// Remote entries win and are marked synced. Local entries the remote no
    /// longer lists are evicted unless they are still waiting to be pushed.
    /// When the list cannot be fetched nothing is written or rendered.
    pub async fn refresh(&self) -> Result<RefreshReport, AppError> {
        let _in_flight = InFlight::enter(&self.in_flight);
        let result = self.merge_remote().await;

        let mut status = self.status.write().await;
        match &result {
            Ok(RefreshReport::Merged { .. }) => {
                status.last_sync = Some(chrono::Utc::now().timestamp());
                status.consecutive_failures = 0;
            }
            Ok(RefreshReport::Skipped { .. }) | Err(_) => status.consecutive_failures += 1,
        }
        result
    }

    async fn merge_remote(&self) -> Result<RefreshReport, AppError> {
        let remote = match self.gateway.list_all().await {
            RemoteOutcome::Data(entries) => entries,
            other => {
                let reason = other.to_string();
                tracing::warn!(%reason, "remote list unavailable, keeping local mirror");
                return Ok(RefreshReport::Skipped { reason });
            }
        };

        let remote: MirrorSnapshot = remote
            .into_iter()
            .map(|entry| {
                let entry = entry.normalized();
                (entry.number.clone(), MirroredEntry::synced(entry))
            })
            .collect();
        let remote_count = remote.len();

        let (mut snapshot, evicted): (MirrorSnapshot, MirrorSnapshot) = self
            .mirror
            .load()
            .await
            .into_iter()
            .partition(|(number, local)| local.unsynced || remote.contains_key(number));
        let evicted: Vec<TrackingNumber> = evicted.into_keys().collect();

        snapshot.extend(remote);

        let kept_unsynced: Vec<TrackingNumber> = snapshot
            .values()
            .filter(|local| local.unsynced)
            .map(|local| local.number().clone())
            .collect();

        self.mirror.save(&snapshot).await?;
        self.view.render(&snapshot);

        tracing::info!(
            remote = remote_count,
            pending = kept_unsynced.len(),
            evicted = evicted.len(),
            "mirror refreshed from remote"
        );
        Ok(RefreshReport::Merged {
            remote: remote_count,
            kept_unsynced,
            evicted,
        })
    }

    /// Refreshes on a fixed interval until the handle is aborted. The first
    /// tick fires one interval after spawning.
    pub fn spawn_periodic_refresh(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(err) = engine.refresh().await {
                    tracing::error!(error = %err, "periodic refresh failed");
                }
            }
        })
    }
}
