//! Local mirror of tracking entries, shared by every context attached to
//! the same backend.

use crate::application::ports::MirrorBackend;
use crate::application::services::mirror_channel::{MirrorChannel, MirrorSubscription};
use crate::domain::{ContextId, MirrorChanged, MirrorSnapshot, MirroredEntry, STORAGE_KEY};
use crate::shared::error::AppError;
use sl_core::TrackingNumber;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct MirrorStore {
    backend: Arc<dyn MirrorBackend>,
    channel: MirrorChannel,
    context: ContextId,
    storage_key: Arc<str>,
    last_revision: Arc<Mutex<Option<String>>>,
}

impl MirrorStore {
    pub fn new(backend: Arc<dyn MirrorBackend>, channel: MirrorChannel) -> Self {
        Self {
            backend,
            channel,
            context: ContextId::new(),
            storage_key: Arc::from(STORAGE_KEY),
            last_revision: Arc::new(Mutex::new(None)),
        }
    }

    /// A second context over the same backend and channel, as another open
    /// client would be.
    pub fn attach(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            channel: self.channel.clone(),
            context: ContextId::new(),
            storage_key: Arc::clone(&self.storage_key),
            last_revision: Arc::new(Mutex::new(None)),
        }
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn subscribe(&self) -> MirrorSubscription {
        self.channel.subscribe(self.context, &self.storage_key)
    }

    /// Reads the whole mirror. Missing, unreadable and corrupt payloads all
    /// yield an empty snapshot.
    pub async fn load(&self) -> MirrorSnapshot {
        let raw = match self.backend.read(&self.storage_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return MirrorSnapshot::new(),
            Err(err) => {
                tracing::warn!(error = %err, key = %self.storage_key, "mirror read failed");
                return MirrorSnapshot::new();
            }
        };

        match serde_json::from_str::<MirrorSnapshot>(&raw) {
            // Re-key on the entries themselves so a hand-edited key cannot
            // disagree with the number it points at.
            Ok(snapshot) => snapshot
                .into_values()
                .map(|entry| (entry.number().clone(), entry))
                .collect(),
            Err(err) => {
                tracing::warn!(error = %err, key = %self.storage_key, "mirror payload is corrupt, treating as empty");
                MirrorSnapshot::new()
            }
        }
    }

    /// Persists the full snapshot and notifies other contexts.
    pub async fn save(&self, snapshot: &MirrorSnapshot) -> Result<(), AppError> {
        let serialized = serde_json::to_string(snapshot)?;
        self.backend.write(&self.storage_key, &serialized).await?;
        self.after_write().await;
        Ok(())
    }

    pub async fn get(&self, number: &TrackingNumber) -> Option<MirroredEntry> {
        self.load().await.remove(number)
    }

    /// Inserts or replaces one entry and returns the persisted snapshot.
    pub async fn set(&self, entry: MirroredEntry) -> Result<MirrorSnapshot, AppError> {
        let mut snapshot = self.load().await;
        snapshot.insert(entry.number().clone(), entry);
        self.save(&snapshot).await?;
        Ok(snapshot)
    }

    pub async fn remove(&self, number: &TrackingNumber) -> Result<MirrorSnapshot, AppError> {
        let mut snapshot = self.load().await;
        snapshot.remove(number);
        self.save(&snapshot).await?;
        Ok(snapshot)
    }

    pub async fn clear(&self) -> Result<MirrorSnapshot, AppError> {
        let snapshot = MirrorSnapshot::new();
        self.save(&snapshot).await?;
        Ok(snapshot)
    }

    /// Records the current backend revision without announcing it.
    pub async fn prime_revision(&self) -> Result<(), AppError> {
        let current = self.backend.revision(&self.storage_key).await?;
        *self.last_revision.lock().await = current;
        Ok(())
    }

    /// Compares the backend revision with the last one this context saw and
    /// announces an external change when they differ.
    pub async fn poll_revision(&self) -> Result<bool, AppError> {
        let current = self.backend.revision(&self.storage_key).await?;
        let mut last = self.last_revision.lock().await;
        if *last == current {
            return Ok(false);
        }
        *last = current;
        drop(last);

        self.channel.publish(MirrorChanged {
            storage_key: self.storage_key.to_string(),
            origin: ContextId::external(),
        });
        Ok(true)
    }

    async fn after_write(&self) {
        match self.backend.revision(&self.storage_key).await {
            Ok(revision) => *self.last_revision.lock().await = revision,
            Err(err) => tracing::debug!(error = %err, "mirror revision unavailable after write"),
        }
        self.channel.publish(MirrorChanged {
            storage_key: self.storage_key.to_string(),
            origin: self.context,
        });
    }
}
