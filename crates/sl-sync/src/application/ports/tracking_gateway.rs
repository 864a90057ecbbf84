use crate::domain::RemoteOutcome;
use async_trait::async_trait;
use sl_core::{ContactInfo, TrackingEntry, TrackingNumber};

/// Remote authoritative store. Calls never return `Err`: transport and
/// protocol failures are folded into [`RemoteOutcome`].
#[async_trait]
pub trait TrackingGateway: Send + Sync {
    async fn list_all(&self) -> RemoteOutcome<Vec<TrackingEntry>>;
    async fn get_one(&self, number: &TrackingNumber) -> RemoteOutcome<TrackingEntry>;
    async fn upsert(&self, entry: &TrackingEntry) -> RemoteOutcome<TrackingEntry>;
    async fn delete(&self, number: &TrackingNumber) -> RemoteOutcome<()>;
    async fn get_contact(&self) -> RemoteOutcome<ContactInfo>;
    async fn save_contact(&self, info: &ContactInfo) -> RemoteOutcome<ContactInfo>;
}
