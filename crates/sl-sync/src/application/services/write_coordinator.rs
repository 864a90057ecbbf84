//! Optimistic admin writes: the mirror changes first, the remote store
//! second, and the outcome says which of the two ended up holding what.

use crate::application::ports::{ListingView, TrackingGateway};
use crate::application::services::MirrorStore;
use crate::domain::{MirrorSnapshot, MirroredEntry, RemoteOutcome};
use crate::shared::error::AppError;
use sl_core::{TrackingDraft, TrackingEntry, TrackingNumber};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Remote accepted the write; the mirror holds its canonical copy.
    Synced(TrackingEntry),
    /// Remote was unreachable or refused; the entry stays unsynced locally.
    StoredLocally { entry: TrackingEntry, reason: String },
    /// Remote reported a conflicting record; the entry stays unsynced locally.
    Conflict { entry: TrackingEntry, reason: String },
}

impl UpsertOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, UpsertOutcome::Synced(_))
    }

    pub fn entry(&self) -> &TrackingEntry {
        match self {
            UpsertOutcome::Synced(entry)
            | UpsertOutcome::StoredLocally { entry, .. }
            | UpsertOutcome::Conflict { entry, .. } => entry,
        }
    }

    pub fn notice(&self) -> String {
        match self {
            UpsertOutcome::Synced(entry) => format!("Saved {}", entry.number),
            UpsertOutcome::StoredLocally { entry, reason } => format!(
                "Saved {} locally only; other clients will not see it until it syncs ({reason})",
                entry.number
            ),
            UpsertOutcome::Conflict { entry, reason } => format!(
                "{} conflicts with an existing record ({reason}); kept locally",
                entry.number
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(TrackingNumber),
    /// Remote delete failed, so the removed entry was put back.
    RolledBack { entry: TrackingEntry, reason: String },
}

impl DeleteOutcome {
    pub fn notice(&self) -> String {
        match self {
            DeleteOutcome::Deleted(number) => format!("Deleted {number}"),
            DeleteOutcome::RolledBack { entry, reason } => {
                format!("Delete of {} failed and was reverted ({reason})", entry.number)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    pub attempted: usize,
    /// Numbers whose remote delete did not succeed. They are gone from the
    /// mirror but may still exist remotely.
    pub failed: Vec<TrackingNumber>,
}

impl ResetReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct WriteCoordinator {
    gateway: Arc<dyn TrackingGateway>,
    mirror: MirrorStore,
    view: Arc<dyn ListingView>,
}

impl WriteCoordinator {
    pub fn new(
        gateway: Arc<dyn TrackingGateway>,
        mirror: MirrorStore,
        view: Arc<dyn ListingView>,
    ) -> Self {
        Self {
            gateway,
            mirror,
            view,
        }
    }

    /// Validates an edit-form draft and writes it. An empty number fails
    /// before anything is touched.
    pub async fn save_entry(&self, draft: TrackingDraft) -> Result<UpsertOutcome, AppError> {
        let entry = draft.into_entry()?;
        self.upsert(entry).await
    }

    pub async fn upsert(&self, entry: TrackingEntry) -> Result<UpsertOutcome, AppError> {
        let entry = entry.normalized();
        let snapshot = self.mirror.set(MirroredEntry::pending(entry.clone())).await?;
        self.view.render(&snapshot);

        match self.gateway.upsert(&entry).await {
            RemoteOutcome::Data(canonical) => {
                let canonical = canonical.normalized();
                let mut snapshot = self.mirror.load().await;
                if canonical.number != entry.number {
                    snapshot.remove(&entry.number);
                }
                snapshot.insert(
                    canonical.number.clone(),
                    MirroredEntry::synced(canonical.clone()),
                );
                self.commit(&snapshot).await?;
                tracing::info!(number = %canonical.number, "tracking entry synced");
                Ok(UpsertOutcome::Synced(canonical))
            }
            RemoteOutcome::Conflict(reason) => {
                tracing::warn!(number = %entry.number, %reason, "remote conflict, entry kept unsynced");
                Ok(UpsertOutcome::Conflict { entry, reason })
            }
            other => {
                let reason = other.to_string();
                tracing::warn!(number = %entry.number, %reason, "remote upsert failed, entry kept unsynced");
                Ok(UpsertOutcome::StoredLocally { entry, reason })
            }
        }
    }

    /// Removes an entry locally, then remotely. A failed remote delete puts
    /// the entry back exactly as it was.
    pub async fn delete(&self, raw_number: &str) -> Result<DeleteOutcome, AppError> {
        let number = TrackingNumber::parse(raw_number)
            .map_err(|_| AppError::validation("Select a tracking number first"))?;
        let previous = self
            .mirror
            .get(&number)
            .await
            .ok_or_else(|| AppError::validation("Select a tracking number first"))?;

        let snapshot = self.mirror.remove(&number).await?;
        self.view.render(&snapshot);

        match self.gateway.delete(&number).await {
            RemoteOutcome::Data(()) | RemoteOutcome::NotFound => {
                tracing::info!(number = %number, "tracking entry deleted");
                Ok(DeleteOutcome::Deleted(number))
            }
            other => {
                let reason = other.to_string();
                tracing::warn!(number = %number, %reason, "remote delete failed, restoring entry");
                let snapshot = self.mirror.set(previous.clone()).await?;
                self.view.render(&snapshot);
                Ok(DeleteOutcome::RolledBack {
                    entry: previous.entry,
                    reason,
                })
            }
        }
    }

    /// Deletes every mirrored entry remotely, then clears the mirror no
    /// matter how many of those deletes failed.
    pub async fn reset_all(&self) -> Result<ResetReport, AppError> {
        let numbers: Vec<TrackingNumber> = self.mirror.load().await.into_keys().collect();
        let mut report = ResetReport {
            attempted: numbers.len(),
            failed: Vec::new(),
        };

        for number in numbers {
            match self.gateway.delete(&number).await {
                RemoteOutcome::Data(()) | RemoteOutcome::NotFound => {}
                other => {
                    tracing::warn!(number = %number, reason = %other, "remote delete failed during reset");
                    report.failed.push(number);
                }
            }
        }

        let snapshot = self.mirror.clear().await?;
        self.view.render(&snapshot);
        tracing::info!(
            attempted = report.attempted,
            failed = report.failed.len(),
            "tracking data reset"
        );
        Ok(report)
    }

    async fn commit(&self, snapshot: &MirrorSnapshot) -> Result<(), AppError> {
        self.mirror.save(snapshot).await?;
        self.view.render(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::SyncEngine;
    use crate::test_support::{entry, memory_mirror, number, FakeGateway, MockGateway, RecordingView};
    use sl_core::{TimelineEvent, TrackingStatus};

    fn coordinator(
        gateway: Arc<dyn TrackingGateway>,
        mirror: MirrorStore,
    ) -> (WriteCoordinator, Arc<RecordingView>) {
        let view = RecordingView::new();
        (WriteCoordinator::new(gateway, mirror, view.clone()), view)
    }

    fn draft(number: &str) -> TrackingDraft {
        TrackingDraft {
            number: number.into(),
            status: TrackingStatus::InTransit,
            origin: " Boston, MA ".into(),
            timeline: vec![TimelineEvent {
                date: "2024-01-10T08:30".into(),
                title: "Picked up".into(),
                active: true,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn empty_number_is_rejected_without_side_effects() {
        let mut gateway = MockGateway::new();
        gateway.expect_upsert().never();
        let mirror = memory_mirror();
        let (coordinator, view) = coordinator(Arc::new(gateway), mirror.clone());

        let err = coordinator.save_entry(draft("   ")).await.unwrap_err();

        assert_eq!(err.to_string(), "Tracking number required");
        assert!(mirror.load().await.is_empty());
        assert_eq!(view.render_count(), 0);
    }

    #[tokio::test]
    async fn successful_upsert_stores_canonical_copy_as_synced() {
        let gateway = FakeGateway::new();
        let mirror = memory_mirror();
        let (coordinator, view) = coordinator(gateway.clone(), mirror.clone());

        let outcome = coordinator.save_entry(draft("ab100")).await.unwrap();

        assert!(outcome.is_synced());
        assert_eq!(outcome.notice(), "Saved AB100");
        let stored = mirror.get(&number("AB100")).await.unwrap();
        assert!(!stored.unsynced);
        assert_eq!(stored.entry.origin.as_deref(), Some("Boston, MA"));
        assert_eq!(stored.entry.timeline[0].date, "2024-01-10 08:30");
        assert!(gateway.stored("AB100").is_some());
        // optimistic render, then the synced render
        assert_eq!(view.render_count(), 2);
    }

    #[tokio::test]
    async fn minimal_entry_gets_default_status_text() {
        let gateway = FakeGateway::new();
        let mirror = memory_mirror();
        let (coordinator, _) = coordinator(gateway, mirror.clone());

        coordinator
            .save_entry(TrackingDraft {
                number: "AB100".into(),
                status: TrackingStatus::Pending,
                ..Default::default()
            })
            .await
            .unwrap();

        let stored = mirror.get(&number("AB100")).await.unwrap();
        assert!(!stored.unsynced);
        assert_eq!(stored.entry.status_text.as_deref(), Some("Pending"));
    }

    #[tokio::test]
    async fn repeating_an_upsert_changes_nothing() {
        let gateway = FakeGateway::new();
        let mirror = memory_mirror();
        let (coordinator, _) = coordinator(gateway.clone(), mirror.clone());

        coordinator.save_entry(draft("AB100")).await.unwrap();
        let mirror_once = mirror.load().await;
        let remote_once = gateway.stored("AB100");

        coordinator.save_entry(draft("AB100")).await.unwrap();

        assert_eq!(mirror.load().await, mirror_once);
        assert_eq!(gateway.stored("AB100"), remote_once);
        assert_eq!(gateway.stored_numbers(), vec!["AB100"]);
    }

    #[tokio::test]
    async fn offline_upsert_keeps_entry_unsynced() {
        let gateway = FakeGateway::new();
        gateway.set_offline(true);
        let mirror = memory_mirror();
        let (coordinator, view) = coordinator(gateway, mirror.clone());

        let outcome = coordinator.save_entry(draft("AB200")).await.unwrap();

        match &outcome {
            UpsertOutcome::StoredLocally { reason, .. } => assert!(reason.contains("unreachable")),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(outcome.notice().contains("locally only"));
        assert!(mirror.get(&number("AB200")).await.unwrap().unsynced);
        assert_eq!(view.last_numbers(), vec!["AB200"]);
    }

    #[tokio::test]
    async fn conflict_is_reported_distinctly() {
        let gateway = FakeGateway::new();
        gateway.conflict_on("AB300");
        let mirror = memory_mirror();
        let (coordinator, _) = coordinator(gateway, mirror.clone());

        let outcome = coordinator.save_entry(draft("AB300")).await.unwrap();

        assert!(matches!(outcome, UpsertOutcome::Conflict { .. }));
        assert!(mirror.get(&number("AB300")).await.unwrap().unsynced);
    }

    #[tokio::test]
    async fn unsynced_write_survives_a_refresh_that_omits_it() {
        let gateway = FakeGateway::with_entries(vec![entry("AB100", TrackingStatus::Pending)]);
        let mirror = memory_mirror();
        let (coordinator, _) = coordinator(gateway.clone(), mirror.clone());
        let engine = SyncEngine::new(gateway.clone(), mirror.clone(), RecordingView::new());

        gateway.set_offline(true);
        coordinator.save_entry(draft("AB200")).await.unwrap();
        gateway.set_offline(false);

        engine.refresh().await.unwrap();

        let snapshot = mirror.load().await;
        assert!(snapshot[&number("AB200")].unsynced);
        assert!(!snapshot[&number("AB100")].unsynced);
    }

    #[tokio::test]
    async fn delete_removes_locally_and_remotely() {
        let gateway = FakeGateway::with_entries(vec![entry("AB100", TrackingStatus::Pending)]);
        let mirror = memory_mirror();
        mirror
            .set(MirroredEntry::synced(entry("AB100", TrackingStatus::Pending)))
            .await
            .unwrap();
        let (coordinator, view) = coordinator(gateway.clone(), mirror.clone());

        let outcome = coordinator.delete("ab100").await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted(number("AB100")));
        assert!(mirror.load().await.is_empty());
        assert!(gateway.stored("AB100").is_none());
        assert_eq!(view.render_count(), 1);
    }

    #[tokio::test]
    async fn remote_not_found_counts_as_deleted() {
        let mirror = memory_mirror();
        mirror
            .set(MirroredEntry::pending(entry("AB100", TrackingStatus::Pending)))
            .await
            .unwrap();
        let mut mock = MockGateway::new();
        mock.expect_delete()
            .times(1)
            .returning(|_| RemoteOutcome::NotFound);
        let (coordinator, _) = coordinator(Arc::new(mock), mirror.clone());

        let outcome = coordinator.delete("AB100").await.unwrap();

        assert!(matches!(outcome, DeleteOutcome::Deleted(_)));
        assert!(mirror.load().await.is_empty());
    }

    #[tokio::test]
    async fn failed_delete_restores_previous_entry() {
        let gateway = FakeGateway::with_entries(vec![entry("AB100", TrackingStatus::Pending)]);
        gateway.set_offline(true);
        let mirror = memory_mirror();
        let original = MirroredEntry::pending(entry("AB100", TrackingStatus::InTransit));
        mirror.set(original.clone()).await.unwrap();
        let (coordinator, view) = coordinator(gateway, mirror.clone());

        let outcome = coordinator.delete("AB100").await.unwrap();

        assert!(matches!(outcome, DeleteOutcome::RolledBack { .. }));
        assert!(outcome.notice().contains("reverted"));
        assert_eq!(mirror.get(&number("AB100")).await, Some(original));
        // removal render, then the restore render
        assert_eq!(view.render_count(), 2);
        assert_eq!(view.last_numbers(), vec!["AB100"]);
    }

    #[tokio::test]
    async fn delete_requires_a_mirrored_entry() {
        let mut gateway = MockGateway::new();
        gateway.expect_delete().never();
        let (coordinator, _) = coordinator(Arc::new(gateway), memory_mirror());

        let err = coordinator.delete("AB404").await.unwrap_err();
        assert_eq!(err.to_string(), "Select a tracking number first");

        let err = coordinator.delete("  ").await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn reset_clears_mirror_even_when_deletes_fail() {
        let gateway = FakeGateway::with_entries(vec![
            entry("AB100", TrackingStatus::Pending),
            entry("AB200", TrackingStatus::Pending),
        ]);
        gateway.fail_delete_of("AB200");
        let mirror = memory_mirror();
        for raw in ["AB100", "AB200"] {
            mirror
                .set(MirroredEntry::synced(entry(raw, TrackingStatus::Pending)))
                .await
                .unwrap();
        }
        let (coordinator, view) = coordinator(gateway.clone(), mirror.clone());

        let report = coordinator.reset_all().await.unwrap();

        assert_eq!(report.attempted, 2);
        assert_eq!(report.failed, vec![number("AB200")]);
        assert!(!report.is_complete());
        assert!(mirror.load().await.is_empty());
        assert_eq!(gateway.stored_numbers(), vec!["AB200"]);
        assert!(view.last_numbers().is_empty());
    }
}
