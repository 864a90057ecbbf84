//! Hand-rolled doubles shared by the service tests.

use crate::application::ports::{ListingView, LoadingProgress, ProgressSink, TrackingGateway};
use crate::application::services::{MirrorChannel, MirrorStore};
use crate::domain::{MirrorSnapshot, RemoteOutcome};
use crate::infrastructure::mirror::MemoryMirrorBackend;
use async_trait::async_trait;
use sl_core::{ContactInfo, TrackingEntry, TrackingNumber, TrackingStatus};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) fn number(raw: &str) -> TrackingNumber {
    TrackingNumber::parse(raw).unwrap()
}

pub(crate) fn entry(raw: &str, status: TrackingStatus) -> TrackingEntry {
    TrackingEntry::new(number(raw), status).normalized()
}

pub(crate) fn memory_mirror() -> MirrorStore {
    MirrorStore::new(Arc::new(MemoryMirrorBackend::new()), MirrorChannel::new())
}

/// Remote store held in memory. Can be switched offline, and individual
/// numbers can be made to fail deletes or conflict on upsert.
#[derive(Default)]
pub(crate) struct FakeGateway {
    entries: Mutex<BTreeMap<TrackingNumber, TrackingEntry>>,
    contact: Mutex<ContactInfo>,
    offline: AtomicBool,
    failing_deletes: Mutex<HashSet<TrackingNumber>>,
    conflicting: Mutex<HashSet<TrackingNumber>>,
    calls: Mutex<Vec<String>>,
    list_delay: Mutex<Option<Duration>>,
}

impl FakeGateway {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_entries(entries: Vec<TrackingEntry>) -> Arc<Self> {
        let gateway = Self::default();
        {
            let mut stored = gateway.entries.lock().unwrap();
            for entry in entries {
                stored.insert(entry.number.clone(), entry);
            }
        }
        Arc::new(gateway)
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes `list_all` wait this long before answering.
    pub(crate) fn delay_list_all(&self, delay: Option<Duration>) {
        *self.list_delay.lock().unwrap() = delay;
    }

    pub(crate) fn fail_delete_of(&self, raw: &str) {
        self.failing_deletes.lock().unwrap().insert(number(raw));
    }

    pub(crate) fn conflict_on(&self, raw: &str) {
        self.conflicting.lock().unwrap().insert(number(raw));
    }

    pub(crate) fn insert(&self, entry: TrackingEntry) {
        self.entries.lock().unwrap().insert(entry.number.clone(), entry);
    }

    pub(crate) fn remove(&self, raw: &str) {
        self.entries.lock().unwrap().remove(&number(raw));
    }

    pub(crate) fn stored(&self, raw: &str) -> Option<TrackingEntry> {
        self.entries.lock().unwrap().get(&number(raw)).cloned()
    }

    pub(crate) fn stored_numbers(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .keys()
            .map(|number| number.to_string())
            .collect()
    }

    pub(crate) fn contact(&self) -> ContactInfo {
        self.contact.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> bool {
        self.calls.lock().unwrap().push(call);
        !self.offline.load(Ordering::SeqCst)
    }
}

fn offline<T>() -> RemoteOutcome<T> {
    RemoteOutcome::Unreachable("connection refused".to_string())
}

#[async_trait]
impl TrackingGateway for FakeGateway {
    async fn list_all(&self) -> RemoteOutcome<Vec<TrackingEntry>> {
        if !self.record("list_all".into()) {
            return offline();
        }
        let delay = *self.list_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        RemoteOutcome::Data(self.entries.lock().unwrap().values().cloned().collect())
    }

    async fn get_one(&self, number: &TrackingNumber) -> RemoteOutcome<TrackingEntry> {
        if !self.record(format!("get_one {number}")) {
            return offline();
        }
        match self.entries.lock().unwrap().get(number) {
            Some(entry) => RemoteOutcome::Data(entry.clone()),
            None => RemoteOutcome::NotFound,
        }
    }

    async fn upsert(&self, entry: &TrackingEntry) -> RemoteOutcome<TrackingEntry> {
        if !self.record(format!("upsert {}", entry.number)) {
            return offline();
        }
        if self.conflicting.lock().unwrap().contains(&entry.number) {
            return RemoteOutcome::Conflict("Duplicate number".to_string());
        }
        let stored = entry.clone().normalized();
        self.insert(stored.clone());
        RemoteOutcome::Data(stored)
    }

    async fn delete(&self, number: &TrackingNumber) -> RemoteOutcome<()> {
        if !self.record(format!("delete {number}")) {
            return offline();
        }
        if self.failing_deletes.lock().unwrap().contains(number) {
            return RemoteOutcome::Unreachable("HTTP 500".to_string());
        }
        self.entries.lock().unwrap().remove(number);
        RemoteOutcome::Data(())
    }

    async fn get_contact(&self) -> RemoteOutcome<ContactInfo> {
        if !self.record("get_contact".into()) {
            return offline();
        }
        RemoteOutcome::Data(self.contact())
    }

    async fn save_contact(&self, info: &ContactInfo) -> RemoteOutcome<ContactInfo> {
        if !self.record("save_contact".into()) {
            return offline();
        }
        *self.contact.lock().unwrap() = info.clone();
        RemoteOutcome::Data(info.clone())
    }
}

/// Records every render and progress update it is handed.
#[derive(Default)]
pub(crate) struct RecordingView {
    renders: Mutex<Vec<MirrorSnapshot>>,
    progress: Mutex<Vec<LoadingProgress>>,
}

impl RecordingView {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn render_count(&self) -> usize {
        self.renders.lock().unwrap().len()
    }

    pub(crate) fn last_numbers(&self) -> Vec<String> {
        self.renders
            .lock()
            .unwrap()
            .last()
            .map(|snapshot| snapshot.keys().map(|number| number.to_string()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn progress(&self) -> Vec<LoadingProgress> {
        self.progress.lock().unwrap().clone()
    }
}

impl ListingView for RecordingView {
    fn render(&self, snapshot: &MirrorSnapshot) {
        self.renders.lock().unwrap().push(snapshot.clone());
    }
}

impl ProgressSink for RecordingView {
    fn progress(&self, update: &LoadingProgress) {
        self.progress.lock().unwrap().push(*update);
    }
}

mockall::mock! {
    pub(crate) Gateway {}

    #[async_trait]
    impl TrackingGateway for Gateway {
        async fn list_all(&self) -> RemoteOutcome<Vec<TrackingEntry>>;
        async fn get_one(&self, number: &TrackingNumber) -> RemoteOutcome<TrackingEntry>;
        async fn upsert(&self, entry: &TrackingEntry) -> RemoteOutcome<TrackingEntry>;
        async fn delete(&self, number: &TrackingNumber) -> RemoteOutcome<()>;
        async fn get_contact(&self) -> RemoteOutcome<ContactInfo>;
        async fn save_contact(&self, info: &ContactInfo) -> RemoteOutcome<ContactInfo>;
    }
}
