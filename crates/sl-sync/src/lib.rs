//! Cache-mirrored access to the tracking store: optimistic admin writes, a
//! local mirror shared across clients, and lookups that keep working while
//! the remote store is down.

pub mod application;
pub mod client;
pub mod domain;
pub mod infrastructure;
pub mod shared;

#[cfg(test)]
pub(crate) mod test_support;

pub use application::ports::{
    ListingView, LoadingProgress, MirrorBackend, NoopView, ProgressSink, TrackingGateway,
};
pub use application::services::{
    AdminGate, AdminPanel, ContactDesk, ContactSaveOutcome, DeleteOutcome, LoadingPacing,
    LookupAttempt, LookupResolver, LookupResult, LookupSession, LookupSource, MirrorChannel,
    MirrorStore, RefreshReport, ResetReport, SyncEngine, UpsertOutcome, WriteCoordinator,
};
pub use client::{BackgroundTasks, PanelOpened, TrackingClient};
pub use domain::{MirrorSnapshot, MirroredEntry, RemoteOutcome, STORAGE_KEY};
pub use shared::config::load_client_config;
pub use shared::{AppError, ClientConfig, MirrorLocation};
