pub mod admin_gate;
pub mod contact_desk;
pub mod lookup_resolver;
pub mod lookup_session;
pub mod mirror_channel;
pub mod mirror_follower;
pub mod mirror_store;
pub mod sync_engine;
pub mod write_coordinator;

pub use admin_gate::{AdminGate, AdminPanel};
pub use contact_desk::{ContactDesk, ContactSaveOutcome};
pub use lookup_resolver::{LookupResolver, LookupResult, LookupSource};
pub use lookup_session::{LoadingPacing, LookupAttempt, LookupSession, LOADING_MESSAGES};
pub use mirror_channel::{MirrorChannel, MirrorSubscription};
pub use mirror_follower::spawn_mirror_follower;
pub use mirror_store::MirrorStore;
pub use sync_engine::{RefreshReport, SyncEngine, SyncStatus};
pub use write_coordinator::{DeleteOutcome, ResetReport, UpsertOutcome, WriteCoordinator};
