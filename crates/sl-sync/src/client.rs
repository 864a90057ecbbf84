//! Wires the sync layer together for one running client.

use crate::application::ports::{ListingView, MirrorBackend, TrackingGateway};
use crate::application::services::{
    spawn_mirror_follower, AdminGate, AdminPanel, ContactDesk, LookupResolver, LookupSession,
    MirrorChannel, MirrorStore, RefreshReport, SyncEngine, WriteCoordinator,
};
use crate::infrastructure::gateway::HttpTrackingGateway;
use crate::infrastructure::mirror::{
    spawn_revision_watcher, JsonFileMirrorBackend, MemoryMirrorBackend, SqliteMirrorBackend,
};
use crate::shared::config::{ClientConfig, MirrorLocation};
use crate::shared::error::AppError;
use sl_core::{ContactInfo, SampleCatalog};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// What opening an admin panel produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelOpened {
    Tracking(RefreshReport),
    Contact(ContactInfo),
}

/// Background loops started by [`TrackingClient::start`]. Dropping this
/// stops them.
pub struct BackgroundTasks {
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn shutdown(mut self) {
        self.abort_all();
    }

    fn abort_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for BackgroundTasks {
    fn drop(&mut self) {
        self.abort_all();
    }
}

pub struct TrackingClient {
    pub mirror: MirrorStore,
    pub sync: Arc<SyncEngine>,
    pub writes: WriteCoordinator,
    pub resolver: Arc<LookupResolver>,
    pub lookup: LookupSession,
    pub contact: ContactDesk,
    view: Arc<dyn ListingView>,
    gate: AdminGate,
    config: ClientConfig,
}

impl TrackingClient {
    /// Builds the HTTP gateway and the configured mirror backend.
    pub async fn connect(config: ClientConfig, view: Arc<dyn ListingView>) -> Result<Self, AppError> {
        config.validate()?;
        let gateway = Arc::new(HttpTrackingGateway::new(&config.api_base, config.http_timeout)?);
        let backend: Arc<dyn MirrorBackend> = match &config.mirror {
            MirrorLocation::Sqlite(url) => Arc::new(SqliteMirrorBackend::connect(url).await?),
            MirrorLocation::JsonDir(dir) => Arc::new(JsonFileMirrorBackend::new(dir.clone())),
            MirrorLocation::Memory => Arc::new(MemoryMirrorBackend::new()),
        };
        tracing::info!(api = %config.api_base, mirror = ?config.mirror, "tracking client configured");
        Ok(Self::from_parts(config, gateway, backend, view))
    }

    pub fn from_parts(
        config: ClientConfig,
        gateway: Arc<dyn TrackingGateway>,
        backend: Arc<dyn MirrorBackend>,
        view: Arc<dyn ListingView>,
    ) -> Self {
        let mirror = MirrorStore::new(backend, MirrorChannel::new());
        let sync = Arc::new(SyncEngine::new(
            Arc::clone(&gateway),
            mirror.clone(),
            Arc::clone(&view),
        ));
        let writes = WriteCoordinator::new(Arc::clone(&gateway), mirror.clone(), Arc::clone(&view));
        let resolver = Arc::new(LookupResolver::new(
            Arc::clone(&gateway),
            SampleCatalog::builtin(),
            mirror.clone(),
        ));
        let lookup = LookupSession::new(Arc::clone(&resolver), config.loading);
        let contact = ContactDesk::new(gateway);
        let gate = AdminGate::new(config.admin_passphrase.clone());

        Self {
            mirror,
            sync,
            writes,
            resolver,
            lookup,
            contact,
            view,
            gate,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Runs the startup refresh and launches the periodic refresh, the
    /// revision watcher and the mirror follower.
    pub async fn start(&self) -> Result<BackgroundTasks, AppError> {
        let report = self.sync.refresh().await?;
        if let RefreshReport::Skipped { .. } = report {
            let snapshot = self.mirror.load().await;
            self.view.render(&snapshot);
        }

        let mut handles = vec![
            spawn_revision_watcher(self.mirror.clone(), self.config.mirror_poll),
            spawn_mirror_follower(self.mirror.clone(), Arc::clone(&self.view)),
        ];
        if let Some(interval) = self.config.refresh_interval {
            handles.push(self.sync.spawn_periodic_refresh(interval));
        }
        Ok(BackgroundTasks { handles })
    }

    /// Checks the passphrase, then prepares the requested panel: the
    /// tracking panel refreshes from the remote, the contact panel loads the
    /// stored details.
    pub async fn open_admin(&self, panel: AdminPanel, attempt: &str) -> Result<PanelOpened, AppError> {
        let mut unlocked = None;
        self.gate.unlock(panel, attempt, |panel| unlocked = Some(panel))?;

        match unlocked {
            Some(AdminPanel::Tracking) => Ok(PanelOpened::Tracking(self.sync.refresh().await?)),
            Some(AdminPanel::Contact) => Ok(PanelOpened::Contact(self.contact.load().await)),
            None => Err(AppError::Internal("admin gate did not open a panel".to_string())),
        }
    }
}
