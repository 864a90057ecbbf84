use crate::application::ports::TrackingGateway;
use crate::application::services::MirrorStore;
use crate::domain::RemoteOutcome;
use sl_core::{SampleCatalog, TrackingEntry, TrackingNumber};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Remote,
    Sample,
    Mirror,
}

impl fmt::Display for LookupSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LookupSource::Remote => "remote",
            LookupSource::Sample => "sample",
            LookupSource::Mirror => "mirror",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Found {
        entry: TrackingEntry,
        source: LookupSource,
    },
    /// `remote_unreachable` tells "no such number" apart from "could not
    /// ask the remote store and nothing local matched".
    NotFound { remote_unreachable: bool },
}

impl LookupResult {
    pub fn entry(&self) -> Option<&TrackingEntry> {
        match self {
            LookupResult::Found { entry, .. } => Some(entry),
            LookupResult::NotFound { .. } => None,
        }
    }

    pub fn not_found_message(&self) -> Option<&'static str> {
        match self {
            LookupResult::Found { .. } => None,
            LookupResult::NotFound {
                remote_unreachable: false,
            } => Some("Tracking number not found. Please check the number and try again."),
            LookupResult::NotFound {
                remote_unreachable: true,
            } => Some(
                "Tracking service is unreachable and no saved copy of this number exists. Please try again later.",
            ),
        }
    }
}

/// Resolves a public lookup: remote store, then built-in samples, then the
/// local mirror.
pub struct LookupResolver {
    gateway: Arc<dyn TrackingGateway>,
    samples: SampleCatalog,
    mirror: MirrorStore,
}

impl LookupResolver {
    pub fn new(
        gateway: Arc<dyn TrackingGateway>,
        samples: SampleCatalog,
        mirror: MirrorStore,
    ) -> Self {
        Self {
            gateway,
            samples,
            mirror,
        }
    }

    pub async fn resolve(&self, number: &TrackingNumber) -> LookupResult {
        let remote = self.gateway.get_one(number).await;
        let remote_unreachable = match remote {
            RemoteOutcome::Data(entry) => {
                return LookupResult::Found {
                    entry: entry.normalized(),
                    source: LookupSource::Remote,
                }
            }
            RemoteOutcome::NotFound => false,
            other => {
                tracing::debug!(number = %number, reason = %other, "remote lookup failed, falling back");
                true
            }
        };

        if let Some(sample) = self.samples.get(number) {
            return LookupResult::Found {
                entry: sample.clone(),
                source: LookupSource::Sample,
            };
        }

        match self.mirror.get(number).await {
            Some(local) => LookupResult::Found {
                entry: local.entry,
                source: LookupSource::Mirror,
            },
            None => LookupResult::NotFound { remote_unreachable },
        }
    }
}
