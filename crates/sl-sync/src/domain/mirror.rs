//! Shapes persisted by the local mirror and the change notices exchanged
//! between contexts that share it.

use serde::{Deserialize, Serialize};
use sl_core::{TrackingEntry, TrackingNumber};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Storage key of the serialized mirror. Bumping the suffix orphans old data.
pub const STORAGE_KEY: &str = "trackingCache_v2";

/// A tracking entry as held in the mirror, plus whether the remote store is
/// known to have accepted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirroredEntry {
    #[serde(flatten)]
    pub entry: TrackingEntry,
    #[serde(rename = "_unsynced", default, skip_serializing_if = "is_false")]
    pub unsynced: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl MirroredEntry {
    pub fn synced(entry: TrackingEntry) -> Self {
        Self {
            entry,
            unsynced: false,
        }
    }

    pub fn pending(entry: TrackingEntry) -> Self {
        Self {
            entry,
            unsynced: true,
        }
    }

    pub fn number(&self) -> &TrackingNumber {
        &self.entry.number
    }
}

/// Full mirror contents keyed by normalized tracking number.
pub type MirrorSnapshot = BTreeMap<TrackingNumber, MirroredEntry>;

/// Identifies one execution context (one running client) sharing a mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(Uuid);

impl ContextId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Origin used for changes detected on disk, written by another process.
    pub fn external() -> Self {
        Self(Uuid::nil())
    }

    pub fn is_external(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_external() {
            f.write_str("external")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Published after every persisted mirror write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorChanged {
    pub storage_key: String,
    pub origin: ContextId,
}
