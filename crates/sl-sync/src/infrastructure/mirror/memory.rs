use crate::application::ports::MirrorBackend;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local backend; nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryMirrorBackend {
    slots: Arc<RwLock<HashMap<String, (String, u64)>>>,
}

impl MemoryMirrorBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MirrorBackend for MemoryMirrorBackend {
    async fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        let slots = self.slots.read().await;
        Ok(slots.get(key).map(|(payload, _)| payload.clone()))
    }

    async fn write(&self, key: &str, serialized: &str) -> Result<(), AppError> {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(key.to_string()).or_insert_with(|| (String::new(), 0));
        slot.0 = serialized.to_string();
        slot.1 += 1;
        Ok(())
    }

    async fn revision(&self, key: &str) -> Result<Option<String>, AppError> {
        let slots = self.slots.read().await;
        Ok(slots.get(key).map(|(_, revision)| revision.to_string()))
    }
}
