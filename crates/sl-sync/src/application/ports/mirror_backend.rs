use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable key/value slot holding the serialized mirror.
///
/// Backends store opaque strings; parsing stays with the mirror store so a
/// corrupt payload can be treated as empty instead of failing the read.
#[async_trait]
pub trait MirrorBackend: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn write(&self, key: &str, serialized: &str) -> Result<(), AppError>;
    /// Opaque token that changes whenever the stored payload changes,
    /// including writes made by other processes.
    async fn revision(&self, key: &str) -> Result<Option<String>, AppError>;
}
