use crate::application::ports::MirrorBackend;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sl_core::db::{self, DbPool};

/// One row per storage key. `revision` is bumped on every write so pollers
/// in other processes can tell the payload changed.
#[derive(Clone)]
pub struct SqliteMirrorBackend {
    pool: DbPool,
}

impl SqliteMirrorBackend {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = db::connect(database_url)
            .await
            .map_err(|err| AppError::Storage(err.to_string()))?;
        let backend = Self::new(pool);
        backend.migrate().await?;
        Ok(backend)
    }

    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl MirrorBackend for SqliteMirrorBackend {
    async fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        let payload = sqlx::query_scalar::<_, String>(
            "SELECT payload FROM mirror_snapshots WHERE storage_key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(payload)
    }

    async fn write(&self, key: &str, serialized: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO mirror_snapshots (storage_key, payload, revision, updated_at)
            VALUES (?1, ?2, 1, ?3)
            ON CONFLICT(storage_key) DO UPDATE SET
                payload = excluded.payload,
                revision = mirror_snapshots.revision + 1,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(serialized)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn revision(&self, key: &str) -> Result<Option<String>, AppError> {
        let revision = sqlx::query_scalar::<_, i64>(
            "SELECT revision FROM mirror_snapshots WHERE storage_key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(revision.map(|value| value.to_string()))
    }
}
