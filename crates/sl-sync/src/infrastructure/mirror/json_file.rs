use crate::application::ports::MirrorBackend;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Stores each key as `<dir>/<key>.json`, replaced atomically on write.
#[derive(Debug, Clone)]
pub struct JsonFileMirrorBackend {
    dir: PathBuf,
}

impl JsonFileMirrorBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    async fn read_optional(path: &Path) -> Result<Option<String>, AppError> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl MirrorBackend for JsonFileMirrorBackend {
    async fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        Self::read_optional(&self.path_for(key)).await
    }

    async fn write(&self, key: &str, serialized: &str) -> Result<(), AppError> {
        let dir = self.dir.clone();
        let path = self.path_for(key);
        let payload = serialized.to_owned();

        tokio::task::spawn_blocking(move || -> Result<(), AppError> {
            std::fs::create_dir_all(&dir)?;
            let mut file = NamedTempFile::new_in(&dir)?;
            file.write_all(payload.as_bytes())?;
            file.flush()?;
            file.persist(&path).map_err(|err| AppError::from(err.error))?;
            Ok(())
        })
        .await?
    }

    // Content hash rather than mtime: two writes inside one timestamp tick
    // would otherwise look identical.
    async fn revision(&self, key: &str) -> Result<Option<String>, AppError> {
        let contents = Self::read_optional(&self.path_for(key)).await?;
        Ok(contents.map(|contents| {
            let mut hasher = DefaultHasher::new();
            contents.hash(&mut hasher);
            format!("{:016x}", hasher.finish())
        }))
    }
}
