//! File-backed repository implementation.
//!
//! Each key is stored as `<data_dir>/<key>.json`. Writes go to a temporary
//! file first and are renamed into place so a crash never leaves a truncated
//! value behind.

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::db::repository::*;

/// Repository storing one JSON document per key in a directory.
#[derive(Debug, Clone)]
pub struct FileRepository {
    data_dir: PathBuf,
}

impl FileRepository {
    /// Open a repository rooted at `data_dir`, creating the directory if needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|e| {
            RepositoryError::configuration(format!(
                "Failed to create data directory {}: {}",
                data_dir.display(),
                e
            ))
        })?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, key: &str) -> RepositoryResult<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(RepositoryError::InternalError {
                message: "Invalid storage key".to_string(),
                context: ErrorContext::default().with_entity(key),
            });
        }
        Ok(self.data_dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl TimetableRepository for FileRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        match tokio::fs::metadata(&self.data_dir).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(_) => Ok(false),
        }
    }

    async fn get_value(&self, key: &str) -> RepositoryResult<Option<Value>> {
        let path = self.path_for(key)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(RepositoryError::storage_with_context(
                    e.to_string(),
                    ErrorContext::new("get_value")
                        .with_entity(key)
                        .with_details(path.display().to_string()),
                ))
            }
        };
        let value = serde_json::from_slice(&bytes).map_err(|e| {
            RepositoryError::serialization_with_context(
                e.to_string(),
                ErrorContext::new("get_value").with_entity(key),
            )
        })?;
        Ok(Some(value))
    }

    async fn put_value(&self, key: &str, value: Value) -> RepositoryResult<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(&value)?;

        let context = || {
            ErrorContext::new("put_value")
                .with_entity(key)
                .with_details(path.display().to_string())
        };
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| RepositoryError::storage_with_context(e.to_string(), context()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| RepositoryError::storage_with_context(e.to_string(), context()))?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}
