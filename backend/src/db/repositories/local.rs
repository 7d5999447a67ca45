//! In-memory local repository implementation.
//!
//! Suitable for unit tests and local development. Values live in a `HashMap`
//! behind an `RwLock` and are lost when the process exits.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::db::repository::*;

/// In-memory local repository.
///
/// # Example
/// ```
/// use timetable_rust::db::repositories::LocalRepository;
/// use timetable_rust::db::repository::TimetableRepository;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let repo = LocalRepository::new();
///     assert!(repo.load_staff().await.unwrap().is_empty());
/// });
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    values: HashMap<String, Value>,
    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unavailable store. While unhealthy every read and write fails.
    pub fn set_healthy(&self, healthy: bool) {
        if let Ok(mut data) = self.data.write() {
            data.is_healthy = healthy;
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.values.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn unavailable(operation: &str, key: &str) -> RepositoryError {
        RepositoryError::storage_with_context(
            "Local repository is marked unhealthy",
            ErrorContext::new(operation).with_entity(key),
        )
    }

    fn poisoned(operation: &str) -> RepositoryError {
        RepositoryError::InternalError {
            message: "Local repository lock poisoned".to_string(),
            context: ErrorContext::new(operation),
        }
    }
}

#[async_trait]
impl TimetableRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self.data.read().map_err(|_| Self::poisoned("health_check"))?;
        Ok(data.is_healthy)
    }

    async fn get_value(&self, key: &str) -> RepositoryResult<Option<Value>> {
        let data = self.data.read().map_err(|_| Self::poisoned("get_value"))?;
        if !data.is_healthy {
            return Err(Self::unavailable("get_value", key));
        }
        Ok(data.values.get(key).cloned())
    }

    async fn put_value(&self, key: &str, value: Value) -> RepositoryResult<()> {
        let mut data = self.data.write().map_err(|_| Self::poisoned("put_value"))?;
        if !data.is_healthy {
            return Err(Self::unavailable("put_value", key));
        }
        data.values.insert(key.to_string(), value);
        Ok(())
    }
}
