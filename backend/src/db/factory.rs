//! Repository factory for dependency injection.
//!
//! Creates repository instances from runtime configuration.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use log::info;

use super::repo_config::RepositorySettings;
use super::repositories::{FileRepository, LocalRepository};
use super::repository::{RepositoryError, RepositoryResult, TimetableRepository};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory local repository
    Local,
    /// JSON files in a data directory
    File,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string ("local", "memory", "file", "json").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            "file" | "json" => Ok(Self::File),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from the `REPOSITORY_TYPE` environment variable.
    ///
    /// Defaults to File if `TIMETABLE_DATA_DIR` is set, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("TIMETABLE_DATA_DIR").is_ok() {
            Self::File
        } else {
            Self::Local
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```
/// use timetable_rust::db::{RepositoryFactory, RepositoryType};
///
/// let repo = RepositoryFactory::create(RepositoryType::Local, None).unwrap();
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// `data_dir` is required for [`RepositoryType::File`].
    pub fn create(
        repo_type: RepositoryType,
        data_dir: Option<&Path>,
    ) -> RepositoryResult<Arc<dyn TimetableRepository>> {
        match repo_type {
            RepositoryType::Local => Ok(Self::create_local()),
            RepositoryType::File => {
                let dir = data_dir.ok_or_else(|| {
                    RepositoryError::configuration("File repository requires a data directory")
                })?;
                let repo = Self::create_file(dir)?;
                Ok(repo as Arc<dyn TimetableRepository>)
            }
        }
    }

    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn TimetableRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create a file repository rooted at `data_dir`.
    pub fn create_file(data_dir: &Path) -> RepositoryResult<Arc<FileRepository>> {
        info!("Using file repository at {}", data_dir.display());
        Ok(Arc::new(FileRepository::new(data_dir)?))
    }

    /// Create repository from environment configuration.
    pub fn from_env() -> RepositoryResult<Arc<dyn TimetableRepository>> {
        let mut settings = RepositorySettings::default();
        settings.apply_env();
        Self::create(RepositoryType::from_env(), Some(settings.data_dir.as_path()))
    }

    /// Create repository from the `[repository]` settings.
    pub fn from_settings(
        settings: &RepositorySettings,
    ) -> RepositoryResult<Arc<dyn TimetableRepository>> {
        let repo_type = settings.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;
        Self::create(repo_type, Some(settings.data_dir.as_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_type_from_str() {
        assert_eq!(
            RepositoryType::from_str("local").unwrap(),
            RepositoryType::Local
        );
        assert_eq!(
            RepositoryType::from_str("File").unwrap(),
            RepositoryType::File
        );
        assert_eq!(
            RepositoryType::from_str("json").unwrap(),
            RepositoryType::File
        );
        assert!(RepositoryType::from_str("postgres").is_err());
    }

    #[tokio::test]
    async fn test_create_local_repository() {
        let repo = RepositoryFactory::create_local();
        assert!(repo.health_check().await.unwrap());
    }

    #[test]
    fn test_file_repository_requires_dir() {
        assert!(RepositoryFactory::create(RepositoryType::File, None).is_err());
    }

    #[tokio::test]
    async fn test_from_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = RepositorySettings {
            repo_type: "file".to_string(),
            data_dir: dir.path().to_path_buf(),
        };
        let repo = RepositoryFactory::from_settings(&settings).unwrap();
        assert!(repo.health_check().await.unwrap());
    }
}
