//! Repository configuration.
//!
//! The `[repository]` table of `timetable.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use super::factory::RepositoryType;

/// Repository settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default = "default_repo_type")]
    pub repo_type: String,
    /// Directory for the file repository.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_repo_type() -> String {
    "local".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: default_repo_type(),
            data_dir: default_data_dir(),
        }
    }
}

impl RepositorySettings {
    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repo_type)
    }

    /// Apply `REPOSITORY_TYPE` and `TIMETABLE_DATA_DIR` when set.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            self.repo_type = val;
        }
        if let Ok(val) = std::env::var("TIMETABLE_DATA_DIR") {
            self.data_dir = PathBuf::from(val);
        }
    }
}
