//! Application configuration file support.
//!
//! Settings are read from `timetable.toml` and then overridden by environment
//! variables. Every table is optional.
//!
//! ```toml
//! [repository]
//! type = "file"
//! data_dir = "data"
//!
//! [generator]
//! kind = "http"
//! endpoint = "http://localhost:8090/v1/timetables"
//! model = "timetable-generator"
//! api_key_env = "GENERATOR_API_KEY"
//! timeout_secs = 60
//!
//! [generation]
//! periods_per_day = 8
//! days_per_week = 5
//! breaks_per_day = 2
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::db::RepositorySettings;
use crate::engine::{ExternalScheduleGenerator, HttpScheduleGenerator, OfflineGenerator};
use crate::models::{
    GenerationParams, DEFAULT_BREAKS_PER_DAY, DEFAULT_DAYS_PER_WEEK, DEFAULT_PERIODS_PER_DAY,
};

/// Default generator timeout.
pub const DEFAULT_GENERATOR_TIMEOUT_SECS: u64 = 60;

const CONFIG_FILE_NAME: &str = "timetable.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub generator: GeneratorSettings,
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

/// Which generator to use and how to reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// `"http"` or `"offline"`.
    #[serde(default = "default_generator_kind")]
    pub kind: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the bearer key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_generator_kind() -> String {
    "offline".to_string()
}

fn default_model() -> String {
    "timetable-generator".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_GENERATOR_TIMEOUT_SECS
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            kind: default_generator_kind(),
            endpoint: None,
            model: default_model(),
            api_key_env: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GeneratorSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Build the configured generator.
    pub fn build(&self) -> Result<Arc<dyn ExternalScheduleGenerator>> {
        match self.kind.to_lowercase().as_str() {
            "offline" | "none" => Ok(Arc::new(OfflineGenerator)),
            "http" => {
                let endpoint = self
                    .endpoint
                    .as_deref()
                    .filter(|e| !e.trim().is_empty())
                    .context("generator.kind = \"http\" requires generator.endpoint")?;
                let api_key = self
                    .api_key_env
                    .as_deref()
                    .and_then(|var| std::env::var(var).ok())
                    .filter(|k| !k.is_empty());
                info!("Using HTTP generator at {}", endpoint);
                Ok(Arc::new(HttpScheduleGenerator::new(
                    endpoint,
                    self.model.clone(),
                    api_key,
                    self.timeout(),
                )))
            }
            other => bail!("Unknown generator kind: {}", other),
        }
    }
}

/// Defaults for generation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_periods_per_day")]
    pub periods_per_day: usize,
    #[serde(default = "default_days_per_week")]
    pub days_per_week: usize,
    #[serde(default = "default_breaks_per_day")]
    pub breaks_per_day: usize,
}

fn default_periods_per_day() -> usize {
    DEFAULT_PERIODS_PER_DAY
}

fn default_days_per_week() -> usize {
    DEFAULT_DAYS_PER_WEEK
}

fn default_breaks_per_day() -> usize {
    DEFAULT_BREAKS_PER_DAY
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            periods_per_day: DEFAULT_PERIODS_PER_DAY,
            days_per_week: DEFAULT_DAYS_PER_WEEK,
            breaks_per_day: DEFAULT_BREAKS_PER_DAY,
        }
    }
}

impl From<GenerationSettings> for GenerationParams {
    fn from(s: GenerationSettings) -> Self {
        GenerationParams {
            periods_per_day: s.periods_per_day,
            days_per_week: s.days_per_week,
            breaks_per_day: s.breaks_per_day,
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Find `timetable.toml` in the current directory, `backend/` or the parent.
    pub fn default_location() -> Option<PathBuf> {
        [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("backend").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ]
        .into_iter()
        .find(|p| p.exists())
    }

    /// Load from the default location (or defaults if none exists), then
    /// apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_location() {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                info!("No {} found, using defaults", CONFIG_FILE_NAME);
                Self::default()
            }
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `REPOSITORY_TYPE`, `TIMETABLE_DATA_DIR`, `GENERATOR_ENDPOINT`,
    /// `HOST` and `PORT`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.repository.apply_env();
        if let Ok(endpoint) = std::env::var("GENERATOR_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.generator.kind = "http".to_string();
                self.generator.endpoint = Some(endpoint);
            }
        }
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", port))?;
        }
        Ok(())
    }

    pub fn generation_params(&self) -> GenerationParams {
        self.generation.into()
    }
}
