use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::artifacts::{ArtifactStore, DATA_DIR_ENV};
use crate::assistant::{API_KEY_ENV, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use crate::predictor::{DEFAULT_MIN_SYMPTOMS, DEFAULT_TOP_K};
use crate::runtime::RuntimeConfig;

/// Environment variable overriding the Gemini model name.
pub const MODEL_ENV: &str = "GEMINI_MODEL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Process-wide settings, resolved once at startup.
///
/// Layering: defaults, then an optional JSON file, then environment, then
/// command-line overrides. The API key only ever comes from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub data_dir: Option<PathBuf>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub request_timeout_secs: u64,
    pub top_k: usize,
    pub min_symptoms: usize,
    pub intra_threads: usize,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            request_timeout_secs: 30,
            top_k: DEFAULT_TOP_K,
            min_symptoms: DEFAULT_MIN_SYMPTOMS,
            intra_threads: 0,
            api_key: None,
        }
    }
}

impl AppConfig {
    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config: Self =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Applies environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(dir) = non_empty(DATA_DIR_ENV) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(model) = non_empty(MODEL_ENV) {
            self.gemini_model = model;
        }
        self.api_key = non_empty(API_KEY_ENV).map(|k| k.trim().to_string());
        self
    }

    /// Applies the process environment.
    pub fn with_process_env(self) -> Self {
        self.apply_env(|key| std::env::var(key).ok())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::Invalid("top_k must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be at least 1".into()));
        }
        if self.gemini_model.trim().is_empty() {
            return Err(ConfigError::Invalid("gemini_model cannot be empty".into()));
        }
        Ok(())
    }

    /// The artifact store for the configured (or default) data directory.
    pub fn artifact_store(&self) -> ArtifactStore {
        match &self.data_dir {
            Some(dir) => ArtifactStore::new(dir),
            None => ArtifactStore::new_default(),
        }
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig::with_intra_threads(self.intra_threads)
    }
}
