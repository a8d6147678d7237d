//! Runtime configuration.
//!
//! Built once at the composition root and passed to constructors. Sources,
//! later ones overriding earlier:
//! - Defaults
//! - A JSON file
//! - Environment variables prefixed with `TTR_`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use ttr_engine::MatchMode;

use crate::error::RuntimeError;

pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 50;

/// Which result-store adapter to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local, lost on exit. For tests and offline demos.
    Memory,
    #[default]
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Root for match sessions and the result store.
    pub data_dir: PathBuf,
    /// Events between checkpoints; 0 disables checkpoints.
    pub checkpoint_interval: u64,
    pub store: StoreBackend,
    /// Match length used when a new match names none.
    pub default_mode: MatchMode,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("ttr_data"),
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            store: StoreBackend::File,
            default_mode: MatchMode::BestOf5,
        }
    }
}

impl RuntimeConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(RuntimeError::io(path))?;
        serde_json::from_str(&content)
            .map_err(|e| RuntimeError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Apply `TTR_*` overrides from the process environment:
    /// - `TTR_DATA_DIR`
    /// - `TTR_CHECKPOINT_INTERVAL`
    /// - `TTR_STORE` (`memory` or `file`)
    /// - `TTR_MODE` (`quick`, `best_of_3`, `best_of_5`, `best_of_7`)
    pub fn with_env_overrides(self) -> Result<Self, RuntimeError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Same as `with_env_overrides` with an explicit variable source.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, RuntimeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("TTR_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(interval) = lookup("TTR_CHECKPOINT_INTERVAL") {
            self.checkpoint_interval = interval.trim().parse().map_err(|e| {
                RuntimeError::Config(format!("Invalid TTR_CHECKPOINT_INTERVAL: {}", e))
            })?;
        }
        if let Some(store) = lookup("TTR_STORE") {
            self.store = match store.trim().to_ascii_lowercase().as_str() {
                "memory" => StoreBackend::Memory,
                "file" => StoreBackend::File,
                other => {
                    return Err(RuntimeError::Config(format!(
                        "Invalid TTR_STORE {:?}: expected memory or file",
                        other
                    )))
                }
            };
        }
        if let Some(mode) = lookup("TTR_MODE") {
            self.default_mode = mode
                .parse()
                .map_err(|e| RuntimeError::Config(format!("Invalid TTR_MODE: {}", e)))?;
        }
        Ok(self)
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("store.log")
    }
}
