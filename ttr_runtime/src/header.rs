//! Match header: everything needed to construct the engine a log replays
//! into. Written once when a session is created, never modified.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use ttr_engine::{MatchConfig, MatchEngine};

use crate::error::RuntimeError;

pub const HEADER_FILE: &str = "header.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchHeader {
    pub player1_label: String,
    pub player2_label: String,
    pub config: MatchConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<u64>,
}

impl MatchHeader {
    pub fn new(
        player1_label: impl Into<String>,
        player2_label: impl Into<String>,
        config: MatchConfig,
    ) -> Self {
        Self {
            player1_label: player1_label.into(),
            player2_label: player2_label.into(),
            config,
            tournament_id: None,
        }
    }

    pub fn with_tournament(mut self, tournament_id: u64) -> Self {
        self.tournament_id = Some(tournament_id);
        self
    }

    /// Fresh engine with no points played.
    pub fn new_engine(&self) -> Result<MatchEngine, RuntimeError> {
        Ok(MatchEngine::with_config(
            self.player1_label.clone(),
            self.player2_label.clone(),
            self.config,
        )?)
    }

    pub fn load(dir: &Path) -> Result<Self, RuntimeError> {
        let path = dir.join(HEADER_FILE);
        let content = fs::read_to_string(&path).map_err(RuntimeError::io(&path))?;
        let header: MatchHeader = serde_json::from_str(&content)?;
        header.config.validate()?;
        Ok(header)
    }

    pub fn save(&self, dir: &Path) -> Result<(), RuntimeError> {
        fs::create_dir_all(dir).map_err(RuntimeError::io(dir))?;
        let path = dir.join(HEADER_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).map_err(RuntimeError::io(&path))
    }
}
