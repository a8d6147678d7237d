//! On-disk checkpoints: encoded engine + integrity hash at a sequence.
//!
//! No timestamps in checkpoint content. A checkpoint whose hash does not
//! match its content is ignored and the session replays in full.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use ttr_engine::hashing::sha256_hex;
use ttr_engine::{MatchEngine, RULES_VERSION};

use crate::checkpoint_codec::{encode_checkpoint, restore_checkpoint};
use crate::error::RuntimeError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Checkpoint {
    /// Last event sequence folded into `engine_json`.
    pub sequence: u64,
    /// `checkpoint_codec` encoding of the engine.
    pub engine_json: String,
    /// SHA-256 of `engine_json`.
    pub hash: String,
    pub rules_version: u32,
}

impl Checkpoint {
    pub fn capture(sequence: u64, engine: &MatchEngine) -> Result<Self, RuntimeError> {
        let engine_json = encode_checkpoint(&engine.checkpoint())?;
        let hash = sha256_hex(engine_json.as_bytes());
        Ok(Self {
            sequence,
            engine_json,
            hash,
            rules_version: RULES_VERSION,
        })
    }

    /// Validated engine. Fails on hash mismatch, foreign rules version,
    /// or state that violates invariants.
    pub fn restore(&self) -> Result<MatchEngine, RuntimeError> {
        if !verify_checkpoint_hash(self) {
            return Err(RuntimeError::InvalidRecord(format!(
                "checkpoint {} hash mismatch",
                self.sequence
            )));
        }
        if self.rules_version != RULES_VERSION {
            return Err(RuntimeError::InvalidRecord(format!(
                "checkpoint {} has rules version {}, expected {}",
                self.sequence, self.rules_version, RULES_VERSION
            )));
        }
        Ok(restore_checkpoint(&self.engine_json)?)
    }
}

fn checkpoint_path(dir: &Path, sequence: u64) -> PathBuf {
    dir.join(format!("checkpoint_{:06}.json", sequence))
}

pub fn save_checkpoint(
    dir: &Path,
    sequence: u64,
    engine: &MatchEngine,
) -> Result<PathBuf, RuntimeError> {
    fs::create_dir_all(dir).map_err(RuntimeError::io(dir))?;
    let checkpoint = Checkpoint::capture(sequence, engine)?;
    let path = checkpoint_path(dir, sequence);
    let content = serde_json::to_string(&checkpoint)?;

    let mut file = File::create(&path).map_err(RuntimeError::io(&path))?;
    file.write_all(content.as_bytes())
        .and_then(|_| file.sync_all())
        .map_err(RuntimeError::io(&path))?;
    Ok(path)
}

/// `None` if no checkpoint exists at that sequence.
pub fn load_checkpoint(dir: &Path, sequence: u64) -> Result<Option<Checkpoint>, RuntimeError> {
    let path = checkpoint_path(dir, sequence);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path).map_err(RuntimeError::io(&path))?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// Checkpoint sequences present in `dir`, ascending.
pub fn list_checkpoints(dir: &Path) -> Result<Vec<u64>, RuntimeError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut sequences = Vec::new();
    for entry in fs::read_dir(dir).map_err(RuntimeError::io(dir))? {
        let entry = entry.map_err(RuntimeError::io(dir))?;
        let name = entry.file_name();
        if let Some(seq) = name
            .to_string_lossy()
            .strip_prefix("checkpoint_")
            .and_then(|s| s.strip_suffix(".json"))
            .and_then(|s| s.parse::<u64>().ok())
        {
            sequences.push(seq);
        }
    }
    sequences.sort_unstable();
    Ok(sequences)
}

/// Highest-sequence checkpoint in `dir`.
pub fn load_latest_checkpoint(dir: &Path) -> Result<Option<Checkpoint>, RuntimeError> {
    match list_checkpoints(dir)?.last() {
        Some(&seq) => load_checkpoint(dir, seq),
        None => Ok(None),
    }
}

pub fn verify_checkpoint_hash(checkpoint: &Checkpoint) -> bool {
    sha256_hex(checkpoint.engine_json.as_bytes()) == checkpoint.hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttr_engine::Side;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("ttr_checkpoint_tests").join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn latest_checkpoint_wins() {
        let dir = temp_dir("latest");
        let mut engine = MatchEngine::new("A", "B", 3, Side::Player1).unwrap();
        save_checkpoint(&dir, 2, &engine).unwrap();
        engine.add_point(Side::Player2);
        save_checkpoint(&dir, 10, &engine).unwrap();

        assert_eq!(list_checkpoints(&dir).unwrap(), vec![2, 10]);
        let latest = load_latest_checkpoint(&dir).unwrap().unwrap();
        assert_eq!(latest.sequence, 10);
        assert!(verify_checkpoint_hash(&latest));
        assert_eq!(latest.restore().unwrap(), engine);
    }

    #[test]
    fn tampered_checkpoint_fails_restore() {
        let engine = MatchEngine::new("A", "B", 3, Side::Player1).unwrap();
        let mut checkpoint = Checkpoint::capture(1, &engine).unwrap();
        checkpoint.engine_json = checkpoint.engine_json.replace("\"A\"", "\"Z\"");
        assert!(!verify_checkpoint_hash(&checkpoint));
        assert!(checkpoint.restore().is_err());
    }

    #[test]
    fn empty_dir_has_no_checkpoint() {
        let dir = temp_dir("empty");
        assert!(load_latest_checkpoint(&dir).unwrap().is_none());
        assert!(load_checkpoint(&dir, 1).unwrap().is_none());
    }
}
