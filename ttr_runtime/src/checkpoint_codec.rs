//! Checkpoint Codec: engine checkpoint encoder/decoder.
//!
//! Pure codec layer. No timestamps, no envelope.
//!
//! - `encode_checkpoint`:  EngineCheckpoint → JSON string
//! - `decode_checkpoint`:  JSON string → EngineCheckpoint (strict, no defaults)
//! - `restore_checkpoint`: decode + configuration and invariant validation → MatchEngine
//! - `export_checkpoint_to_file` / `import_checkpoint_from_file`: file I/O
//! - `checkpoint_hash`:    SHA-256 of the JSON encoding (lowercase hex)

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use ttr_engine::hashing::sha256_hex;
use ttr_engine::invariants::try_validate_invariants;
use ttr_engine::{EngineCheckpoint, EngineError, MatchEngine};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("checkpoint serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
    /// Malformed JSON, missing fields or unknown fields.
    #[error("checkpoint deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
    #[error("checkpoint configuration rejected: {0}")]
    InvalidConfiguration(#[source] EngineError),
    #[error("checkpoint invariant violation: {0}")]
    InvariantViolation(String),
    #[error("checkpoint I/O error: {0}")]
    Io(#[from] io::Error),
}

// ── Encoder ────────────────────────────────────────────────────

/// Identical engines encode to identical bytes (fixed field order).
pub fn encode_checkpoint(checkpoint: &EngineCheckpoint) -> Result<String, CodecError> {
    serde_json::to_string(checkpoint).map_err(CodecError::Serialization)
}

// ── Decoder ────────────────────────────────────────────────────

/// Strict: unknown or missing fields fail. No invariant validation,
/// use `restore_checkpoint` for untrusted input.
pub fn decode_checkpoint(json: &str) -> Result<EngineCheckpoint, CodecError> {
    serde_json::from_str(json).map_err(CodecError::Deserialization)
}

// ── Restore (decode + validate) ────────────────────────────────

/// Safe entry point for loading an engine from disk.
///
/// Validates the live state and every history snapshot, so that an undo
/// can never surface a state that would have been rejected up front.
pub fn restore_checkpoint(json: &str) -> Result<MatchEngine, CodecError> {
    let checkpoint = decode_checkpoint(json)?;
    try_validate_invariants(&checkpoint.config, &checkpoint.state)
        .map_err(CodecError::InvariantViolation)?;
    for (i, snapshot) in checkpoint.history.iter().enumerate() {
        try_validate_invariants(&checkpoint.config, snapshot.state())
            .map_err(|msg| CodecError::InvariantViolation(format!("history[{}]: {}", i, msg)))?;
    }
    MatchEngine::from_checkpoint(checkpoint).map_err(CodecError::InvalidConfiguration)
}

// ── File I/O ───────────────────────────────────────────────────

/// Creates parent directories if needed.
pub fn export_checkpoint_to_file(engine: &MatchEngine, path: &Path) -> Result<(), CodecError> {
    let json = encode_checkpoint(&engine.checkpoint())?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json.as_bytes())?;
    Ok(())
}

pub fn import_checkpoint_from_file(path: &Path) -> Result<MatchEngine, CodecError> {
    let content = fs::read_to_string(path)?;
    restore_checkpoint(&content)
}

// ── Hash ───────────────────────────────────────────────────────

/// Integrity hash of the serde encoding. Not the canonical engine hash
/// from `ttr_engine::hashing`, which has its own field layout.
pub fn checkpoint_hash(checkpoint: &EngineCheckpoint) -> Result<String, CodecError> {
    Ok(sha256_hex(encode_checkpoint(checkpoint)?.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttr_engine::Side;

    fn make_engine() -> MatchEngine {
        let mut engine = MatchEngine::new("Alice", "Bob", 2, Side::Player2).unwrap();
        for _ in 0..11 {
            engine.add_point(Side::Player1);
        }
        engine.reset_set();
        engine.add_point(Side::Player2);
        engine
    }

    #[test]
    fn roundtrip_produces_identical_json() {
        let json1 = encode_checkpoint(&make_engine().checkpoint()).unwrap();
        let restored = restore_checkpoint(&json1).unwrap();
        assert_eq!(restored, make_engine());
        assert_eq!(json1, encode_checkpoint(&restored.checkpoint()).unwrap());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut v: serde_json::Value =
            serde_json::from_str(&encode_checkpoint(&make_engine().checkpoint()).unwrap()).unwrap();
        v["state"]["bonus"] = serde_json::json!(1);
        let err = decode_checkpoint(&v.to_string()).unwrap_err();
        assert!(matches!(err, CodecError::Deserialization(_)), "{:?}", err);
    }

    #[test]
    fn double_match_winner_returns_invariant_violation() {
        let mut checkpoint = make_engine().checkpoint();
        checkpoint.state.sets_player1 = 2;
        checkpoint.state.sets_player2 = 2;
        let json = encode_checkpoint(&checkpoint).unwrap();
        match restore_checkpoint(&json).unwrap_err() {
            CodecError::InvariantViolation(msg) => {
                assert!(msg.contains("match_winner"), "got: {}", msg)
            }
            other => panic!("Expected InvariantViolation, got: {:?}", other),
        }
    }

    #[test]
    fn zero_sets_to_win_is_rejected() {
        let mut checkpoint = make_engine().checkpoint();
        checkpoint.config.sets_to_win = 0;
        let json = encode_checkpoint(&checkpoint).unwrap();
        assert!(matches!(
            restore_checkpoint(&json),
            Err(CodecError::InvariantViolation(_))
        ));
    }

    #[test]
    fn file_roundtrip_matches() {
        let engine = make_engine();
        let dir = std::env::temp_dir()
            .join("ttr_checkpoint_codec_tests")
            .join("file_roundtrip");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("engine.json");

        export_checkpoint_to_file(&engine, &path).unwrap();
        let imported = import_checkpoint_from_file(&path).unwrap();
        assert_eq!(imported, engine);
        assert_eq!(
            checkpoint_hash(&imported.checkpoint()).unwrap(),
            checkpoint_hash(&engine.checkpoint()).unwrap()
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("ttr_checkpoint_codec_tests/does_not_exist.json");
        assert!(matches!(import_checkpoint_from_file(&path), Err(CodecError::Io(_))));
    }
}
