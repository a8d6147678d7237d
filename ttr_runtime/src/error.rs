//! Runtime error type. Wraps engine, store and codec failures.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use ttr_engine::EngineError;

use crate::checkpoint_codec::CodecError;
use crate::event_store::StoreError;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// A log frame that decodes as protobuf but carries no event.
    #[error("malformed event #{sequence}: {reason}")]
    MalformedEvent { sequence: u64, reason: String },
    #[error("schema version mismatch: expected {expected}, got {got}")]
    SchemaVersion { expected: u32, got: u32 },
    #[error("sequence violation: expected {expected}, got {got}")]
    Sequence { expected: u64, got: u64 },
    #[error("match is not finished ({sets_player1}:{sets_player2})")]
    MatchNotFinished { sets_player1: u32, sets_player2: u32 },
    /// Points and set resets stop once a side has won the match.
    #[error("match is already finished ({sets_player1}:{sets_player2})")]
    MatchFinished { sets_player1: u32, sets_player2: u32 },
    #[error("set still in progress ({score_player1}:{score_player2})")]
    SetInProgress { score_player1: u32, score_player2: u32 },
    #[error("result already recorded as match {match_id}")]
    AlreadyRecorded { match_id: u64 },
    #[error("unknown tournament {0}")]
    UnknownTournament(u64),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("session already exists at {0}")]
    SessionExists(PathBuf),
    #[error("no session at {0}")]
    SessionNotFound(PathBuf),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("non-deterministic replay: {first} != {second}")]
    Determinism { first: String, second: String },
}

impl RuntimeError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> RuntimeError {
        let path = path.into();
        move |source| RuntimeError::Io { path, source }
    }
}
