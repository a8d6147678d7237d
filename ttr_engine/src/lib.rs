#![forbid(unsafe_code)]

//! Table-tennis match scoring engine.
//!
//! Converts a stream of awarded points into scores, serve assignment and
//! set/match completion, with exact undo. Pure and synchronous: no I/O.

/// Rules v1. Part of every canonical hash.
pub const RULES_VERSION: u32 = 1;

pub mod domain;
pub mod engine;
pub mod error;
pub mod events;
pub mod hashing;
pub mod history;
pub mod invariants;
pub mod serve;
pub mod state;
pub mod win;

pub use domain::{MatchConfig, MatchMode, MatchState, PointOutcome, Side};
pub use engine::{EngineCheckpoint, MatchEngine};
pub use error::EngineError;
pub use events::{EventEnvelope, EventOutcome, MatchEvent, SCHEMA_VERSION};
