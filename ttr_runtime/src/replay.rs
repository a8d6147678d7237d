//! Replay orchestrator: rebuild an engine from its header and event log.
//!
//! All scoring is delegated to the engine. No cached state.

use ttr_engine::hashing::canonical_hash;
use ttr_engine::{EventEnvelope, MatchEngine, SCHEMA_VERSION};

use crate::error::RuntimeError;
use crate::header::MatchHeader;

/// Apply `events` on top of `engine`, whose last applied sequence is
/// `last_sequence`.
///
///   1. Schema version must be 1
///   2. Sequence must be exactly `last_sequence + 1` (no gaps)
///   3. Engine applies the event
///
/// Returns the last applied sequence.
pub fn apply_events(
    engine: &mut MatchEngine,
    last_sequence: u64,
    events: &[EventEnvelope],
) -> Result<u64, RuntimeError> {
    let mut last = last_sequence;
    for env in events {
        if env.schema_version != SCHEMA_VERSION {
            return Err(RuntimeError::SchemaVersion {
                expected: SCHEMA_VERSION,
                got: env.schema_version,
            });
        }
        let expected = last + 1;
        if env.sequence != expected {
            return Err(RuntimeError::Sequence {
                expected,
                got: env.sequence,
            });
        }
        engine.apply_event(&env.event);
        last = env.sequence;
    }
    Ok(last)
}

/// Rebuild the engine from scratch.
///
/// Returns `(engine, canonical_hash)`. Deterministic by construction.
pub fn rebuild_engine(
    header: &MatchHeader,
    events: &[EventEnvelope],
) -> Result<(MatchEngine, String), RuntimeError> {
    let mut engine = header.new_engine()?;
    apply_events(&mut engine, 0, events)?;
    let hash = canonical_hash(&engine);
    Ok((engine, hash))
}

/// Rebuild twice and require identical hashes. Returns the hash.
pub fn verify_determinism(
    header: &MatchHeader,
    events: &[EventEnvelope],
) -> Result<String, RuntimeError> {
    let (_, first) = rebuild_engine(header, events)?;
    let (_, second) = rebuild_engine(header, events)?;
    if first != second {
        return Err(RuntimeError::Determinism { first, second });
    }
    Ok(first)
}
