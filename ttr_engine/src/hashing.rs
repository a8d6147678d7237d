//! TTR Engine: Canonical Hashing
//!
//! Deterministic canonical serialization + SHA-256 hashing of a whole
//! engine. Two engines that went through the same operations hash equal.
//!
//! Rules:
//!   - Fields in fixed insertion order (serde_json `preserve_order`)
//!   - Sides as their numeric ids
//!   - History oldest first, each entry in the same layout as `state`
//!   - UTF-8 JSON, no whitespace, no float

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::{MatchConfig, MatchState, Side};
use crate::engine::MatchEngine;
use crate::RULES_VERSION;

/// Canonical serialization of an engine to UTF-8 JSON bytes.
/// `rules_version` comes first so a rules change changes every hash.
pub fn canonical_serialize(engine: &MatchEngine) -> Vec<u8> {
    build_canonical_value(engine).to_string().into_bytes()
}

/// SHA-256 of canonical serialization. Lowercase hex string.
pub fn canonical_hash(engine: &MatchEngine) -> String {
    sha256_hex(&canonical_serialize(engine))
}

/// Lowercase hex SHA-256 of arbitrary bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn side_value(side: Side) -> Value {
    Value::Number(side.id().into())
}

fn config_value(config: &MatchConfig) -> Value {
    let mut map = Map::new();
    map.insert("sets_to_win".to_string(), Value::Number(config.sets_to_win.into()));
    map.insert("initial_server".to_string(), side_value(config.initial_server));
    Value::Object(map)
}

fn state_value(state: &MatchState, set_starting_server: Side) -> Value {
    let mut map = Map::new();
    map.insert("score_player1".to_string(), Value::Number(state.score_player1.into()));
    map.insert("score_player2".to_string(), Value::Number(state.score_player2.into()));
    map.insert("sets_player1".to_string(), Value::Number(state.sets_player1.into()));
    map.insert("sets_player2".to_string(), Value::Number(state.sets_player2.into()));
    map.insert("server".to_string(), side_value(state.server));
    map.insert("set_starting_server".to_string(), side_value(set_starting_server));
    Value::Object(map)
}

/// Field order: rules_version, config, labels, state, history
fn build_canonical_value(engine: &MatchEngine) -> Value {
    let labels = Side::BOTH
        .iter()
        .map(|&side| Value::String(engine.label(side).to_string()))
        .collect();

    let history = engine
        .history()
        .iter()
        .map(|snap| state_value(snap.state(), snap.set_starting_server()))
        .collect();

    let mut root = Map::new();
    root.insert("rules_version".to_string(), Value::Number(RULES_VERSION.into()));
    root.insert("config".to_string(), config_value(engine.config()));
    root.insert("labels".to_string(), Value::Array(labels));
    root.insert(
        "state".to_string(),
        state_value(engine.state(), engine.set_starting_server()),
    );
    root.insert("history".to_string(), Value::Array(history));
    Value::Object(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> MatchEngine {
        MatchEngine::new("Alice", "Bob", 2, Side::Player1).unwrap()
    }

    #[test]
    fn serialization_is_compact_and_ordered() {
        let json = String::from_utf8(canonical_serialize(&engine())).unwrap();
        assert!(json.starts_with(r#"{"rules_version":1,"config":{"sets_to_win":2,"initial_server":1},"labels":["Alice","Bob"]"#));
        assert!(!json.contains(' '));
        assert!(json.ends_with(r#""history":[]}"#));
    }

    #[test]
    fn same_operations_hash_equal() {
        let mut a = engine();
        let mut b = engine();
        for e in [&mut a, &mut b] {
            e.add_point(Side::Player1);
            e.add_point(Side::Player2);
            e.undo_last_point();
        }
        assert_eq!(canonical_hash(&a), canonical_hash(&b));
        assert_eq!(canonical_hash(&a).len(), 64);
    }

    #[test]
    fn history_contributes_to_hash() {
        let fresh = engine();
        let mut undone = engine();
        undone.add_point(Side::Player1);
        assert_ne!(canonical_hash(&fresh), canonical_hash(&undone));
        undone.undo_last_point();
        assert_eq!(canonical_hash(&fresh), canonical_hash(&undone));
    }
}
