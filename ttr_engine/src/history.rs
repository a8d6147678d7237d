//! TTR Engine: History Stack
//!
//! Undo log of value snapshots taken before every point. Snapshots are
//! copies, never references into the live state.

use serde::{Deserialize, Serialize};

use crate::domain::{MatchState, Side};

/// Pre-point copy of the match state plus the server who opened the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchStateSnapshot {
    state: MatchState,
    set_starting_server: Side,
}

impl MatchStateSnapshot {
    pub fn capture(state: &MatchState, set_starting_server: Side) -> Self {
        Self {
            state: *state,
            set_starting_server,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn set_starting_server(&self) -> Side {
        self.set_starting_server
    }
}

/// Grows by one per point, shrinks by one per undo. Spans set boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryStack {
    snapshots: Vec<MatchStateSnapshot>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: MatchStateSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn pop(&mut self) -> Option<MatchStateSnapshot> {
        self.snapshots.pop()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &MatchStateSnapshot> {
        self.snapshots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(score_player1: u32) -> MatchState {
        MatchState {
            score_player1,
            score_player2: 0,
            sets_player1: 0,
            sets_player2: 0,
            server: Side::Player1,
        }
    }

    #[test]
    fn pops_in_reverse_push_order() {
        let mut history = HistoryStack::new();
        assert!(history.is_empty());
        history.push(MatchStateSnapshot::capture(&state(0), Side::Player1));
        history.push(MatchStateSnapshot::capture(&state(1), Side::Player2));
        assert_eq!(history.len(), 2);

        let top = history.pop().unwrap();
        assert_eq!(top.state().score_player1, 1);
        assert_eq!(top.set_starting_server(), Side::Player2);
        assert_eq!(history.pop().unwrap().state().score_player1, 0);
        assert!(history.pop().is_none());
    }

    #[test]
    fn snapshot_is_detached_from_source() {
        let mut live = state(4);
        let snap = MatchStateSnapshot::capture(&live, Side::Player1);
        live.score_player1 = 9;
        assert_eq!(snap.state().score_player1, 4);
    }
}
