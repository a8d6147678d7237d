//! TTR Engine: Serve Rotation Policy
//!
//! Pure functions of the current-set score. They are evaluated after the
//! triggering point has been counted, so `score_*` already includes it.

use crate::domain::{MatchState, Side, DEUCE_THRESHOLD, SERVE_CHANGE_INTERVAL};

/// Both sides on ten or more points.
pub fn in_deuce(score_player1: u32, score_player2: u32) -> bool {
    score_player1 >= DEUCE_THRESHOLD && score_player2 >= DEUCE_THRESHOLD
}

/// Whether the serve changes hands after the point that produced this score.
///
/// Deuce: after every point. Otherwise after the 2nd, 4th, 6th, ... point
/// of the set, never at zero.
pub fn should_flip(score_player1: u32, score_player2: u32) -> bool {
    if in_deuce(score_player1, score_player2) {
        return true;
    }
    let total = score_player1 + score_player2;
    total > 0 && total % SERVE_CHANGE_INTERVAL == 0
}

/// Server once the point that produced `state`'s score has been played.
pub fn next_server(state: &MatchState) -> Side {
    if should_flip(state.score_player1, state.score_player2) {
        state.server.opponent()
    } else {
        state.server
    }
}
