//! TTR Engine: Win Detector
//!
//! Set win: at least 11 points and a lead of at least 2.
//! Match win: set count at or above `sets_to_win`.

use crate::domain::{Side, POINTS_ADVANTAGE_REQUIRED, POINTS_TO_WIN_SET};

fn takes_set(own: u32, other: u32) -> bool {
    own >= POINTS_TO_WIN_SET && own.saturating_sub(other) >= POINTS_ADVANTAGE_REQUIRED
}

/// Side that has closed out the current set, if any.
///
/// At most one side can qualify: the two-point lead is mutually exclusive.
pub fn set_winner(score_player1: u32, score_player2: u32) -> Option<Side> {
    if takes_set(score_player1, score_player2) {
        return Some(Side::Player1);
    }
    if takes_set(score_player2, score_player1) {
        return Some(Side::Player2);
    }
    None
}

/// Side that has reached `sets_to_win`, player 1 checked first.
pub fn match_winner(sets_player1: u32, sets_player2: u32, sets_to_win: u32) -> Option<Side> {
    if sets_player1 >= sets_to_win {
        return Some(Side::Player1);
    }
    if sets_player2 >= sets_to_win {
        return Some(Side::Player2);
    }
    None
}
