//! TTR Engine: Invariant Checks
//!
//! Non-panicking validation of a configuration/state pair. The live engine
//! never needs these (every transition preserves them); they guard state
//! that arrives from outside, such as a restored checkpoint.

use crate::domain::{MatchConfig, MatchState, Side, POINTS_ADVANTAGE_REQUIRED, POINTS_TO_WIN_SET};

/// Returns `Err(message)` on the first failed check.
pub fn try_validate_invariants(config: &MatchConfig, state: &MatchState) -> Result<(), String> {
    check_sets_to_win(config)?;
    check_single_match_winner(config, state)?;
    check_single_set_winner(state)?;
    Ok(())
}

fn check_sets_to_win(config: &MatchConfig) -> Result<(), String> {
    if config.sets_to_win < 1 {
        return Err(format!(
            "Invariant violation: [sets_to_win] must be at least 1, got {}",
            config.sets_to_win
        ));
    }
    Ok(())
}

fn check_single_match_winner(config: &MatchConfig, state: &MatchState) -> Result<(), String> {
    if state.sets_player1 >= config.sets_to_win && state.sets_player2 >= config.sets_to_win {
        return Err(format!(
            "Invariant violation: [match_winner] both sides reached {} sets ({}:{})",
            config.sets_to_win, state.sets_player1, state.sets_player2
        ));
    }
    Ok(())
}

fn check_single_set_winner(state: &MatchState) -> Result<(), String> {
    let qualifies = |side: Side| {
        let own = state.score(side);
        let other = state.score(side.opponent());
        own >= POINTS_TO_WIN_SET && own >= other.saturating_add(POINTS_ADVANTAGE_REQUIRED)
    };
    if Side::BOTH.iter().all(|&side| qualifies(side)) {
        return Err(format!(
            "Invariant violation: [set_winner] both sides satisfy the set-win condition at {}:{}",
            state.score_player1, state.score_player2
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(score_player1: u32, score_player2: u32, sets_player1: u32, sets_player2: u32) -> MatchState {
        MatchState {
            score_player1,
            score_player2,
            sets_player1,
            sets_player2,
            server: Side::Player1,
        }
    }

    #[test]
    fn accepts_ordinary_states() {
        let config = MatchConfig::default();
        assert!(try_validate_invariants(&config, &state(0, 0, 0, 0)).is_ok());
        assert!(try_validate_invariants(&config, &state(11, 3, 2, 1)).is_ok());
        // Match finished, engine keeps accepting points.
        assert!(try_validate_invariants(&config, &state(4, 0, 3, 1)).is_ok());
    }

    #[test]
    fn rejects_zero_sets_to_win() {
        let config = MatchConfig {
            sets_to_win: 0,
            initial_server: Side::Player1,
        };
        let err = try_validate_invariants(&config, &state(0, 0, 0, 0)).unwrap_err();
        assert!(err.contains("[sets_to_win]"), "{}", err);
    }

    #[test]
    fn rejects_two_match_winners() {
        let config = MatchConfig::default();
        let err = try_validate_invariants(&config, &state(0, 0, 3, 3)).unwrap_err();
        assert!(err.contains("[match_winner]"), "{}", err);
    }
}
