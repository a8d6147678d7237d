//! TTR Engine: State Construction

use crate::domain::{MatchConfig, MatchState};

/// Fresh match: nothing scored, `initial_server` to serve.
pub fn create_initial_state(config: &MatchConfig) -> MatchState {
    MatchState {
        score_player1: 0,
        score_player2: 0,
        sets_player1: 0,
        sets_player2: 0,
        server: config.initial_server,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Side;

    #[test]
    fn initial_state_is_zeroed_with_configured_server() {
        for side in Side::BOTH {
            let config = MatchConfig::new(3, side).unwrap();
            let state = create_initial_state(&config);
            assert_eq!(state.total_points(), 0);
            assert_eq!(state.sets(Side::Player1), 0);
            assert_eq!(state.sets(Side::Player2), 0);
            assert_eq!(state.server, side);
        }
    }
}
