//! Property tests: undo round-trip and serve-rotation laws.

use proptest::prelude::*;
use ttr_engine::serve::should_flip;
use ttr_engine::{MatchEngine, Side};

fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Player1), Just(Side::Player2)]
}

/// Arbitrary point sequence.
fn points_strategy() -> impl Strategy<Value = Vec<Side>> {
    prop::collection::vec(side_strategy(), 0..120)
}

proptest! {
    #[test]
    fn n_undos_restore_pre_sequence_state(
        sets_to_win in 1u32..5,
        initial_server in side_strategy(),
        warmup in prop::collection::vec(side_strategy(), 0..30),
        points in points_strategy(),
    ) {
        let mut engine = MatchEngine::new("A", "B", sets_to_win, initial_server).unwrap();
        for side in warmup {
            if engine.add_point(side).set_won {
                engine.reset_set();
            }
        }
        let before = engine.clone();

        for &side in &points {
            if engine.add_point(side).set_won {
                engine.reset_set();
            }
        }
        for _ in 0..points.len() {
            prop_assert!(engine.undo_last_point());
        }
        prop_assert_eq!(engine.state(), before.state());
        prop_assert_eq!(engine.history_len(), before.history_len());
        prop_assert_eq!(engine.set_starting_server(), before.set_starting_server());
    }

    #[test]
    fn undo_past_history_reports_false(points in points_strategy()) {
        let mut engine = MatchEngine::new("A", "B", 3, Side::Player1).unwrap();
        for &side in &points {
            engine.add_point(side);
        }
        for _ in 0..points.len() {
            prop_assert!(engine.undo_last_point());
        }
        prop_assert!(!engine.undo_last_point());
        prop_assert_eq!(engine.state().total_points(), 0);
        prop_assert_eq!(engine.server(), Side::Player1);
    }

    #[test]
    fn serve_flip_law(p1 in 0u32..30, p2 in 0u32..30) {
        let total = p1 + p2;
        let expected = if p1 >= 10 && p2 >= 10 {
            true
        } else {
            total > 0 && total % 2 == 0
        };
        prop_assert_eq!(should_flip(p1, p2), expected);
    }

    #[test]
    fn at_most_one_set_winner_per_point(points in points_strategy()) {
        let mut engine = MatchEngine::new("A", "B", 2, Side::Player2).unwrap();
        for &side in &points {
            let sets_before = engine.sets(Side::Player1) + engine.sets(Side::Player2);
            let outcome = engine.add_point(side);
            let sets_after = engine.sets(Side::Player1) + engine.sets(Side::Player2);
            if outcome.set_won {
                prop_assert_eq!(outcome.winner, Some(side));
                prop_assert_eq!(sets_after, sets_before + 1);
                engine.reset_set();
            } else {
                prop_assert_eq!(outcome.winner, None);
                prop_assert_eq!(sets_after, sets_before);
            }
        }
    }
}
