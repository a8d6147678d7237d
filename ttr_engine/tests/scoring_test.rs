//! Scoring scenarios against the public engine API.

use ttr_engine::{EngineError, MatchEngine, PointOutcome, Side};

fn engine(sets_to_win: u32, initial_server: Side) -> MatchEngine {
    MatchEngine::new("A", "B", sets_to_win, initial_server).unwrap()
}

fn award(engine: &mut MatchEngine, side: Side, n: u32) -> PointOutcome {
    let mut last = PointOutcome::default();
    for _ in 0..n {
        last = engine.add_point(side);
    }
    last
}

/// Drive the score to `p1:p2` alternating points so no set is won on the way.
fn rally_to(engine: &mut MatchEngine, p1: u32, p2: u32) {
    let (mut a, mut b) = (0, 0);
    while a < p1 || b < p2 {
        if a < p1 && (a <= b || b >= p2) {
            engine.add_point(Side::Player1);
            a += 1;
        } else {
            engine.add_point(Side::Player2);
            b += 1;
        }
    }
}

#[test]
fn fresh_engine_is_zeroed() {
    for side in Side::BOTH {
        let e = engine(3, side);
        assert_eq!(e.score(Side::Player1), 0);
        assert_eq!(e.score(Side::Player2), 0);
        assert_eq!(e.sets(Side::Player1), 0);
        assert_eq!(e.sets(Side::Player2), 0);
        assert_eq!(e.server(), side);
        assert_eq!(e.history_len(), 0);
        assert!(!e.is_match_finished());
        assert_eq!(e.winner(), None);
    }
}

#[test]
fn invalid_configuration_is_rejected() {
    assert!(matches!(
        MatchEngine::new("A", "B", 0, Side::Player1),
        Err(EngineError::InvalidConfiguration(_))
    ));
}

#[test]
fn serve_changes_every_two_points() {
    let mut e = engine(3, Side::Player1);
    e.add_point(Side::Player1);
    assert_eq!(e.server(), Side::Player1);
    e.add_point(Side::Player1);
    assert_eq!(e.server(), Side::Player2);
    e.add_point(Side::Player2);
    assert_eq!(e.server(), Side::Player2);
    e.add_point(Side::Player1);
    assert_eq!(e.server(), Side::Player1);
}

#[test]
fn serve_changes_every_point_in_deuce() {
    let mut e = engine(3, Side::Player1);
    rally_to(&mut e, 10, 10);
    let at_deuce = e.server();
    e.add_point(Side::Player1);
    assert_eq!(e.server(), at_deuce.opponent());
    e.add_point(Side::Player2);
    assert_eq!(e.server(), at_deuce);
    e.add_point(Side::Player2);
    assert_eq!(e.server(), at_deuce.opponent());
}

#[test]
fn eleven_love_wins_the_set() {
    let mut e = engine(3, Side::Player1);
    let outcome = award(&mut e, Side::Player2, 11);
    assert_eq!(
        outcome,
        PointOutcome {
            set_won: true,
            match_won: false,
            winner: Some(Side::Player2)
        }
    );
    assert_eq!(e.sets(Side::Player2), 1);
    assert_eq!(e.sets(Side::Player1), 0);
}

#[test]
fn deuce_requires_two_point_lead() {
    let mut e = engine(3, Side::Player1);
    rally_to(&mut e, 10, 10);
    assert_eq!(e.add_point(Side::Player1), PointOutcome::default());
    assert_eq!(e.add_point(Side::Player2), PointOutcome::default());
    assert_eq!(e.add_point(Side::Player2), PointOutcome::default());
    let outcome = e.add_point(Side::Player2);
    assert!(outcome.set_won);
    assert_eq!(outcome.winner, Some(Side::Player2));
    assert_eq!((e.score(Side::Player1), e.score(Side::Player2)), (11, 13));
}

#[test]
fn third_set_wins_best_of_five() {
    let mut e = engine(3, Side::Player1);
    for set in 0..3 {
        let outcome = award(&mut e, Side::Player1, 11);
        assert!(outcome.set_won);
        assert_eq!(outcome.match_won, set == 2);
        if !outcome.match_won {
            e.reset_set();
        }
    }
    assert!(e.is_match_finished());
    assert_eq!(e.winner(), Some(Side::Player1));
}

#[test]
fn single_set_match_scenario() {
    let mut e = engine(1, Side::Player1);
    for _ in 0..10 {
        assert_eq!(e.add_point(Side::Player1), PointOutcome::default());
    }
    assert_eq!(
        e.add_point(Side::Player1),
        PointOutcome {
            set_won: true,
            match_won: true,
            winner: Some(Side::Player1)
        }
    );
    assert!(e.is_match_finished());
}

#[test]
fn undo_of_set_winning_point_restores_set_count() {
    let mut e = engine(3, Side::Player1);
    award(&mut e, Side::Player1, 11);
    assert_eq!(e.sets(Side::Player1), 1);
    assert!(e.undo_last_point());
    assert_eq!(e.sets(Side::Player1), 0);
    assert_eq!(e.score(Side::Player1), 10);
}

#[test]
fn undo_of_match_winning_point_reopens_match() {
    let mut e = engine(1, Side::Player2);
    award(&mut e, Side::Player2, 11);
    assert!(e.is_match_finished());
    assert!(e.undo_last_point());
    assert!(!e.is_match_finished());
    assert_eq!(e.winner(), None);
}

#[test]
fn undo_on_empty_history_is_false() {
    let mut e = engine(3, Side::Player1);
    assert!(!e.undo_last_point());
    e.add_point(Side::Player1);
    assert!(e.undo_last_point());
    assert!(!e.undo_last_point());
    assert_eq!(e.state().total_points(), 0);
}

#[test]
fn reset_flips_set_opener_not_current_server() {
    let mut e = engine(3, Side::Player2);
    // 3 points: server already flipped once to player 1.
    award(&mut e, Side::Player1, 3);
    assert_eq!(e.server(), Side::Player1);
    e.reset_set();
    assert_eq!(e.server(), Side::Player1);
    assert_eq!((e.score(Side::Player1), e.score(Side::Player2)), (0, 0));
}

#[test]
fn reset_is_not_undoable() {
    let mut e = engine(3, Side::Player1);
    award(&mut e, Side::Player1, 11);
    e.reset_set();
    award(&mut e, Side::Player2, 2);
    assert!(e.undo_last_point());
    assert!(e.undo_last_point());
    // Still in the new set: the reset itself is not on the stack.
    assert_eq!((e.score(Side::Player1), e.score(Side::Player2)), (0, 0));
    assert_eq!(e.sets(Side::Player1), 1);
    assert!(e.undo_last_point());
    assert_eq!((e.score(Side::Player1), e.sets(Side::Player1)), (10, 0));
}
