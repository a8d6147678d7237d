//! TTR Engine: Match Engine
//!
//! Top-level state machine. Owns configuration, live state, the set's
//! starting server and the undo history. Delegates rules to `serve` and
//! `win`.
//!
//! Validation precedes mutation: a rejected call leaves the engine as it was.
//! After a match is won the engine keeps accepting calls; callers stop
//! submitting points once `is_match_finished()` is true.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{MatchConfig, MatchMode, MatchState, PointOutcome, Side};
use crate::error::EngineError;
use crate::events::{EventOutcome, MatchEvent};
use crate::history::{HistoryStack, MatchStateSnapshot};
use crate::serve;
use crate::state::create_initial_state;
use crate::win;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEngine {
    config: MatchConfig,
    labels: [String; 2],
    state: MatchState,
    set_starting_server: Side,
    history: HistoryStack,
}

/// Full serialisable image of an engine, history included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineCheckpoint {
    pub config: MatchConfig,
    pub labels: [String; 2],
    pub state: MatchState,
    pub set_starting_server: Side,
    pub history: HistoryStack,
}

impl MatchEngine {
    /// Labels are free-form and never validated.
    pub fn new(
        player1_label: impl Into<String>,
        player2_label: impl Into<String>,
        sets_to_win: u32,
        initial_server: Side,
    ) -> Result<Self, EngineError> {
        let config = MatchConfig::new(sets_to_win, initial_server)?;
        Self::with_config(player1_label, player2_label, config)
    }

    pub fn with_config(
        player1_label: impl Into<String>,
        player2_label: impl Into<String>,
        config: MatchConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            labels: [player1_label.into(), player2_label.into()],
            state: create_initial_state(&config),
            set_starting_server: config.initial_server,
            history: HistoryStack::new(),
        })
    }

    pub fn for_mode(
        player1_label: impl Into<String>,
        player2_label: impl Into<String>,
        mode: MatchMode,
        initial_server: Side,
    ) -> Self {
        let config = MatchConfig::for_mode(mode, initial_server);
        Self {
            config,
            labels: [player1_label.into(), player2_label.into()],
            state: create_initial_state(&config),
            set_starting_server: initial_server,
            history: HistoryStack::new(),
        }
    }

    // ── Transitions ────────────────────────────────────────────────

    /// Award one point to `side`.
    ///
    ///   1. Snapshot the pre-point state onto the history stack
    ///   2. Increment the side's current-set score
    ///   3. Recompute the server from the incremented score
    ///   4. Detect set win; on a set win count it and detect match win
    pub fn add_point(&mut self, side: Side) -> PointOutcome {
        self.history
            .push(MatchStateSnapshot::capture(&self.state, self.set_starting_server));

        *self.state.score_mut(side) += 1;
        self.state.server = serve::next_server(&self.state);

        let Some(set_winner) = win::set_winner(self.state.score_player1, self.state.score_player2)
        else {
            return PointOutcome::default();
        };

        *self.state.sets_mut(set_winner) += 1;
        let match_won = win::match_winner(
            self.state.sets_player1,
            self.state.sets_player2,
            self.config.sets_to_win,
        )
        .is_some();

        debug!(
            winner = %set_winner,
            sets_player1 = self.state.sets_player1,
            sets_player2 = self.state.sets_player2,
            match_won,
            "set won"
        );

        PointOutcome {
            set_won: true,
            match_won,
            winner: Some(set_winner),
        }
    }

    /// `add_point` for a raw side id (1 or 2).
    pub fn add_point_by_id(&mut self, side_id: u32) -> Result<PointOutcome, EngineError> {
        let side = Side::from_id(side_id).ok_or_else(|| {
            EngineError::InvalidInput(format!("side must be 1 or 2, got {}", side_id))
        })?;
        Ok(self.add_point(side))
    }

    /// Restore the state captured before the most recent point.
    /// Returns `false` with no change when there is nothing to undo.
    pub fn undo_last_point(&mut self) -> bool {
        let Some(snapshot) = self.history.pop() else {
            return false;
        };
        self.state = *snapshot.state();
        self.set_starting_server = snapshot.set_starting_server();
        debug!(remaining = self.history.len(), "point undone");
        true
    }

    /// Start the next set: scores to zero, the opening server of the set
    /// just played is flipped and serves first. Set counts and history are
    /// kept. Not recorded in history.
    pub fn reset_set(&mut self) {
        self.state.score_player1 = 0;
        self.state.score_player2 = 0;
        self.set_starting_server = self.set_starting_server.opponent();
        self.state.server = self.set_starting_server;
        debug!(server = %self.state.server, "set reset");
    }

    /// Dispatch the event form of a transition.
    pub fn apply_event(&mut self, event: &MatchEvent) -> EventOutcome {
        match *event {
            MatchEvent::PointAwarded { side } => EventOutcome::Point(self.add_point(side)),
            MatchEvent::PointUndone => EventOutcome::Undo(self.undo_last_point()),
            MatchEvent::SetReset => {
                self.reset_set();
                EventOutcome::SetReset
            }
        }
    }

    // ── Queries ────────────────────────────────────────────────────

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn label(&self, side: Side) -> &str {
        &self.labels[side.index()]
    }

    pub fn score(&self, side: Side) -> u32 {
        self.state.score(side)
    }

    pub fn sets(&self, side: Side) -> u32 {
        self.state.sets(side)
    }

    pub fn server(&self) -> Side {
        self.state.server
    }

    pub fn set_starting_server(&self) -> Side {
        self.set_starting_server
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn is_match_finished(&self) -> bool {
        self.winner().is_some()
    }

    pub fn winner(&self) -> Option<Side> {
        win::match_winner(
            self.state.sets_player1,
            self.state.sets_player2,
            self.config.sets_to_win,
        )
    }

    // ── Checkpoints ────────────────────────────────────────────────

    pub fn checkpoint(&self) -> EngineCheckpoint {
        EngineCheckpoint {
            config: self.config,
            labels: self.labels.clone(),
            state: self.state,
            set_starting_server: self.set_starting_server,
            history: self.history.clone(),
        }
    }

    /// Rebuild from a checkpoint. Only the configuration is checked here;
    /// state invariants are the caller's concern for untrusted input.
    pub fn from_checkpoint(checkpoint: EngineCheckpoint) -> Result<Self, EngineError> {
        checkpoint.config.validate()?;
        Ok(Self {
            config: checkpoint.config,
            labels: checkpoint.labels,
            state: checkpoint.state,
            set_starting_server: checkpoint.set_starting_server,
            history: checkpoint.history,
        })
    }
}

impl fmt::Display for MatchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}:{}, {}={}:{}, server={}",
            self.label(Side::Player1),
            self.state.score_player1,
            self.state.sets_player1,
            self.label(Side::Player2),
            self.state.score_player2,
            self.state.sets_player2,
            self.state.server
        )
    }
}
