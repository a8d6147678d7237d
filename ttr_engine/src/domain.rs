//! TTR Engine: Core Domain Types
//!
//! Pure data. No transition logic lives here.
//! All counters are non-negative integers (u32).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ── Game rules ─────────────────────────────────────────────────────

/// Points a side needs to take a set (subject to the advantage rule).
pub const POINTS_TO_WIN_SET: u32 = 11;
/// Lead required over the opponent to close out a set.
pub const POINTS_ADVANTAGE_REQUIRED: u32 = 2;
/// Outside deuce the serve changes after every this many points.
pub const SERVE_CHANGE_INTERVAL: u32 = 2;
/// Both sides at or above this score puts the set into deuce.
pub const DEUCE_THRESHOLD: u32 = 10;
/// Best of five.
pub const DEFAULT_SETS_TO_WIN: u32 = 3;

// ── Side ───────────────────────────────────────────────────────────

/// One of the two fixed competitor slots in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Player1, Side::Player2];

    pub fn opponent(self) -> Side {
        match self {
            Side::Player1 => Side::Player2,
            Side::Player2 => Side::Player1,
        }
    }

    /// Stable numeric identifier used on the wire and in storage (1 or 2).
    pub fn id(self) -> u32 {
        match self {
            Side::Player1 => 1,
            Side::Player2 => 2,
        }
    }

    pub fn from_id(id: u32) -> Option<Side> {
        match id {
            1 => Some(Side::Player1),
            2 => Some(Side::Player2),
            _ => None,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Side::Player1 => 0,
            Side::Player2 => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.id())
    }
}

// ── Match mode ─────────────────────────────────────────────────────

/// Preset match lengths offered to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Single set.
    Quick,
    #[serde(rename = "best_of_3")]
    BestOf3,
    #[default]
    #[serde(rename = "best_of_5")]
    BestOf5,
    #[serde(rename = "best_of_7")]
    BestOf7,
}

impl MatchMode {
    pub const fn sets_to_win(self) -> u32 {
        match self {
            MatchMode::Quick => 1,
            MatchMode::BestOf3 => 2,
            MatchMode::BestOf5 => 3,
            MatchMode::BestOf7 => 4,
        }
    }
}

impl FromStr for MatchMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "quick" => Ok(MatchMode::Quick),
            "best_of_3" => Ok(MatchMode::BestOf3),
            "best_of_5" => Ok(MatchMode::BestOf5),
            "best_of_7" => Ok(MatchMode::BestOf7),
            other => Err(EngineError::InvalidConfiguration(format!(
                "unknown match mode {:?}: expected quick, best_of_3, best_of_5 or best_of_7",
                other
            ))),
        }
    }
}

// ── Configuration ──────────────────────────────────────────────────

/// Fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchConfig {
    pub sets_to_win: u32,
    pub initial_server: Side,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            sets_to_win: DEFAULT_SETS_TO_WIN,
            initial_server: Side::Player1,
        }
    }
}

impl MatchConfig {
    pub fn new(sets_to_win: u32, initial_server: Side) -> Result<Self, EngineError> {
        let config = Self {
            sets_to_win,
            initial_server,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build from raw identifiers, as they arrive from storage or the command line.
    pub fn from_ids(sets_to_win: u32, initial_server_id: u32) -> Result<Self, EngineError> {
        let initial_server = Side::from_id(initial_server_id).ok_or_else(|| {
            EngineError::InvalidConfiguration(format!(
                "initial_server must be 1 or 2, got {}",
                initial_server_id
            ))
        })?;
        Self::new(sets_to_win, initial_server)
    }

    pub fn for_mode(mode: MatchMode, initial_server: Side) -> Self {
        Self {
            sets_to_win: mode.sets_to_win(),
            initial_server,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.sets_to_win < 1 {
            return Err(EngineError::InvalidConfiguration(format!(
                "sets_to_win must be at least 1, got {}",
                self.sets_to_win
            )));
        }
        Ok(())
    }
}

// ── Live state ─────────────────────────────────────────────────────

/// Authoritative score of the match in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchState {
    pub score_player1: u32,
    pub score_player2: u32,
    pub sets_player1: u32,
    pub sets_player2: u32,
    pub server: Side,
}

impl MatchState {
    /// Current-set points of `side`.
    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Player1 => self.score_player1,
            Side::Player2 => self.score_player2,
        }
    }

    /// Sets won so far by `side`.
    pub fn sets(&self, side: Side) -> u32 {
        match side {
            Side::Player1 => self.sets_player1,
            Side::Player2 => self.sets_player2,
        }
    }

    /// Points played in the current set.
    pub fn total_points(&self) -> u32 {
        self.score_player1 + self.score_player2
    }

    pub(crate) fn score_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Player1 => &mut self.score_player1,
            Side::Player2 => &mut self.score_player2,
        }
    }

    pub(crate) fn sets_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Player1 => &mut self.sets_player1,
            Side::Player2 => &mut self.sets_player2,
        }
    }
}

/// What a single point did to the match. Produced fresh per point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointOutcome {
    pub set_won: bool,
    pub match_won: bool,
    pub winner: Option<Side>,
}
