//! TTR Engine: Event Definitions
//!
//! Events are the data form of the three mutating operations. They carry
//! intent only; `MatchEngine::apply_event` interprets them.
//!
//! Schema version is locked at 1.

use serde::{Deserialize, Serialize};

use crate::domain::{PointOutcome, Side};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    PointAwarded { side: Side },
    PointUndone,
    SetReset,
}

impl MatchEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MatchEvent::PointAwarded { .. } => "point_awarded",
            MatchEvent::PointUndone => "point_undone",
            MatchEvent::SetReset => "set_reset",
        }
    }
}

/// Result of applying one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Point(PointOutcome),
    /// `false` when there was nothing to undo.
    Undo(bool),
    SetReset,
}

impl EventOutcome {
    /// An undo against an empty history changes nothing.
    pub fn is_noop(&self) -> bool {
        matches!(self, EventOutcome::Undo(false))
    }
}

/// Sequenced event as stored in a match log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventEnvelope {
    pub sequence: u64,
    pub schema_version: u32,
    pub event: MatchEvent,
}

impl EventEnvelope {
    pub fn new(sequence: u64, event: MatchEvent) -> Self {
        Self {
            sequence,
            schema_version: SCHEMA_VERSION,
            event,
        }
    }
}
