//! Match session: one operator-driven match with its own directory.
//!
//! Directory layout:
//!   <base_dir>/<session_id>/header.json
//!   <base_dir>/<session_id>/events.log
//!   <base_dir>/<session_id>/checkpoints/
//!   <base_dir>/<session_id>/result.json   (after record_result)
//!
//! Apply-before-persist order:
//!   1. engine applies the operation (on a copy)
//!   2. event_store.append_event(), only for operations that changed state
//!   3. copy becomes the live engine
//!   4. checkpoint if interval reached
//!
//! The session is the referee's side of the table: no points once the match
//! is won, and no set reset before the current set has a winner.
//!
//! Concurrency: single writer. `SharedSession` adds a Mutex for hosts that
//! need one; no global mutable state.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};
use ttr_engine::hashing::canonical_hash;
use ttr_engine::{win, EventEnvelope, MatchEngine, MatchEvent, PointOutcome, Side};

use crate::checkpoint;
use crate::error::RuntimeError;
use crate::event_store::EventStore;
use crate::header::{MatchHeader, HEADER_FILE};
use crate::proto_bridge::{event_to_proto, protos_to_events};
use crate::replay;
use crate::repository::{CompletedMatch, MatchRecord, MatchRepository, PlayerRepository};

const EVENTS_FILE: &str = "events.log";
const CHECKPOINT_DIR: &str = "checkpoints";
const RESULT_FILE: &str = "result.json";

pub struct MatchSession {
    session_id: String,
    dir: PathBuf,
    header: MatchHeader,
    engine: MatchEngine,
    event_store: EventStore,
    checkpoint_interval: u64,
}

impl MatchSession {
    /// Start a new match. Fails if the session directory already holds one.
    pub fn create(
        base_dir: &Path,
        session_id: &str,
        header: MatchHeader,
        checkpoint_interval: u64,
    ) -> Result<Self, RuntimeError> {
        let dir = base_dir.join(session_id);
        if dir.join(HEADER_FILE).exists() {
            return Err(RuntimeError::SessionExists(dir));
        }
        let engine = header.new_engine()?;
        header.save(&dir)?;
        let event_store = EventStore::open(&dir.join(EVENTS_FILE))?;

        info!(
            session = session_id,
            player1 = %header.player1_label,
            player2 = %header.player2_label,
            sets_to_win = header.config.sets_to_win,
            "session created"
        );

        Ok(Self {
            session_id: session_id.to_string(),
            dir,
            header,
            engine,
            event_store,
            checkpoint_interval,
        })
    }

    /// Reopen an existing match.
    ///
    /// Restores the latest checkpoint and replays the log suffix after it.
    /// A checkpoint that fails verification or is ahead of the log is
    /// skipped in favour of full replay.
    pub fn open(
        base_dir: &Path,
        session_id: &str,
        checkpoint_interval: u64,
    ) -> Result<Self, RuntimeError> {
        let dir = base_dir.join(session_id);
        if !dir.join(HEADER_FILE).exists() {
            return Err(RuntimeError::SessionNotFound(dir));
        }
        let header = MatchHeader::load(&dir)?;
        let event_store = EventStore::open(&dir.join(EVENTS_FILE))?;
        let events = protos_to_events(&event_store.load_all_events()?)?;

        let engine = match Self::restore_from_checkpoint(&dir, &header, &events) {
            Ok(Some(engine)) => engine,
            Ok(None) => replay::rebuild_engine(&header, &events)?.0,
            Err(e) => {
                warn!(session = session_id, error = %e, "checkpoint unusable, replaying full log");
                replay::rebuild_engine(&header, &events)?.0
            }
        };

        info!(
            session = session_id,
            events = events.len(),
            state = %engine,
            "session opened"
        );

        Ok(Self {
            session_id: session_id.to_string(),
            dir,
            header,
            engine,
            event_store,
            checkpoint_interval,
        })
    }

    fn restore_from_checkpoint(
        dir: &Path,
        header: &MatchHeader,
        events: &[EventEnvelope],
    ) -> Result<Option<MatchEngine>, RuntimeError> {
        let Some(cp) = checkpoint::load_latest_checkpoint(&dir.join(CHECKPOINT_DIR))? else {
            return Ok(None);
        };
        let last_logged = events.last().map(|e| e.sequence).unwrap_or(0);
        if cp.sequence > last_logged {
            return Err(RuntimeError::InvalidRecord(format!(
                "checkpoint {} is ahead of the log ({})",
                cp.sequence, last_logged
            )));
        }
        let mut engine = cp.restore()?;
        if engine.config() != &header.config
            || engine.label(Side::Player1) != header.player1_label
            || engine.label(Side::Player2) != header.player2_label
        {
            return Err(RuntimeError::InvalidRecord(format!(
                "checkpoint {} does not belong to this match",
                cp.sequence
            )));
        }
        let suffix_start = events
            .iter()
            .position(|e| e.sequence > cp.sequence)
            .unwrap_or(events.len());
        replay::apply_events(&mut engine, cp.sequence, &events[suffix_start..])?;
        Ok(Some(engine))
    }

    // ── Operations ─────────────────────────────────────────────

    /// Rejected once the match has a winner.
    pub fn add_point(&mut self, side: Side) -> Result<PointOutcome, RuntimeError> {
        self.ensure_in_play()?;
        let mut next = self.engine.clone();
        let outcome = next.add_point(side);
        let sequence = self.commit(next, MatchEvent::PointAwarded { side })?;

        if outcome.match_won {
            info!(session = %self.session_id, winner = ?outcome.winner, state = %self.engine, "match won");
        } else if outcome.set_won {
            info!(session = %self.session_id, winner = ?outcome.winner, state = %self.engine, "set won");
        }
        self.maybe_checkpoint(sequence);
        Ok(outcome)
    }

    /// Raw side id from an operator surface. Rejected ids never reach the log.
    pub fn add_point_by_id(&mut self, side_id: u32) -> Result<PointOutcome, RuntimeError> {
        let side = Side::from_id(side_id).ok_or_else(|| {
            ttr_engine::EngineError::InvalidInput(format!("side must be 1 or 2, got {}", side_id))
        })?;
        self.add_point(side)
    }

    /// `false` when there was nothing to undo; nothing is logged then.
    /// Allowed after the match is won, to correct a mis-entered last point.
    pub fn undo_last_point(&mut self) -> Result<bool, RuntimeError> {
        let mut next = self.engine.clone();
        if !next.undo_last_point() {
            return Ok(false);
        }
        let sequence = self.commit(next, MatchEvent::PointUndone)?;
        self.maybe_checkpoint(sequence);
        Ok(true)
    }

    /// Start the next set. Refused until the current set has a winner.
    pub fn reset_set(&mut self) -> Result<(), RuntimeError> {
        self.ensure_in_play()?;
        let (p1, p2) = (self.engine.score(Side::Player1), self.engine.score(Side::Player2));
        if win::set_winner(p1, p2).is_none() {
            return Err(RuntimeError::SetInProgress {
                score_player1: p1,
                score_player2: p2,
            });
        }
        let mut next = self.engine.clone();
        next.reset_set();
        let sequence = self.commit(next, MatchEvent::SetReset)?;
        self.maybe_checkpoint(sequence);
        Ok(())
    }

    fn ensure_in_play(&self) -> Result<(), RuntimeError> {
        if self.engine.is_match_finished() {
            let state = self.engine.state();
            return Err(RuntimeError::MatchFinished {
                sets_player1: state.sets_player1,
                sets_player2: state.sets_player2,
            });
        }
        Ok(())
    }

    /// Append the event, then swap in the engine it produced.
    fn commit(&mut self, next: MatchEngine, event: MatchEvent) -> Result<u64, RuntimeError> {
        let envelope = EventEnvelope::new(self.event_store.last_sequence() + 1, event);
        self.event_store.append_event(&event_to_proto(&envelope))?;
        self.engine = next;
        debug!(session = %self.session_id, sequence = envelope.sequence, event = event.name(), "event recorded");
        Ok(envelope.sequence)
    }

    fn maybe_checkpoint(&self, sequence: u64) {
        if self.checkpoint_interval == 0 || sequence % self.checkpoint_interval != 0 {
            return;
        }
        // The log is authoritative; a failed checkpoint only costs replay time.
        if let Err(e) =
            checkpoint::save_checkpoint(&self.dir.join(CHECKPOINT_DIR), sequence, &self.engine)
        {
            warn!(session = %self.session_id, sequence, error = %e, "checkpoint failed");
        }
    }

    /// Hand the finished match to the result store, once.
    ///
    /// Labels are resolved to player ids (created on first sight), then the
    /// final set counts are saved, tied to the header's tournament if any.
    /// The stored record is kept in `result.json`; a second call fails with
    /// `AlreadyRecorded`.
    pub fn record_result<R>(&self, repos: &mut R) -> Result<MatchRecord, RuntimeError>
    where
        R: PlayerRepository + MatchRepository + ?Sized,
    {
        if let Some(existing) = self.recorded_result()? {
            return Err(RuntimeError::AlreadyRecorded {
                match_id: existing.id,
            });
        }
        let state = self.engine.state();
        if self.engine.winner().is_none() {
            return Err(RuntimeError::MatchNotFinished {
                sets_player1: state.sets_player1,
                sets_player2: state.sets_player2,
            });
        }
        let player1_id = repos.get_or_create(self.engine.label(Side::Player1))?;
        let player2_id = repos.get_or_create(self.engine.label(Side::Player2))?;
        let record = repos.save(CompletedMatch {
            player1_id,
            player2_id,
            sets_player1: state.sets_player1,
            sets_player2: state.sets_player2,
            tournament_id: self.header.tournament_id,
        })?;
        let path = self.dir.join(RESULT_FILE);
        let content = serde_json::to_string_pretty(&record)?;
        fs::write(&path, content).map_err(RuntimeError::io(&path))?;
        info!(session = %self.session_id, match_id = record.id, "result recorded");
        Ok(record)
    }

    /// The stored result, if `record_result` has already succeeded.
    pub fn recorded_result(&self) -> Result<Option<MatchRecord>, RuntimeError> {
        let path = self.dir.join(RESULT_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(RuntimeError::io(&path))?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Discard the live engine and rebuild it from the log alone.
    /// Returns the rebuilt canonical hash.
    pub fn replay_full(&mut self) -> Result<String, RuntimeError> {
        let events = protos_to_events(&self.event_store.load_all_events()?)?;
        let (engine, hash) = replay::rebuild_engine(&self.header, &events)?;
        self.engine = engine;
        Ok(hash)
    }

    /// Replay the log twice and compare with the live engine.
    pub fn verify(&self) -> Result<String, RuntimeError> {
        let events = protos_to_events(&self.event_store.load_all_events()?)?;
        let replayed = replay::verify_determinism(&self.header, &events)?;
        let live = self.current_hash();
        if replayed != live {
            return Err(RuntimeError::Determinism {
                first: live,
                second: replayed,
            });
        }
        Ok(live)
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn header(&self) -> &MatchHeader {
        &self.header
    }

    pub fn current_hash(&self) -> String {
        canonical_hash(&self.engine)
    }

    pub fn current_sequence(&self) -> u64 {
        self.event_store.last_sequence()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Thread-safe session handle. A panic while holding the lock cannot leave
/// the session half-updated (the engine is swapped in only after a
/// successful append), so a poisoned lock is recovered.
pub struct SharedSession {
    inner: Mutex<MatchSession>,
}

impl SharedSession {
    pub fn new(session: MatchSession) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MatchSession> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_point(&self, side: Side) -> Result<PointOutcome, RuntimeError> {
        self.lock().add_point(side)
    }

    pub fn undo_last_point(&self) -> Result<bool, RuntimeError> {
        self.lock().undo_last_point()
    }

    pub fn reset_set(&self) -> Result<(), RuntimeError> {
        self.lock().reset_set()
    }

    pub fn current_hash(&self) -> String {
        self.lock().current_hash()
    }

    pub fn current_sequence(&self) -> u64 {
        self.lock().current_sequence()
    }

    pub fn into_inner(self) -> MatchSession {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
