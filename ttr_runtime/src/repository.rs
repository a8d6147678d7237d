//! Completed-match persistence boundary.
//!
//! Three repository traits, two adapters:
//! - `InMemoryStore`: process-local test double
//! - `FileStore`: append-only frame log of store records, indexed in memory
//!
//! The adapter is chosen once by `open_store` at the composition root.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{RuntimeConfig, StoreBackend};
use crate::error::RuntimeError;
use crate::event_store::FrameLog;
use crate::proto_types::{
    ProtoCompletedMatch, ProtoPlayer, ProtoStoreRecord, ProtoTournament, RecordKind,
};
use crate::rankings::{compute_rankings, Ranking};

// ── Records ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Split on the first space: "Jan van Berg" → ("Jan", "van Berg").
pub fn split_name(full_name: &str) -> (String, String) {
    match full_name.trim().split_once(' ') {
        Some((first, last)) => (first.to_string(), last.trim().to_string()),
        None => (full_name.trim().to_string(), String::new()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: u64,
    pub name: String,
    pub sets_to_win: u32,
    pub created_at_unix: i64,
}

/// A finished match as handed over for storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedMatch {
    pub player1_id: u64,
    pub player2_id: u64,
    pub sets_player1: u32,
    pub sets_player2: u32,
    pub tournament_id: Option<u64>,
}

/// A stored match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: u64,
    pub player1_id: u64,
    pub player2_id: u64,
    pub sets_player1: u32,
    pub sets_player2: u32,
    pub tournament_id: Option<u64>,
    pub played_at_unix: i64,
}

// ── Traits ─────────────────────────────────────────────────────

pub trait PlayerRepository {
    /// Sorted by first name, then last name.
    fn players(&self) -> Result<Vec<Player>, RuntimeError>;
    /// Id of the player with this name, created if absent.
    fn get_or_create(&mut self, full_name: &str) -> Result<u64, RuntimeError>;
}

pub trait MatchRepository {
    fn save(&mut self, completed: CompletedMatch) -> Result<MatchRecord, RuntimeError>;
    /// Most recently played first.
    fn by_tournament(&self, tournament_id: u64) -> Result<Vec<MatchRecord>, RuntimeError>;
}

pub trait TournamentRepository {
    /// Newest first.
    fn tournaments(&self) -> Result<Vec<Tournament>, RuntimeError>;
    fn tournament(&self, tournament_id: u64) -> Result<Tournament, RuntimeError>;
    fn create(&mut self, name: &str, sets_to_win: u32) -> Result<Tournament, RuntimeError>;
    fn rankings(&self, tournament_id: u64) -> Result<Vec<Ranking>, RuntimeError>;
}

/// All three repositories behind one handle.
pub trait Store: PlayerRepository + MatchRepository + TournamentRepository {}

impl<T: PlayerRepository + MatchRepository + TournamentRepository + ?Sized> Store for T {}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

// ── In-memory adapter ──────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    players: Vec<Player>,
    tournaments: Vec<Tournament>,
    matches: Vec<MatchRecord>,
    next_id: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn find_player(&self, first: &str, last: &str) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.first_name == first && p.last_name == last)
    }

    fn new_player(&mut self, full_name: &str) -> Result<Player, RuntimeError> {
        let (first_name, last_name) = split_name(full_name);
        if first_name.is_empty() {
            return Err(RuntimeError::InvalidRecord("player name is empty".into()));
        }
        Ok(Player {
            id: self.allocate_id(),
            first_name,
            last_name,
        })
    }

    fn new_tournament(&mut self, name: &str, sets_to_win: u32) -> Result<Tournament, RuntimeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RuntimeError::InvalidRecord("tournament name is empty".into()));
        }
        if sets_to_win < 1 {
            return Err(RuntimeError::InvalidRecord(format!(
                "sets_to_win must be at least 1, got {}",
                sets_to_win
            )));
        }
        Ok(Tournament {
            id: self.allocate_id(),
            name: name.to_string(),
            sets_to_win,
            created_at_unix: now_unix(),
        })
    }

    fn new_match(&mut self, completed: CompletedMatch) -> Result<MatchRecord, RuntimeError> {
        for id in [completed.player1_id, completed.player2_id] {
            if !self.players.iter().any(|p| p.id == id) {
                return Err(RuntimeError::InvalidRecord(format!("unknown player {}", id)));
            }
        }
        if completed.player1_id == completed.player2_id {
            return Err(RuntimeError::InvalidRecord(format!(
                "player {} cannot play themselves",
                completed.player1_id
            )));
        }
        if let Some(tid) = completed.tournament_id {
            self.find_tournament(tid)?;
        }
        Ok(MatchRecord {
            id: self.allocate_id(),
            player1_id: completed.player1_id,
            player2_id: completed.player2_id,
            sets_player1: completed.sets_player1,
            sets_player2: completed.sets_player2,
            tournament_id: completed.tournament_id,
            played_at_unix: now_unix(),
        })
    }

    fn find_tournament(&self, tournament_id: u64) -> Result<&Tournament, RuntimeError> {
        self.tournaments
            .iter()
            .find(|t| t.id == tournament_id)
            .ok_or(RuntimeError::UnknownTournament(tournament_id))
    }

    /// Insert a record that already carries its id. Used when rebuilding
    /// from a log; ids must be unique and are never reused afterwards.
    fn insert_record(&mut self, record: StoreRecord) -> Result<(), RuntimeError> {
        let id = record.id();
        let taken = self.players.iter().any(|p| p.id == id)
            || self.tournaments.iter().any(|t| t.id == id)
            || self.matches.iter().any(|m| m.id == id);
        if id == 0 || taken {
            return Err(RuntimeError::InvalidRecord(format!("duplicate or zero id {}", id)));
        }
        self.next_id = self.next_id.max(id);
        match record {
            StoreRecord::Player(p) => self.players.push(p),
            StoreRecord::Tournament(t) => self.tournaments.push(t),
            StoreRecord::Match(m) => self.matches.push(m),
        }
        Ok(())
    }
}

impl PlayerRepository for InMemoryStore {
    fn players(&self) -> Result<Vec<Player>, RuntimeError> {
        let mut players = self.players.clone();
        players.sort_by(|a, b| {
            a.first_name
                .cmp(&b.first_name)
                .then_with(|| a.last_name.cmp(&b.last_name))
        });
        Ok(players)
    }

    fn get_or_create(&mut self, full_name: &str) -> Result<u64, RuntimeError> {
        let (first, last) = split_name(full_name);
        if let Some(existing) = self.find_player(&first, &last) {
            return Ok(existing.id);
        }
        let player = self.new_player(full_name)?;
        let id = player.id;
        debug!(id, name = %player.full_name(), "player created");
        self.players.push(player);
        Ok(id)
    }
}

impl MatchRepository for InMemoryStore {
    fn save(&mut self, completed: CompletedMatch) -> Result<MatchRecord, RuntimeError> {
        let record = self.new_match(completed)?;
        self.matches.push(record.clone());
        Ok(record)
    }

    fn by_tournament(&self, tournament_id: u64) -> Result<Vec<MatchRecord>, RuntimeError> {
        self.find_tournament(tournament_id)?;
        let mut matches: Vec<MatchRecord> = self
            .matches
            .iter()
            .filter(|m| m.tournament_id == Some(tournament_id))
            .cloned()
            .collect();
        // Ids break ties within the same second.
        matches.sort_by(|a, b| {
            b.played_at_unix
                .cmp(&a.played_at_unix)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(matches)
    }
}

impl TournamentRepository for InMemoryStore {
    fn tournaments(&self) -> Result<Vec<Tournament>, RuntimeError> {
        let mut tournaments = self.tournaments.clone();
        tournaments.sort_by(|a, b| {
            b.created_at_unix
                .cmp(&a.created_at_unix)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(tournaments)
    }

    fn tournament(&self, tournament_id: u64) -> Result<Tournament, RuntimeError> {
        self.find_tournament(tournament_id).cloned()
    }

    fn create(&mut self, name: &str, sets_to_win: u32) -> Result<Tournament, RuntimeError> {
        let tournament = self.new_tournament(name, sets_to_win)?;
        self.tournaments.push(tournament.clone());
        Ok(tournament)
    }

    fn rankings(&self, tournament_id: u64) -> Result<Vec<Ranking>, RuntimeError> {
        let matches = self.by_tournament(tournament_id)?;
        Ok(compute_rankings(&self.players, &matches))
    }
}

// ── Store records (wire form) ──────────────────────────────────

enum StoreRecord {
    Player(Player),
    Tournament(Tournament),
    Match(MatchRecord),
}

impl StoreRecord {
    fn id(&self) -> u64 {
        match self {
            StoreRecord::Player(p) => p.id,
            StoreRecord::Tournament(t) => t.id,
            StoreRecord::Match(m) => m.id,
        }
    }

    fn to_proto(&self) -> ProtoStoreRecord {
        let kind = match self {
            StoreRecord::Player(p) => RecordKind::Player(ProtoPlayer {
                id: p.id,
                first_name: p.first_name.clone(),
                last_name: p.last_name.clone(),
            }),
            StoreRecord::Tournament(t) => RecordKind::Tournament(ProtoTournament {
                id: t.id,
                name: t.name.clone(),
                sets_to_win: t.sets_to_win,
                created_at_unix: t.created_at_unix,
            }),
            StoreRecord::Match(m) => RecordKind::CompletedMatch(ProtoCompletedMatch {
                id: m.id,
                player1_id: m.player1_id,
                player2_id: m.player2_id,
                sets_player1: m.sets_player1,
                sets_player2: m.sets_player2,
                tournament_id: m.tournament_id,
                played_at_unix: m.played_at_unix,
            }),
        };
        ProtoStoreRecord { kind: Some(kind) }
    }

    fn from_proto(proto: ProtoStoreRecord) -> Result<Self, RuntimeError> {
        match proto.kind {
            Some(RecordKind::Player(p)) => Ok(StoreRecord::Player(Player {
                id: p.id,
                first_name: p.first_name,
                last_name: p.last_name,
            })),
            Some(RecordKind::Tournament(t)) => Ok(StoreRecord::Tournament(Tournament {
                id: t.id,
                name: t.name,
                sets_to_win: t.sets_to_win,
                created_at_unix: t.created_at_unix,
            })),
            Some(RecordKind::CompletedMatch(m)) => Ok(StoreRecord::Match(MatchRecord {
                id: m.id,
                player1_id: m.player1_id,
                player2_id: m.player2_id,
                sets_player1: m.sets_player1,
                sets_player2: m.sets_player2,
                tournament_id: m.tournament_id,
                played_at_unix: m.played_at_unix,
            })),
            None => Err(RuntimeError::InvalidRecord("store record has no kind".into())),
        }
    }
}

// ── File adapter ───────────────────────────────────────────────

/// Durable store. Every mutation is one fsynced frame; the in-memory index
/// only changes after the frame is on disk.
pub struct FileStore {
    log: FrameLog<ProtoStoreRecord>,
    index: InMemoryStore,
}

impl FileStore {
    pub fn open(path: &Path) -> Result<Self, RuntimeError> {
        let log: FrameLog<ProtoStoreRecord> = FrameLog::open(path)?;
        let mut index = InMemoryStore::new();
        let records = log.read_all()?;
        let count = records.len();
        for proto in records {
            index.insert_record(StoreRecord::from_proto(proto)?)?;
        }
        info!(path = %path.display(), records = count, "result store opened");
        Ok(Self { log, index })
    }

    fn persist(&mut self, record: StoreRecord) -> Result<(), RuntimeError> {
        self.log.append(&record.to_proto())?;
        self.index.insert_record(record)
    }
}

impl PlayerRepository for FileStore {
    fn players(&self) -> Result<Vec<Player>, RuntimeError> {
        self.index.players()
    }

    fn get_or_create(&mut self, full_name: &str) -> Result<u64, RuntimeError> {
        let (first, last) = split_name(full_name);
        if let Some(existing) = self.index.find_player(&first, &last) {
            return Ok(existing.id);
        }
        // Allocate on a scratch copy so a failed write leaves no gap.
        let player = self.index.clone().new_player(full_name)?;
        let id = player.id;
        self.persist(StoreRecord::Player(player))?;
        Ok(id)
    }
}

impl MatchRepository for FileStore {
    fn save(&mut self, completed: CompletedMatch) -> Result<MatchRecord, RuntimeError> {
        let record = self.index.clone().new_match(completed)?;
        self.persist(StoreRecord::Match(record.clone()))?;
        info!(
            id = record.id,
            sets = %format!("{}:{}", record.sets_player1, record.sets_player2),
            "match saved"
        );
        Ok(record)
    }

    fn by_tournament(&self, tournament_id: u64) -> Result<Vec<MatchRecord>, RuntimeError> {
        self.index.by_tournament(tournament_id)
    }
}

impl TournamentRepository for FileStore {
    fn tournaments(&self) -> Result<Vec<Tournament>, RuntimeError> {
        self.index.tournaments()
    }

    fn tournament(&self, tournament_id: u64) -> Result<Tournament, RuntimeError> {
        self.index.tournament(tournament_id)
    }

    fn create(&mut self, name: &str, sets_to_win: u32) -> Result<Tournament, RuntimeError> {
        let tournament = self.index.clone().new_tournament(name, sets_to_win)?;
        self.persist(StoreRecord::Tournament(tournament.clone()))?;
        info!(id = tournament.id, name = %tournament.name, "tournament created");
        Ok(tournament)
    }

    fn rankings(&self, tournament_id: u64) -> Result<Vec<Ranking>, RuntimeError> {
        self.index.rankings(tournament_id)
    }
}

/// Pick the store adapter named by the configuration.
pub fn open_store(config: &RuntimeConfig) -> Result<Box<dyn Store>, RuntimeError> {
    match config.store {
        StoreBackend::Memory => Ok(Box::new(InMemoryStore::new())),
        StoreBackend::File => Ok(Box::new(FileStore::open(&config.store_path())?)),
    }
}
