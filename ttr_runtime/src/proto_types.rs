//! Hand-written protobuf types for the match log and the result store.
//!
//! Uses prost derive macros for encode/decode without prost-build.
//! Field numbers are part of the on-disk format: never renumber.

use prost::Message;

// ── Event Envelope ─────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoEventEnvelope {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(uint32, tag = "2")]
    pub schema_version: u32,
    #[prost(message, optional, tag = "3")]
    pub event: Option<ProtoEvent>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoEvent {
    #[prost(oneof = "EventKind", tags = "1, 2, 3")]
    pub kind: Option<EventKind>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum EventKind {
    #[prost(message, tag = "1")]
    PointAwarded(PointAwarded),
    #[prost(message, tag = "2")]
    PointUndone(PointUndone),
    #[prost(message, tag = "3")]
    SetReset(SetReset),
}

// ── Event Types ────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct PointAwarded {
    /// Side id, 1 or 2.
    #[prost(uint32, tag = "1")]
    pub side: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct PointUndone {}

#[derive(Clone, PartialEq, Message)]
pub struct SetReset {}

// ── Store Records ──────────────────────────────────────────────

/// One frame of the result store log.
#[derive(Clone, PartialEq, Message)]
pub struct ProtoStoreRecord {
    #[prost(oneof = "RecordKind", tags = "1, 2, 3")]
    pub kind: Option<RecordKind>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum RecordKind {
    #[prost(message, tag = "1")]
    Player(ProtoPlayer),
    #[prost(message, tag = "2")]
    Tournament(ProtoTournament),
    #[prost(message, tag = "3")]
    CompletedMatch(ProtoCompletedMatch),
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoPlayer {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(string, tag = "2")]
    pub first_name: String,
    #[prost(string, tag = "3")]
    pub last_name: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoTournament {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(uint32, tag = "3")]
    pub sets_to_win: u32,
    #[prost(int64, tag = "4")]
    pub created_at_unix: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoCompletedMatch {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(uint64, tag = "2")]
    pub player1_id: u64,
    #[prost(uint64, tag = "3")]
    pub player2_id: u64,
    #[prost(uint32, tag = "4")]
    pub sets_player1: u32,
    #[prost(uint32, tag = "5")]
    pub sets_player2: u32,
    #[prost(uint64, optional, tag = "6")]
    pub tournament_id: Option<u64>,
    #[prost(int64, tag = "7")]
    pub played_at_unix: i64,
}
