#![forbid(unsafe_code)]

//! Table-tennis referee runtime.
//!
//! Wraps the scoring engine with an append-only match log, replay,
//! checkpoints, operator sessions and completed-match persistence.
//!
//! No scoring logic lives here: every transition is delegated to
//! `ttr_engine`.

pub mod checkpoint;
pub mod checkpoint_codec;
pub mod config;
pub mod error;
pub mod event_store;
pub mod header;
pub mod proto_bridge;
pub mod proto_types;
pub mod rankings;
pub mod replay;
pub mod repository;
pub mod session;

pub use config::{RuntimeConfig, StoreBackend};
pub use error::RuntimeError;
pub use header::MatchHeader;
pub use repository::{open_store, FileStore, InMemoryStore, Store};
pub use session::{MatchSession, SharedSession};
