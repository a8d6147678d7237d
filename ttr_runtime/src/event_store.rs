//! Append-only binary logs of protobuf frames.
//!
//! Storage format: length-prefixed protobuf frames.
//!   [4-byte LE length][protobuf bytes][4-byte LE length][protobuf bytes]...
//!
//! Rules:
//!   - Strict append only: no mutation, no deletion, no reordering
//!   - fsync after every write
//!   - Frame length in 1..=16 MiB; a short read mid-frame is corruption
//!   - Match logs: sequence strictly increasing, no gaps (validated on append)

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use prost::Message;
use thiserror::Error;

use crate::proto_types::ProtoEventEnvelope;

pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid frame length {len} in {path}")]
    InvalidFrameLength { path: PathBuf, len: usize },
    #[error("truncated frame #{index} in {path}")]
    TruncatedFrame { path: PathBuf, index: usize },
    #[error("protobuf decode error in frame #{index} of {path}: {source}")]
    Decode {
        path: PathBuf,
        index: usize,
        #[source]
        source: prost::DecodeError,
    },
    #[error("sequence violation in event store: expected {expected}, got {got}")]
    SequenceViolation { expected: u64, got: u64 },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ── Generic frame log ──────────────────────────────────────────

/// Append-only log of messages of one type.
pub struct FrameLog<M> {
    path: PathBuf,
    _message: PhantomData<M>,
}

impl<M: Message + Default> FrameLog<M> {
    /// Open or create a log at the given path. Parent directories are created.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            _message: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes one length-prefixed frame and fsyncs.
    pub fn append(&mut self, message: &M) -> Result<(), StoreError> {
        let buf = message.encode_to_vec();
        if buf.is_empty() || buf.len() > MAX_FRAME_LEN {
            return Err(StoreError::InvalidFrameLength {
                path: self.path.clone(),
                len: buf.len(),
            });
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err(&self.path))?;

        {
            let mut writer = BufWriter::new(&mut file);
            writer
                .write_all(&(buf.len() as u32).to_le_bytes())
                .and_then(|_| writer.write_all(&buf))
                .and_then(|_| writer.flush())
                .map_err(io_err(&self.path))?;
        }
        file.sync_all().map_err(io_err(&self.path))
    }

    /// Load every frame in write order. A missing file is an empty log.
    pub fn read_all(&self) -> Result<Vec<M>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&self.path).map_err(io_err(&self.path))?;
        let mut reader = BufReader::new(file);
        let mut messages = Vec::new();
        let mut len_buf = [0u8; 4];

        loop {
            // Clean end of log only on a frame boundary.
            if reader.fill_buf().map_err(io_err(&self.path))?.is_empty() {
                break;
            }
            let index = messages.len();
            read_frame_part(&mut reader, &mut len_buf, &self.path, index)?;

            let len = u32::from_le_bytes(len_buf) as usize;
            if len == 0 || len > MAX_FRAME_LEN {
                return Err(StoreError::InvalidFrameLength {
                    path: self.path.clone(),
                    len,
                });
            }

            let mut frame = vec![0u8; len];
            read_frame_part(&mut reader, &mut frame, &self.path, index)?;

            let message = M::decode(frame.as_slice()).map_err(|source| StoreError::Decode {
                path: self.path.clone(),
                index,
                source,
            })?;
            messages.push(message);
        }

        Ok(messages)
    }
}

fn read_frame_part(
    reader: &mut impl Read,
    buf: &mut [u8],
    path: &Path,
    index: usize,
) -> Result<(), StoreError> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            StoreError::TruncatedFrame {
                path: path.to_path_buf(),
                index,
            }
        } else {
            io_err(path)(e)
        }
    })
}

// ── Match event log ────────────────────────────────────────────

/// Append-only match event log with gap-free sequencing.
pub struct EventStore {
    log: FrameLog<ProtoEventEnvelope>,
    last_sequence: u64,
}

impl EventStore {
    /// Open or create an event log at the given path.
    /// Reads existing events to determine the last sequence number.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let log: FrameLog<ProtoEventEnvelope> = FrameLog::open(path)?;
        let last_sequence = log.read_all()?.last().map(|e| e.sequence).unwrap_or(0);
        Ok(Self { log, last_sequence })
    }

    /// Append a single event. Its sequence must be exactly `last_sequence + 1`.
    pub fn append_event(&mut self, event: &ProtoEventEnvelope) -> Result<(), StoreError> {
        let expected = self.last_sequence + 1;
        if event.sequence != expected {
            return Err(StoreError::SequenceViolation {
                expected,
                got: event.sequence,
            });
        }
        self.log.append(event)?;
        self.last_sequence = event.sequence;
        Ok(())
    }

    /// Load all events from the log in sequence order.
    pub fn load_all_events(&self) -> Result<Vec<ProtoEventEnvelope>, StoreError> {
        self.log.read_all()
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto_types::{EventKind, PointAwarded, PointUndone, ProtoEvent};

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("ttr_event_store_tests").join(name);
        let _ = fs::remove_dir_all(&dir);
        dir.join("events.log")
    }

    fn envelope(sequence: u64, kind: EventKind) -> ProtoEventEnvelope {
        ProtoEventEnvelope {
            sequence,
            schema_version: 1,
            event: Some(ProtoEvent { kind: Some(kind) }),
        }
    }

    #[test]
    fn appends_and_reloads_in_order() {
        let path = temp_path("reload");
        let mut store = EventStore::open(&path).unwrap();
        store
            .append_event(&envelope(1, EventKind::PointAwarded(PointAwarded { side: 2 })))
            .unwrap();
        store
            .append_event(&envelope(2, EventKind::PointUndone(PointUndone {})))
            .unwrap();

        let reopened = EventStore::open(&path).unwrap();
        assert_eq!(reopened.last_sequence(), 2);
        let events = reopened.load_all_events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], envelope(1, EventKind::PointAwarded(PointAwarded { side: 2 })));
    }

    #[test]
    fn rejects_sequence_gaps() {
        let path = temp_path("gap");
        let mut store = EventStore::open(&path).unwrap();
        let err = store
            .append_event(&envelope(2, EventKind::PointUndone(PointUndone {})))
            .unwrap_err();
        assert!(matches!(err, StoreError::SequenceViolation { expected: 1, got: 2 }));
        assert_eq!(store.last_sequence(), 0);
    }

    #[test]
    fn truncated_tail_is_reported() {
        let path = temp_path("truncated");
        let mut store = EventStore::open(&path).unwrap();
        store
            .append_event(&envelope(1, EventKind::PointAwarded(PointAwarded { side: 1 })))
            .unwrap();
        let mut bytes = fs::read(&path).unwrap();
        bytes.extend_from_slice(&[9, 0]);
        fs::write(&path, &bytes).unwrap();

        let err = EventStore::open(&path).err().unwrap();
        assert!(matches!(err, StoreError::TruncatedFrame { index: 1, .. }), "{}", err);
    }

    #[test]
    fn zero_length_frame_is_rejected() {
        let path = temp_path("zero");
        let _ = EventStore::open(&path).unwrap();
        fs::write(&path, [0u8, 0, 0, 0]).unwrap();
        let err = EventStore::open(&path).err().unwrap();
        assert!(matches!(err, StoreError::InvalidFrameLength { len: 0, .. }));
    }
}
