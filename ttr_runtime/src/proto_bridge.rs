//! Proto ↔ engine conversion bridge.
//!
//! Sides travel as their numeric ids. Decoding is where untrusted ids meet
//! the typed engine, so an id other than 1 or 2 is `InvalidInput`.

use ttr_engine::{EngineError, EventEnvelope, MatchEvent, Side};

use crate::error::RuntimeError;
use crate::proto_types::*;

/// Convert a protobuf envelope to the engine's envelope.
pub fn proto_to_event(proto: &ProtoEventEnvelope) -> Result<EventEnvelope, RuntimeError> {
    let malformed = |reason: &str| RuntimeError::MalformedEvent {
        sequence: proto.sequence,
        reason: reason.to_string(),
    };
    let kind = proto
        .event
        .as_ref()
        .ok_or_else(|| malformed("envelope has no event"))?
        .kind
        .as_ref()
        .ok_or_else(|| malformed("event has no kind"))?;

    let event = match kind {
        EventKind::PointAwarded(p) => MatchEvent::PointAwarded {
            side: Side::from_id(p.side).ok_or_else(|| {
                EngineError::InvalidInput(format!("side must be 1 or 2, got {}", p.side))
            })?,
        },
        EventKind::PointUndone(_) => MatchEvent::PointUndone,
        EventKind::SetReset(_) => MatchEvent::SetReset,
    };

    Ok(EventEnvelope {
        sequence: proto.sequence,
        schema_version: proto.schema_version,
        event,
    })
}

/// Convert an engine envelope to its protobuf form.
pub fn event_to_proto(envelope: &EventEnvelope) -> ProtoEventEnvelope {
    let kind = match envelope.event {
        MatchEvent::PointAwarded { side } => EventKind::PointAwarded(PointAwarded { side: side.id() }),
        MatchEvent::PointUndone => EventKind::PointUndone(PointUndone {}),
        MatchEvent::SetReset => EventKind::SetReset(SetReset {}),
    };
    ProtoEventEnvelope {
        sequence: envelope.sequence,
        schema_version: envelope.schema_version,
        event: Some(ProtoEvent { kind: Some(kind) }),
    }
}

/// Decode a whole log, stopping at the first bad frame.
pub fn protos_to_events(protos: &[ProtoEventEnvelope]) -> Result<Vec<EventEnvelope>, RuntimeError> {
    protos.iter().map(proto_to_event).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_survive_the_wire() {
        for event in [
            MatchEvent::PointAwarded { side: Side::Player1 },
            MatchEvent::PointAwarded { side: Side::Player2 },
            MatchEvent::PointUndone,
            MatchEvent::SetReset,
        ] {
            let env = EventEnvelope::new(4, event);
            assert_eq!(proto_to_event(&event_to_proto(&env)).unwrap(), env);
        }
    }

    #[test]
    fn unknown_side_is_invalid_input() {
        let proto = ProtoEventEnvelope {
            sequence: 1,
            schema_version: 1,
            event: Some(ProtoEvent {
                kind: Some(EventKind::PointAwarded(PointAwarded { side: 0 })),
            }),
        };
        assert!(matches!(
            proto_to_event(&proto),
            Err(RuntimeError::Engine(EngineError::InvalidInput(_)))
        ));
    }

    #[test]
    fn missing_kind_is_malformed() {
        let proto = ProtoEventEnvelope {
            sequence: 9,
            schema_version: 1,
            event: Some(ProtoEvent { kind: None }),
        };
        assert!(matches!(
            proto_to_event(&proto),
            Err(RuntimeError::MalformedEvent { sequence: 9, .. })
        ));
    }
}
