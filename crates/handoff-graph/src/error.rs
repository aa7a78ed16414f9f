use handoff_config::EventId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
  /// A handoff record has a missing or non-integer event id.
  #[error("malformed interaction at index {index}: {field} {reason}")]
  MalformedInteraction {
    index: usize,
    field: &'static str,
    reason: String,
  },

  #[error("handoff from event {event} to itself")]
  SelfLoop { event: EventId },

  /// `to` already reaches `from`, so `from -> to` would close a cycle.
  #[error("handoff would create a cycle: from={from}, to={to}")]
  CycleDetected { from: EventId, to: EventId },
}
