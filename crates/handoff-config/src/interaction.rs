use serde::{Deserialize, Serialize};

use crate::event::RawEventId;

/// Interaction type for "event1 must complete before event2 may begin".
pub const HANDOFF: &str = "handoff";

/// Interaction type for two events that share work but do not depend on each
/// other.
pub const COLLABORATION: &str = "collaboration";

/// A single entry of a document's interaction list.
///
/// Ids are optional at this level so that a malformed record can be reported
/// with its position instead of failing the whole document parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
  #[serde(rename = "type")]
  pub kind: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub event1: Option<RawEventId>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub event2: Option<RawEventId>,
  /// Fields owned by the authoring tool (ids, descriptions, timestamps).
  #[serde(flatten)]
  pub extra: serde_json::Map<String, serde_json::Value>,
}

impl InteractionRecord {
  pub fn new(kind: impl Into<String>, event1: i64, event2: i64) -> Self {
    Self {
      kind: kind.into(),
      event1: Some(RawEventId::from(event1)),
      event2: Some(RawEventId::from(event2)),
      extra: serde_json::Map::new(),
    }
  }

  /// A handoff from `from` to `to`.
  pub fn handoff(from: i64, to: i64) -> Self {
    Self::new(HANDOFF, from, to)
  }

  /// A collaboration between two events.
  pub fn collaboration(a: i64, b: i64) -> Self {
    Self::new(COLLABORATION, a, b)
  }

  pub fn is_handoff(&self) -> bool {
    self.kind == HANDOFF
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_deserialize_handoff() {
    let record: InteractionRecord = serde_json::from_value(json!({
      "type": "handoff",
      "event1": 1,
      "event2": "2",
      "id": 7,
      "description": "send draft"
    }))
    .unwrap();

    assert!(record.is_handoff());
    assert_eq!(record.event1, Some(RawEventId::from(1i64)));
    assert_eq!(record.event2, Some(RawEventId::from("2")));
    assert_eq!(record.extra.get("id"), Some(&json!(7)));
  }

  #[test]
  fn test_missing_ids_deserialize_as_none() {
    let record: InteractionRecord =
      serde_json::from_value(json!({ "type": "handoff", "event1": 3 })).unwrap();

    assert_eq!(record.event2, None);
  }

  #[test]
  fn test_type_match_is_exact() {
    assert!(!InteractionRecord::new("Handoff", 1, 2).is_handoff());
    assert!(!InteractionRecord::collaboration(1, 2).is_handoff());
    assert!(InteractionRecord::handoff(1, 2).is_handoff());
  }

  #[test]
  fn test_round_trip_preserves_extra_fields() {
    let value = json!({
      "type": "collaboration",
      "event1": 4,
      "event2": 5,
      "title": "review together"
    });
    let record: InteractionRecord = serde_json::from_value(value.clone()).unwrap();
    assert_eq!(serde_json::to_value(&record).unwrap(), value);
  }
}
