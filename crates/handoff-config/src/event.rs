use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a workflow event (a task on the authoring canvas).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

impl fmt::Display for EventId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// An event id as it arrives in a document.
///
/// Documents written by older clients store ids as text, so both JSON numbers
/// and strings are accepted here and coerced later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawEventId {
  Number(serde_json::Number),
  Text(String),
}

impl RawEventId {
  /// Coerce to an integer event id.
  ///
  /// Integral numbers convert directly, including floats with no fractional
  /// part such as `1.0`. Text converts when, after trimming whitespace, it is
  /// such a number. Anything else yields `None`.
  pub fn to_event_id(&self) -> Option<EventId> {
    match self {
      RawEventId::Number(n) => n
        .as_i64()
        .or_else(|| n.as_f64().and_then(integral))
        .map(EventId),
      RawEventId::Text(s) => {
        let s = s.trim();
        s.parse::<i64>()
          .ok()
          .or_else(|| s.parse::<f64>().ok().and_then(integral))
          .map(EventId)
      }
    }
  }
}

/// A finite float with no fractional part that fits in an `i64`.
fn integral(value: f64) -> Option<i64> {
  // i64::MAX as f64 rounds up to 2^63, which is already out of range.
  let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
  (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}

impl From<i64> for RawEventId {
  fn from(id: i64) -> Self {
    RawEventId::Number(id.into())
  }
}

impl From<&str> for RawEventId {
  fn from(id: &str) -> Self {
    RawEventId::Text(id.to_string())
  }
}

impl fmt::Display for RawEventId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RawEventId::Number(n) => write!(f, "{}", n),
      RawEventId::Text(s) => write!(f, "{:?}", s),
    }
  }
}
