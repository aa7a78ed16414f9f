use serde::{Deserialize, Serialize};

use crate::interaction::InteractionRecord;

/// The persisted workflow document, as far as the dependency graph cares.
///
/// Everything besides the interaction list (events, members, folders) is kept
/// opaque in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
  #[serde(default)]
  pub interactions: Vec<InteractionRecord>,
  #[serde(flatten)]
  pub extra: serde_json::Map<String, serde_json::Value>,
}

impl WorkflowDocument {
  /// Iterate over the handoff records only.
  pub fn handoffs(&self) -> impl Iterator<Item = &InteractionRecord> {
    self.interactions.iter().filter(|i| i.is_handoff())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_missing_interactions_defaults_to_empty() {
    let doc: WorkflowDocument = serde_json::from_value(json!({ "title": "Team" })).unwrap();
    assert!(doc.interactions.is_empty());
    assert_eq!(doc.extra.get("title"), Some(&json!("Team")));
  }

  #[test]
  fn test_handoffs_skips_other_types() {
    let doc: WorkflowDocument = serde_json::from_value(json!({
      "interactions": [
        { "type": "handoff", "event1": 1, "event2": 2 },
        { "type": "collaboration", "event1": 2, "event2": 3 },
        { "type": "handoff", "event1": 2, "event2": 3 }
      ]
    }))
    .unwrap();

    assert_eq!(doc.interactions.len(), 3);
    assert_eq!(doc.handoffs().count(), 2);
  }
}
