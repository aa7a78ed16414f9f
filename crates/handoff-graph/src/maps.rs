use std::collections::HashMap;

use handoff_config::{EventId, InteractionRecord, RawEventId};
use tracing::debug;

use crate::closure::Direction;
use crate::error::GraphError;

/// Adjacency list: event_id -> immediate neighbours, in document order.
pub type AdjacencyMap = HashMap<EventId, Vec<EventId>>;

/// Forward and backward adjacency built from one interaction list.
///
/// Both maps are always built together, so `to` appears in `forward[from]`
/// exactly when `from` appears in `backward[to]`. Duplicate handoffs are kept
/// as given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyMaps {
  /// Adjacency list: event_id -> events that may only start after it.
  forward: AdjacencyMap,
  /// Reverse adjacency: event_id -> events that must finish before it.
  backward: AdjacencyMap,
}

impl DependencyMaps {
  /// Build both maps in a single pass over the interaction list.
  ///
  /// Records whose type is not `"handoff"` are skipped without looking at
  /// their ids. A handoff with a missing or non-integer id rejects the whole
  /// build, since dropping the edge would corrupt every answer derived from
  /// the maps.
  pub fn build(interactions: &[InteractionRecord]) -> Result<Self, GraphError> {
    let mut forward = AdjacencyMap::new();
    let mut backward = AdjacencyMap::new();
    let mut handoffs = 0usize;

    for (index, interaction) in interactions.iter().enumerate() {
      if !interaction.is_handoff() {
        continue;
      }

      let from = parse_endpoint(index, "event1", interaction.event1.as_ref())?;
      let to = parse_endpoint(index, "event2", interaction.event2.as_ref())?;

      forward.entry(from).or_default().push(to);
      backward.entry(to).or_default().push(from);
      handoffs += 1;
    }

    debug!(
      interactions = interactions.len(),
      handoffs,
      events_with_successors = forward.len(),
      events_with_predecessors = backward.len(),
      "built dependency maps"
    );

    Ok(Self { forward, backward })
  }

  /// Predecessor -> successors.
  pub fn forward(&self) -> &AdjacencyMap {
    &self.forward
  }

  /// Successor -> predecessors.
  pub fn backward(&self) -> &AdjacencyMap {
    &self.backward
  }

  /// The map a closure in `direction` walks over.
  pub fn adjacency(&self, direction: Direction) -> &AdjacencyMap {
    match direction {
      Direction::Ancestors => &self.backward,
      Direction::Descendants => &self.forward,
    }
  }

  /// Get the immediate successors of an event.
  pub fn successors(&self, event: EventId) -> &[EventId] {
    self
      .forward
      .get(&event)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Get the immediate predecessors of an event.
  pub fn predecessors(&self, event: EventId) -> &[EventId] {
    self
      .backward
      .get(&event)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Whether the event takes part in any handoff.
  pub fn contains(&self, event: EventId) -> bool {
    self.forward.contains_key(&event) || self.backward.contains_key(&event)
  }

  pub fn is_empty(&self) -> bool {
    self.forward.is_empty()
  }
}

/// Build the forward and backward maps for an interaction list.
pub fn build_maps(interactions: &[InteractionRecord]) -> Result<DependencyMaps, GraphError> {
  DependencyMaps::build(interactions)
}

fn parse_endpoint(
  index: usize,
  field: &'static str,
  raw: Option<&RawEventId>,
) -> Result<EventId, GraphError> {
  let raw = raw.ok_or_else(|| GraphError::MalformedInteraction {
    index,
    field,
    reason: "is missing".to_string(),
  })?;

  raw
    .to_event_id()
    .ok_or_else(|| GraphError::MalformedInteraction {
      index,
      field,
      reason: format!("is not an integer id: {}", raw),
    })
}
