use std::collections::HashSet;

use handoff_config::EventId;

use crate::maps::AdjacencyMap;

/// Check whether adding the handoff `from -> to` would close a cycle.
///
/// That is the case when `to` already reaches `from` over one or more forward
/// edges. The walk starts at the direct successors of `to`, so an event with
/// no recorded successors returns `false` right away. The map is only read;
/// committing the edge is up to the caller.
pub fn would_create_cycle(forward: &AdjacencyMap, from: EventId, to: EventId) -> bool {
  let Some(next) = forward.get(&to) else {
    return false;
  };

  // Visited set keeps diamonds (diverge, then reconverge) linear.
  let mut visited: HashSet<EventId> = HashSet::new();
  let mut stack: Vec<EventId> = next.clone();

  while let Some(event) = stack.pop() {
    if event == from {
      return true;
    }
    if !visited.insert(event) {
      continue;
    }
    if let Some(successors) = forward.get(&event) {
      stack.extend(
        successors
          .iter()
          .copied()
          .filter(|e| !visited.contains(e)),
      );
    }
  }

  false
}
