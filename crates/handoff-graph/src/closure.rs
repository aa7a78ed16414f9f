//! Memoized transitive closures.
//!
//! A closure is the full set of events reachable from an event's immediate
//! neighbours in one direction. Results are cached per event id until the
//! maps they were computed from are replaced.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use handoff_config::EventId;
use tracing::{trace, warn};

use crate::maps::{AdjacencyMap, DependencyMaps};

/// A deduplicated, ordered set of event ids.
pub type EventSet = BTreeSet<EventId>;

/// Which way a closure walks the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
  /// Events that must complete before (walks the backward map).
  Ancestors,
  /// Events that can only start after (walks the forward map).
  Descendants,
}

#[derive(Debug, Default)]
struct CacheState {
  /// Generation of the maps the entries were computed from.
  generation: u64,
  ancestors: HashMap<EventId, Arc<EventSet>>,
  descendants: HashMap<EventId, Arc<EventSet>>,
}

impl CacheState {
  fn entries(&self, direction: Direction) -> &HashMap<EventId, Arc<EventSet>> {
    match direction {
      Direction::Ancestors => &self.ancestors,
      Direction::Descendants => &self.descendants,
    }
  }

  fn entries_mut(&mut self, direction: Direction) -> &mut HashMap<EventId, Arc<EventSet>> {
    match direction {
      Direction::Ancestors => &mut self.ancestors,
      Direction::Descendants => &mut self.descendants,
    }
  }

  fn reset(&mut self, generation: u64) {
    self.generation = generation;
    self.ancestors.clear();
    self.descendants.clear();
  }
}

/// Caches ancestor and descendant sets, one independent cache per direction.
///
/// Lookups take `&self` and may run concurrently; resetting takes `&mut self`
/// so it can never interleave with a lookup.
#[derive(Debug, Default)]
pub struct ClosureCache {
  state: RwLock<CacheState>,
}

impl ClosureCache {
  /// Create an empty cache for maps of the given generation.
  pub fn new(generation: u64) -> Self {
    Self {
      state: RwLock::new(CacheState {
        generation,
        ..CacheState::default()
      }),
    }
  }

  /// Get the closure of `event` from cache, or compute and cache it.
  ///
  /// Returns `None` when `event` has no entry in the map for `direction`,
  /// which covers both "not part of any handoff" and "nothing recorded in
  /// this direction". `None` results are not cached.
  ///
  /// `generation` must be the generation of `maps`. Reading entries filled
  /// from another generation is a sequencing bug: it fails loudly in debug
  /// builds, and in release builds the stale entries are dropped.
  pub fn get_or_compute(
    &self,
    maps: &DependencyMaps,
    generation: u64,
    direction: Direction,
    event: EventId,
  ) -> Option<Arc<EventSet>> {
    // Try read lock first
    {
      let state = self.state.read().unwrap_or_else(|e| e.into_inner());
      debug_assert_eq!(
        state.generation, generation,
        "stale closure cache read for event {}",
        event
      );
      if state.generation == generation {
        if let Some(cached) = state.entries(direction).get(&event) {
          trace!(%event, ?direction, "closure cache hit");
          return Some(Arc::clone(cached));
        }
      }
    }

    let adjacency = maps.adjacency(direction);
    let start = adjacency.get(&event)?;
    let closure = Arc::new(reachable(adjacency, start));
    trace!(%event, ?direction, size = closure.len(), "closure cache miss");

    // Insert with write lock
    let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
    if state.generation != generation {
      warn!(
        cached = state.generation,
        current = generation,
        "discarding stale closure cache"
      );
      state.reset(generation);
    }
    let cached = state.entries_mut(direction).entry(event).or_insert(closure);
    Some(Arc::clone(cached))
  }

  /// Drop every entry in both directions and stamp the cache with a new
  /// generation.
  pub fn reset(&mut self, generation: u64) {
    self
      .state
      .get_mut()
      .unwrap_or_else(|e| e.into_inner())
      .reset(generation);
  }

  /// Number of cached closures for a direction.
  pub fn len(&self, direction: Direction) -> usize {
    self
      .state
      .read()
      .unwrap_or_else(|e| e.into_inner())
      .entries(direction)
      .len()
  }

  pub fn is_empty(&self) -> bool {
    self.len(Direction::Ancestors) == 0 && self.len(Direction::Descendants) == 0
  }
}

/// Collect every event reachable from `start` over `map`.
///
/// Each event is expanded once no matter how many paths reach it. The start
/// events themselves are included, the event they were looked up for is not
/// (unless the input contains a cycle back to it).
pub(crate) fn reachable(map: &AdjacencyMap, start: &[EventId]) -> EventSet {
  let mut seen: HashSet<EventId> = HashSet::new();
  let mut stack: Vec<EventId> = start.to_vec();

  while let Some(event) = stack.pop() {
    if !seen.insert(event) {
      continue;
    }
    if let Some(next) = map.get(&event) {
      stack.extend(next.iter().copied().filter(|e| !seen.contains(e)));
    }
  }

  seen.into_iter().collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use handoff_config::InteractionRecord;

  fn maps(edges: &[(i64, i64)]) -> DependencyMaps {
    let records: Vec<InteractionRecord> = edges
      .iter()
      .map(|&(a, b)| InteractionRecord::handoff(a, b))
      .collect();
    DependencyMaps::build(&records).unwrap()
  }

  fn set(raw: &[i64]) -> EventSet {
    raw.iter().copied().map(EventId).collect()
  }

  #[test]
  fn test_reachable_chain() {
    let maps = maps(&[(1, 2), (2, 3)]);
    assert_eq!(reachable(maps.forward(), &[EventId(2)]), set(&[2, 3]));
    assert_eq!(reachable(maps.backward(), &[EventId(2)]), set(&[1, 2]));
  }

  #[test]
  fn test_reachable_terminates_on_cycle() {
    let maps = maps(&[(1, 2), (2, 3), (3, 1)]);
    assert_eq!(reachable(maps.forward(), &[EventId(2)]), set(&[1, 2, 3]));
  }

  #[test]
  fn test_descendants_of_diamond() {
    let maps = maps(&[(1, 2), (1, 3), (2, 4), (3, 4)]);
    let cache = ClosureCache::new(0);

    let descendants = cache
      .get_or_compute(&maps, 0, Direction::Descendants, EventId(1))
      .unwrap();
    assert_eq!(*descendants, set(&[2, 3, 4]));
  }

  #[test]
  fn test_ancestors_of_chain_end() {
    let maps = maps(&[(1, 2), (2, 3)]);
    let cache = ClosureCache::new(0);

    let ancestors = cache
      .get_or_compute(&maps, 0, Direction::Ancestors, EventId(3))
      .unwrap();
    assert_eq!(*ancestors, set(&[1, 2]));
  }

  #[test]
  fn test_unknown_event_is_none_and_not_cached() {
    let maps = maps(&[(1, 2)]);
    let cache = ClosureCache::new(0);

    assert!(cache.get_or_compute(&maps, 0, Direction::Ancestors, EventId(1)).is_none());
    assert!(cache.get_or_compute(&maps, 0, Direction::Descendants, EventId(2)).is_none());
    assert!(cache.get_or_compute(&maps, 0, Direction::Descendants, EventId(9)).is_none());
    assert!(cache.is_empty());
  }

  #[test]
  fn test_second_lookup_is_a_hit() {
    let maps = maps(&[(1, 2), (2, 3)]);
    let cache = ClosureCache::new(0);

    let first = cache
      .get_or_compute(&maps, 0, Direction::Descendants, EventId(1))
      .unwrap();
    let second = cache
      .get_or_compute(&maps, 0, Direction::Descendants, EventId(1))
      .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(Direction::Descendants), 1);
    assert_eq!(cache.len(Direction::Ancestors), 0);
  }

  #[test]
  fn test_directions_are_cached_independently() {
    let maps = maps(&[(1, 2), (2, 3)]);
    let cache = ClosureCache::new(0);

    let after = cache
      .get_or_compute(&maps, 0, Direction::Descendants, EventId(2))
      .unwrap();
    let before = cache
      .get_or_compute(&maps, 0, Direction::Ancestors, EventId(2))
      .unwrap();

    assert_eq!(*after, set(&[3]));
    assert_eq!(*before, set(&[1]));
    assert_eq!(cache.len(Direction::Descendants), 1);
    assert_eq!(cache.len(Direction::Ancestors), 1);
  }

  #[test]
  fn test_reset_clears_both_directions() {
    let maps = maps(&[(1, 2)]);
    let mut cache = ClosureCache::new(0);
    cache.get_or_compute(&maps, 0, Direction::Descendants, EventId(1));
    cache.get_or_compute(&maps, 0, Direction::Ancestors, EventId(2));
    assert!(!cache.is_empty());

    cache.reset(1);

    assert!(cache.is_empty());
    assert!(cache.get_or_compute(&maps, 1, Direction::Descendants, EventId(1)).is_some());
  }

  #[test]
  #[cfg(debug_assertions)]
  #[should_panic(expected = "stale closure cache")]
  fn test_stale_read_fails_loudly_in_debug() {
    let maps = maps(&[(1, 2)]);
    let cache = ClosureCache::new(0);
    cache.get_or_compute(&maps, 1, Direction::Descendants, EventId(1));
  }

  #[test]
  #[cfg(not(debug_assertions))]
  fn test_stale_entries_are_discarded_in_release() {
    let old_maps = maps(&[(1, 2)]);
    let cache = ClosureCache::new(0);
    let stale = cache
      .get_or_compute(&old_maps, 0, Direction::Descendants, EventId(1))
      .unwrap();
    cache.get_or_compute(&old_maps, 0, Direction::Ancestors, EventId(2));
    assert_eq!(*stale, set(&[2]));

    let new_maps = maps(&[(1, 2), (2, 3)]);
    let fresh = cache
      .get_or_compute(&new_maps, 1, Direction::Descendants, EventId(1))
      .unwrap();

    assert_eq!(*fresh, set(&[2, 3]));
    assert!(!Arc::ptr_eq(&stale, &fresh));
    assert_eq!(cache.len(Direction::Descendants), 1);
    assert_eq!(cache.len(Direction::Ancestors), 0);

    let again = cache
      .get_or_compute(&new_maps, 1, Direction::Descendants, EventId(1))
      .unwrap();
    assert!(Arc::ptr_eq(&fresh, &again));
  }
}
