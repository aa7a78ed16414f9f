use std::sync::Arc;

use handoff_config::{EventId, InteractionRecord};
use tracing::{debug, instrument};

use crate::closure::{ClosureCache, Direction, EventSet};
use crate::cycle::would_create_cycle;
use crate::error::GraphError;
use crate::maps::DependencyMaps;

/// The dependency graph of one workflow document.
///
/// Owns the adjacency maps together with the closure cache derived from
/// them. Queries borrow the graph immutably and can run concurrently;
/// [`rebuild`](Self::rebuild) borrows it mutably, so a rebuild and its cache
/// reset always finish before the next query reads the maps.
#[derive(Debug)]
pub struct DependencyGraph {
  maps: DependencyMaps,
  cache: ClosureCache,
  /// Bumped on every successful rebuild.
  generation: u64,
}

impl DependencyGraph {
  /// Build a graph from an interaction list.
  pub fn build(interactions: &[InteractionRecord]) -> Result<Self, GraphError> {
    Ok(Self::from_maps(DependencyMaps::build(interactions)?))
  }

  /// Wrap already built maps with an empty cache.
  pub fn from_maps(maps: DependencyMaps) -> Self {
    Self {
      maps,
      cache: ClosureCache::new(0),
      generation: 0,
    }
  }

  /// Rebuild the maps from a changed interaction list and invalidate every
  /// cached closure.
  ///
  /// On error the graph keeps its previous maps and cache, both still valid
  /// for the previous interaction list.
  #[instrument(skip_all, fields(interactions = interactions.len()))]
  pub fn rebuild(&mut self, interactions: &[InteractionRecord]) -> Result<(), GraphError> {
    let maps = DependencyMaps::build(interactions)?;

    self.maps = maps;
    self.generation += 1;
    self.cache.reset(self.generation);

    debug!(generation = self.generation, "dependency graph rebuilt");
    Ok(())
  }

  pub fn maps(&self) -> &DependencyMaps {
    &self.maps
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// Every event that must complete before `event` may begin.
  ///
  /// `None` when no handoff leads into `event`.
  pub fn ancestors_of(&self, event: EventId) -> Option<Arc<EventSet>> {
    self.closure(Direction::Ancestors, event)
  }

  /// Every event that may only begin after `event` has completed.
  ///
  /// `None` when no handoff leaves `event`.
  pub fn descendants_of(&self, event: EventId) -> Option<Arc<EventSet>> {
    self.closure(Direction::Descendants, event)
  }

  /// Ancestors or descendants of `event`; `None` when `event` has no entry in
  /// the map for `direction`.
  pub fn closure(&self, direction: Direction, event: EventId) -> Option<Arc<EventSet>> {
    self
      .cache
      .get_or_compute(&self.maps, self.generation, direction, event)
  }

  /// Number of cached closures for a direction.
  pub fn cached(&self, direction: Direction) -> usize {
    self.cache.len(direction)
  }

  /// Whether adding the handoff `from -> to` would close a cycle.
  pub fn would_create_cycle(&self, from: EventId, to: EventId) -> bool {
    would_create_cycle(self.maps.forward(), from, to)
  }

  /// Validate a proposed handoff before it is committed to the document.
  pub fn check_handoff(&self, from: EventId, to: EventId) -> Result<(), GraphError> {
    if from == to {
      return Err(GraphError::SelfLoop { event: from });
    }
    if self.would_create_cycle(from, to) {
      return Err(GraphError::CycleDetected { from, to });
    }
    Ok(())
  }
}

impl Default for DependencyGraph {
  fn default() -> Self {
    Self::from_maps(DependencyMaps::default())
  }
}
