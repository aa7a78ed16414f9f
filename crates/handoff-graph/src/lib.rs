//! Handoff Graph
//!
//! This crate maintains the directed dependency graph between workflow events.
//! The graph is derived from the handoff records of a workflow document and is
//! never persisted on its own; it is rebuilt whenever the interaction list
//! changes.
//!
//! Three layers, each reading the previous one:
//! - [`DependencyMaps`] scans the interaction list once and produces the
//!   forward (predecessor to successors) and backward (successor to
//!   predecessors) adjacency maps.
//! - [`would_create_cycle`] answers whether a proposed handoff would close a
//!   cycle, before the edit is committed.
//! - [`ClosureCache`] memoizes the transitive ancestors and descendants of an
//!   event until the next rebuild.
//!
//! [`DependencyGraph`] owns all three and makes "rebuild, then clear the
//! cache" a single step.

mod closure;
mod cycle;
mod error;
mod graph;
mod maps;

pub use closure::{ClosureCache, Direction, EventSet};
pub use cycle::would_create_cycle;
pub use error::GraphError;
pub use graph::DependencyGraph;
pub use handoff_config::{EventId, InteractionRecord, RawEventId};
pub use maps::{AdjacencyMap, DependencyMaps, build_maps};
