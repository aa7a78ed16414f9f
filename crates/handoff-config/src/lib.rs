//! Handoff Config
//!
//! This crate contains the serializable input types for the handoff dependency
//! graph. A workflow document is a flat list of typed interaction records as
//! persisted by the authoring tool; only records typed `"handoff"` carry
//! dependency information.
//!
//! Documents can be loaded from:
//! - JSON files (via the `handoff` CLI)
//! - Any other store that hands over the interaction list as JSON
//!
//! The graph crate takes these records, coerces their event ids and builds the
//! forward and backward adjacency maps from them.

mod document;
mod event;
mod interaction;

pub use document::WorkflowDocument;
pub use event::{EventId, RawEventId};
pub use interaction::{COLLABORATION, HANDOFF, InteractionRecord};
