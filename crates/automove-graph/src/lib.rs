// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! automove-graph: an in-memory [`GraphHost`](automove_core::GraphHost).
//!
//! [`MemoryGraph`] stores string-keyed nodes and edges, evaluates a small
//! selector language, and delivers change events with batch coalescing. It is
//! the host the automove tests and command-line driver run against.
#![forbid(unsafe_code)]

mod graph;
mod record;
mod scene;
mod selector;

pub use graph::{GraphError, MemoryGraph, DEFAULT_EXTENT};
pub use record::{EdgeRecord, NodeRecord, DEFAULT_NODE_SIZE};
pub use scene::{Scene, SceneEdge, SceneError, SceneNode};
pub use selector::{Selector, SelectorError};
