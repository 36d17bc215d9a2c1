// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Boundary between the rule engine and the graph engine it is attached to.
use automove_geom::{BoundingBox, Position, Size};
use thiserror::Error;

use crate::event::{ElementScope, EventKind, GraphEvent, Listener};
use crate::ident::{EdgeId, Element, ListenerId, NodeId};

/// Errors raised by a host and surfaced unmodified to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host could not parse a structural selector.
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector {
        /// The selector text as supplied.
        selector: String,
        /// Host-specific description of the problem.
        reason: String,
    },
}

/// Capabilities the engine needs from the graph engine that owns the nodes.
///
/// The trait is object safe; the engine only ever holds `&dyn GraphHost` /
/// `&mut dyn GraphHost`. Implementations must be single-threaded and must
/// tolerate re-entrant calls from listeners invoked during [`emit`] or while
/// a [`batch`] flushes.
///
/// [`emit`]: GraphHost::emit
/// [`batch`]: GraphHost::batch
pub trait GraphHost {
    /// Returns `true` if `node` exists (has not been removed).
    fn contains_node(&self, node: NodeId) -> bool;

    /// All current node ids, in host order.
    fn node_ids(&self) -> Vec<NodeId>;

    /// Looks up a node by its host-level key (e.g. the string id in a scene).
    fn resolve_node(&self, key: &str) -> Option<NodeId>;

    /// The open neighbourhood of `node`: its incident edges and their other
    /// endpoints, deduplicated, never including `node` itself.
    fn neighborhood(&self, node: NodeId) -> Vec<Element>;

    /// Source and target of `edge`, if it exists.
    fn edge_endpoints(&self, edge: EdgeId) -> Option<(NodeId, NodeId)>;

    /// Current model position of `node`.
    fn position(&self, node: NodeId) -> Option<Position>;

    /// Writes a node's model position. Emits a [`GraphEvent::Position`].
    fn set_position(&mut self, node: NodeId, position: Position);

    /// Rendered outer size of `node` (zero for unknown nodes).
    fn rendered_size(&self, node: NodeId) -> Size;

    /// Currently visible region, in model coordinates.
    fn extent(&self) -> BoundingBox;

    /// Checks that `selector` is well formed.
    fn validate_selector(&self, selector: &str) -> Result<(), HostError>;

    /// Evaluates a previously validated selector against `node`.
    fn matches_selector(&self, node: NodeId, selector: &str) -> bool;

    /// Subscribes `listener` to events of any of `kinds` targeting `scope`.
    fn on(&mut self, kinds: &[EventKind], scope: ElementScope, listener: Listener) -> ListenerId;

    /// Removes a subscription. Returns `false` if it was not registered.
    fn off(&mut self, id: ListenerId) -> bool;

    /// Dispatches `event` to subscribers (deferred while a batch is open).
    fn emit(&mut self, event: GraphEvent);

    /// Runs `f` as one batched mutation; the host defers its reactions until
    /// `f` returns.
    fn batch(&mut self, f: &mut dyn FnMut(&mut dyn GraphHost));
}
