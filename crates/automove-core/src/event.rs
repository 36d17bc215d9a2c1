// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Host change events and listener plumbing.
use std::rc::Rc;

use crate::host::GraphHost;
use crate::ident::{EdgeId, NodeId};

/// Event families a listener can subscribe to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EventKind {
    /// An element was added.
    Add,
    /// An element was removed.
    Remove,
    /// A node's position changed.
    Position,
    /// The engine repositioned a node.
    Automove,
}

/// Element type a subscription is scoped to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ElementScope {
    /// Node events only.
    Node,
    /// Edge events only.
    Edge,
    /// Both node and edge events.
    Any,
}

impl ElementScope {
    /// Returns `true` if a subscription with this scope receives events
    /// targeting `target`.
    #[must_use]
    pub fn admits(self, target: Self) -> bool {
        matches!(self, Self::Any) || self == target
    }
}

/// A change notification emitted by the host.
///
/// Edge events carry their endpoints because a removed edge can no longer be
/// queried through the host.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum GraphEvent {
    /// A node was added to the graph.
    NodeAdded {
        /// The new node.
        node: NodeId,
    },
    /// A node was removed from the graph.
    NodeRemoved {
        /// The removed node.
        node: NodeId,
    },
    /// An edge was added.
    EdgeAdded {
        /// The new edge.
        edge: EdgeId,
        /// Source endpoint.
        source: NodeId,
        /// Target endpoint.
        target: NodeId,
    },
    /// An edge was removed.
    EdgeRemoved {
        /// The removed edge.
        edge: EdgeId,
        /// Source endpoint at removal time.
        source: NodeId,
        /// Target endpoint at removal time.
        target: NodeId,
    },
    /// A node's position was written.
    Position {
        /// The moved node.
        node: NodeId,
    },
    /// The engine applied a new position to a node.
    Automove {
        /// The repositioned node.
        node: NodeId,
    },
}

impl GraphEvent {
    /// Event family of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::NodeAdded { .. } | Self::EdgeAdded { .. } => EventKind::Add,
            Self::NodeRemoved { .. } | Self::EdgeRemoved { .. } => EventKind::Remove,
            Self::Position { .. } => EventKind::Position,
            Self::Automove { .. } => EventKind::Automove,
        }
    }

    /// Element type the event targets.
    #[must_use]
    pub const fn scope(&self) -> ElementScope {
        match self {
            Self::EdgeAdded { .. } | Self::EdgeRemoved { .. } => ElementScope::Edge,
            _ => ElementScope::Node,
        }
    }

    /// The node this event targets, if it targets a node.
    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        match *self {
            Self::NodeAdded { node }
            | Self::NodeRemoved { node }
            | Self::Position { node }
            | Self::Automove { node } => Some(node),
            Self::EdgeAdded { .. } | Self::EdgeRemoved { .. } => None,
        }
    }

    /// Both endpoints of an edge event.
    #[must_use]
    pub const fn endpoints(&self) -> Option<(NodeId, NodeId)> {
        match *self {
            Self::EdgeAdded { source, target, .. } | Self::EdgeRemoved { source, target, .. } => {
                Some((source, target))
            }
            _ => None,
        }
    }
}

/// Callback invoked by the host for each matching event.
///
/// Listeners receive the host mutably so they can read state and write
/// positions from inside dispatch.
pub type Listener = Rc<dyn Fn(&mut dyn GraphHost, &GraphEvent)>;
