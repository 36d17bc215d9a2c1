// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Opaque identifiers shared between the engine and its host.

/// Host-assigned identifier of a node.
///
/// The engine never interprets the value; it is only compared, hashed and
/// handed back to the host.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Returns the raw host value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Host-assigned identifier of an edge.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EdgeId(pub u64);

impl EdgeId {
    /// Returns the raw host value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "edge#{}", self.0)
    }
}

/// Handle returned by [`GraphHost::on`](crate::GraphHost::on) identifying one
/// subscription, used to unsubscribe it again.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ListenerId(pub u64);

/// Registry-unique identifier of a rule, assigned in registration order.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RuleId(pub u64);

impl core::fmt::Display for RuleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "rule#{}", self.0)
    }
}

/// A member of a neighbourhood: either a node or an edge.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Element {
    /// A node member.
    Node(NodeId),
    /// An edge member.
    Edge(EdgeId),
}

impl Element {
    /// Returns the node id when this element is a node.
    #[must_use]
    pub const fn as_node(self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(id),
            Self::Edge(_) => None,
        }
    }
}
