// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Node and edge records stored by [`MemoryGraph`](crate::MemoryGraph).
use std::collections::{BTreeMap, BTreeSet};

use automove_core::NodeId;
use automove_geom::{Position, Size};

/// Rendered size given to nodes that do not declare one.
pub const DEFAULT_NODE_SIZE: Size = Size::new(30.0, 30.0);

/// Materialised node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub(crate) key: String,
    pub(crate) position: Position,
    pub(crate) size: Size,
    pub(crate) classes: BTreeSet<String>,
    pub(crate) data: BTreeMap<String, String>,
}

impl NodeRecord {
    pub(crate) fn new(key: String, position: Position) -> Self {
        Self {
            key,
            position,
            size: DEFAULT_NODE_SIZE,
            classes: BTreeSet::new(),
            data: BTreeMap::new(),
        }
    }

    /// String id the node was created with.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current model position.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Rendered outer size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns `true` if the node carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    /// Class names, sorted.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    /// Data value stored under `key`.
    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

/// Materialised edge. Edges are directed in storage but count as undirected
/// for neighbourhoods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord {
    pub(crate) key: String,
    pub(crate) source: NodeId,
    pub(crate) target: NodeId,
}

impl EdgeRecord {
    /// String id the edge was created with.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Source endpoint.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Target endpoint.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The endpoint opposite `node`, or `None` if `node` is not an endpoint.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.source == node {
            Some(self.target)
        } else if self.target == node {
            Some(self.source)
        } else {
            None
        }
    }
}
