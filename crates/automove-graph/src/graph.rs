// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory graph store implementing [`GraphHost`].
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use automove_core::{
    EdgeId, Element, ElementScope, EventKind, GraphEvent, GraphHost, HostError, Listener,
    ListenerId, NodeId,
};
use automove_geom::{BoundingBox, Position, Size};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::trace;

use crate::record::{EdgeRecord, NodeRecord};
use crate::selector::Selector;

/// Visible extent of a freshly created graph.
pub const DEFAULT_EXTENT: BoundingBox = BoundingBox::new(0.0, 0.0, 800.0, 600.0);

/// Errors returned by [`MemoryGraph`] mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A node with this key already exists.
    #[error("duplicate node `{0}`")]
    DuplicateNode(String),
    /// An edge with this key already exists.
    #[error("duplicate edge `{0}`")]
    DuplicateEdge(String),
    /// The node does not exist (or was removed).
    #[error("unknown {0}")]
    UnknownNode(NodeId),
    /// The edge does not exist (or was removed).
    #[error("unknown {0}")]
    UnknownEdge(EdgeId),
}

struct Subscription {
    kinds: Vec<EventKind>,
    scope: ElementScope,
    listener: Listener,
}

impl Subscription {
    fn accepts(&self, event: &GraphEvent) -> bool {
        self.kinds.contains(&event.kind()) && self.scope.admits(event.scope())
    }
}

/// A simple graph host: string-keyed nodes and edges, a listener table and
/// batched event delivery.
///
/// Events emitted while a batch is open are queued (a node's position events
/// are coalesced into one) and delivered when the outermost batch closes.
/// Listeners may mutate the graph while they run; a listener removed during
/// delivery is not called afterwards.
pub struct MemoryGraph {
    nodes: BTreeMap<NodeId, NodeRecord>,
    edges: BTreeMap<EdgeId, EdgeRecord>,
    /// Incident edge ids per node, both directions.
    incident: BTreeMap<NodeId, Vec<EdgeId>>,
    node_keys: FxHashMap<String, NodeId>,
    edge_keys: FxHashMap<String, EdgeId>,
    extent: BoundingBox,
    listeners: BTreeMap<ListenerId, Subscription>,
    queued: Vec<GraphEvent>,
    /// Nodes with a position event already in `queued`.
    queued_positions: FxHashSet<NodeId>,
    batch_depth: usize,
    next_node: u64,
    next_edge: u64,
    next_listener: u64,
    selectors: RefCell<FxHashMap<String, Rc<Selector>>>,
    position_writes: u64,
    batches: u64,
    selector_evaluations: Cell<u64>,
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGraph {
    /// Creates an empty graph with [`DEFAULT_EXTENT`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            incident: BTreeMap::new(),
            node_keys: FxHashMap::default(),
            edge_keys: FxHashMap::default(),
            extent: DEFAULT_EXTENT,
            listeners: BTreeMap::new(),
            queued: Vec::new(),
            queued_positions: FxHashSet::default(),
            batch_depth: 0,
            next_node: 0,
            next_edge: 0,
            next_listener: 0,
            selectors: RefCell::new(FxHashMap::default()),
            position_writes: 0,
            batches: 0,
            selector_evaluations: Cell::new(0),
        }
    }

    /// Adds a node and emits [`GraphEvent::NodeAdded`].
    ///
    /// # Errors
    /// [`GraphError::DuplicateNode`] if `key` is taken.
    pub fn add_node(&mut self, key: &str, position: Position) -> Result<NodeId, GraphError> {
        if self.node_keys.contains_key(key) {
            return Err(GraphError::DuplicateNode(key.to_owned()));
        }
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, NodeRecord::new(key.to_owned(), position));
        self.node_keys.insert(key.to_owned(), id);
        self.emit(GraphEvent::NodeAdded { node: id });
        Ok(id)
    }

    /// Removes a node: first its incident edges (each emitting
    /// [`GraphEvent::EdgeRemoved`]), then the node itself.
    ///
    /// # Errors
    /// [`GraphError::UnknownNode`] if the node does not exist.
    pub fn remove_node(&mut self, node: NodeId) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&node) {
            return Err(GraphError::UnknownNode(node));
        }
        let incident = self.incident.get(&node).cloned().unwrap_or_default();
        for edge in incident {
            // A listener may already have removed it.
            if self.edges.contains_key(&edge) {
                self.remove_edge(edge)?;
            }
        }
        if let Some(record) = self.nodes.remove(&node) {
            self.node_keys.remove(&record.key);
        }
        self.incident.remove(&node);
        self.emit(GraphEvent::NodeRemoved { node });
        Ok(())
    }

    /// Adds an edge from `source` to `target` and emits
    /// [`GraphEvent::EdgeAdded`].
    ///
    /// # Errors
    /// [`GraphError::DuplicateEdge`] if `key` is taken,
    /// [`GraphError::UnknownNode`] if an endpoint does not exist.
    pub fn add_edge(
        &mut self,
        key: &str,
        source: NodeId,
        target: NodeId,
    ) -> Result<EdgeId, GraphError> {
        if self.edge_keys.contains_key(key) {
            return Err(GraphError::DuplicateEdge(key.to_owned()));
        }
        for endpoint in [source, target] {
            if !self.nodes.contains_key(&endpoint) {
                return Err(GraphError::UnknownNode(endpoint));
            }
        }
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        self.edges.insert(
            id,
            EdgeRecord {
                key: key.to_owned(),
                source,
                target,
            },
        );
        self.edge_keys.insert(key.to_owned(), id);
        self.incident.entry(source).or_default().push(id);
        if target != source {
            self.incident.entry(target).or_default().push(id);
        }
        self.emit(GraphEvent::EdgeAdded {
            edge: id,
            source,
            target,
        });
        Ok(id)
    }

    /// Removes an edge and emits [`GraphEvent::EdgeRemoved`].
    ///
    /// # Errors
    /// [`GraphError::UnknownEdge`] if the edge does not exist.
    pub fn remove_edge(&mut self, edge: EdgeId) -> Result<(), GraphError> {
        let record = self
            .edges
            .remove(&edge)
            .ok_or(GraphError::UnknownEdge(edge))?;
        self.edge_keys.remove(&record.key);
        for endpoint in [record.source, record.target] {
            if let Some(list) = self.incident.get_mut(&endpoint) {
                list.retain(|e| *e != edge);
            }
        }
        self.emit(GraphEvent::EdgeRemoved {
            edge,
            source: record.source,
            target: record.target,
        });
        Ok(())
    }

    /// Sets a node's rendered size.
    ///
    /// # Errors
    /// [`GraphError::UnknownNode`] if the node does not exist.
    pub fn set_size(&mut self, node: NodeId, size: Size) -> Result<(), GraphError> {
        self.record_mut(node)?.size = size;
        Ok(())
    }

    /// Adds a class to a node.
    ///
    /// # Errors
    /// [`GraphError::UnknownNode`] if the node does not exist.
    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), GraphError> {
        self.record_mut(node)?.classes.insert(class.to_owned());
        Ok(())
    }

    /// Stores a data value on a node.
    ///
    /// # Errors
    /// [`GraphError::UnknownNode`] if the node does not exist.
    pub fn set_data(&mut self, node: NodeId, key: &str, value: &str) -> Result<(), GraphError> {
        self.record_mut(node)?
            .data
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    /// Replaces the visible extent.
    pub fn set_extent(&mut self, extent: BoundingBox) {
        self.extent = extent;
    }

    fn record_mut(&mut self, node: NodeId) -> Result<&mut NodeRecord, GraphError> {
        self.nodes
            .get_mut(&node)
            .ok_or(GraphError::UnknownNode(node))
    }

    /// The record of a live node.
    pub fn node(&self, node: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(&node)
    }

    /// The record of a live edge.
    pub fn edge(&self, edge: EdgeId) -> Option<&EdgeRecord> {
        self.edges.get(&edge)
    }

    /// Looks up an edge by key.
    pub fn edge_id(&self, key: &str) -> Option<EdgeId> {
        self.edge_keys.get(key).copied()
    }

    /// Live nodes in creation order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeId, &NodeRecord)> {
        self.nodes.iter().map(|(id, rec)| (*id, rec))
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of active subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Total calls to [`GraphHost::set_position`] on live nodes.
    pub fn position_writes(&self) -> u64 {
        self.position_writes
    }

    /// Total batches opened, nested ones included.
    pub fn batch_count(&self) -> u64 {
        self.batches
    }

    /// Total [`GraphHost::matches_selector`] calls.
    pub fn selector_evaluations(&self) -> u64 {
        self.selector_evaluations.get()
    }

    fn dispatch(&mut self, event: GraphEvent) {
        let targets: Vec<(ListenerId, Listener)> = self
            .listeners
            .iter()
            .filter(|(_, sub)| sub.accepts(&event))
            .map(|(id, sub)| (*id, Rc::clone(&sub.listener)))
            .collect();
        for (id, listener) in targets {
            if self.listeners.contains_key(&id) {
                listener(self, &event);
            }
        }
    }

    fn flush(&mut self) {
        let queued = std::mem::take(&mut self.queued);
        self.queued_positions.clear();
        if !queued.is_empty() {
            trace!(events = queued.len(), "flushing batched events");
        }
        for event in queued {
            self.dispatch(event);
        }
    }

    fn selector(&self, text: &str) -> Result<Rc<Selector>, HostError> {
        if let Some(sel) = self.selectors.borrow().get(text) {
            return Ok(Rc::clone(sel));
        }
        let parsed = Selector::parse(text).map_err(|err| HostError::InvalidSelector {
            selector: text.to_owned(),
            reason: err.to_string(),
        })?;
        let parsed = Rc::new(parsed);
        self.selectors
            .borrow_mut()
            .insert(text.to_owned(), Rc::clone(&parsed));
        Ok(parsed)
    }
}

impl core::fmt::Debug for MemoryGraph {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryGraph")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("listeners", &self.listeners.len())
            .field("batch_depth", &self.batch_depth)
            .finish_non_exhaustive()
    }
}

impl GraphHost for MemoryGraph {
    fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    fn resolve_node(&self, key: &str) -> Option<NodeId> {
        self.node_keys.get(key).copied()
    }

    fn neighborhood(&self, node: NodeId) -> Vec<Element> {
        let Some(incident) = self.incident.get(&node) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(incident.len() * 2);
        let mut seen = FxHashSet::default();
        for &edge in incident {
            let Some(record) = self.edges.get(&edge) else {
                continue;
            };
            out.push(Element::Edge(edge));
            if let Some(other) = record.other(node) {
                if other != node && seen.insert(other) {
                    out.push(Element::Node(other));
                }
            }
        }
        out
    }

    fn edge_endpoints(&self, edge: EdgeId) -> Option<(NodeId, NodeId)> {
        self.edges.get(&edge).map(|e| (e.source, e.target))
    }

    fn position(&self, node: NodeId) -> Option<Position> {
        self.nodes.get(&node).map(|n| n.position)
    }

    fn set_position(&mut self, node: NodeId, position: Position) {
        let Some(record) = self.nodes.get_mut(&node) else {
            trace!(node = %node, "position write to missing node ignored");
            return;
        };
        record.position = position;
        self.position_writes += 1;
        self.emit(GraphEvent::Position { node });
    }

    fn rendered_size(&self, node: NodeId) -> Size {
        self.nodes.get(&node).map(|n| n.size).unwrap_or_default()
    }

    fn extent(&self) -> BoundingBox {
        self.extent
    }

    fn validate_selector(&self, selector: &str) -> Result<(), HostError> {
        self.selector(selector).map(|_| ())
    }

    fn matches_selector(&self, node: NodeId, selector: &str) -> bool {
        self.selector_evaluations
            .set(self.selector_evaluations.get() + 1);
        let (Some(record), Ok(sel)) = (self.nodes.get(&node), self.selector(selector)) else {
            return false;
        };
        sel.matches(record)
    }

    fn on(&mut self, kinds: &[EventKind], scope: ElementScope, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(
            id,
            Subscription {
                kinds: kinds.to_vec(),
                scope,
                listener,
            },
        );
        id
    }

    fn off(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    fn emit(&mut self, event: GraphEvent) {
        if self.batch_depth == 0 {
            self.dispatch(event);
            return;
        }
        if let GraphEvent::Position { node } = event {
            if !self.queued_positions.insert(node) {
                return;
            }
        }
        self.queued.push(event);
    }

    fn batch(&mut self, f: &mut dyn FnMut(&mut dyn GraphHost)) {
        self.batches += 1;
        self.batch_depth += 1;
        f(self);
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            self.flush();
        }
    }
}
