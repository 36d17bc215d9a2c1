// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;

use automove_core::{ElementScope, EventKind, GraphEvent, GraphHost, NodeId};
use automove_geom::Position;
use automove_graph::MemoryGraph;

/// A label node `L` between two anchors `a` (0,0) and `b` (10,20), plus an
/// unrelated node `x` (100,100). `L` starts at (50,50).
pub struct Fixture {
    pub graph: MemoryGraph,
    pub a: NodeId,
    pub b: NodeId,
    pub label: NodeId,
    pub x: NodeId,
}

pub fn labelled_pair() -> Fixture {
    let mut graph = MemoryGraph::new();
    let a = graph.add_node("a", Position::new(0.0, 0.0)).unwrap();
    let b = graph.add_node("b", Position::new(10.0, 20.0)).unwrap();
    let label = graph.add_node("L", Position::new(50.0, 50.0)).unwrap();
    let x = graph.add_node("x", Position::new(100.0, 100.0)).unwrap();
    graph.add_class(label, "label").unwrap();
    graph.add_edge("aL", a, label).unwrap();
    graph.add_edge("Lb", label, b).unwrap();
    Fixture {
        graph,
        a,
        b,
        label,
        x,
    }
}

/// Records every `automove` notification delivered by the host.
pub fn automove_log(graph: &mut MemoryGraph) -> Rc<RefCell<Vec<NodeId>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    graph.on(
        &[EventKind::Automove],
        ElementScope::Node,
        Rc::new(move |_host: &mut dyn GraphHost, ev: &GraphEvent| {
            if let Some(node) = ev.node() {
                sink.borrow_mut().push(node);
            }
        }),
    );
    log
}

pub fn pos(graph: &MemoryGraph, node: NodeId) -> Position {
    graph.position(node).unwrap()
}
