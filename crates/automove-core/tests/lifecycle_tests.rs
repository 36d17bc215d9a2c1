// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Registration, enable/disable, destroy and node tracking.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use automove_core::{
    Automove, GraphHost, NodeId, NodeSpec, Reposition, RuleHandle, RuleOptions, When,
};
use automove_geom::Position;
use automove_graph::MemoryGraph;
use common::{labelled_pair, pos};

fn mean_rule(automove: &Automove, graph: &mut MemoryGraph, label: NodeId) -> RuleHandle {
    automove
        .register(
            graph,
            RuleOptions {
                nodes_matching: NodeSpec::nodes([label]),
                ..RuleOptions::default()
            },
        )
        .unwrap()
}

/// A rule with no trigger: it only runs when asked, and puts `node` at
/// `(offset, y)`.
fn manual_rule(
    automove: &Automove,
    graph: &mut MemoryGraph,
    node: NodeId,
    offset: &Rc<Cell<f64>>,
    y: f64,
) -> RuleHandle {
    let offset = Rc::clone(offset);
    automove
        .register(
            graph,
            RuleOptions {
                nodes_matching: NodeSpec::nodes([node]),
                reposition: Reposition::custom(move |_host: &dyn GraphHost, _n| {
                    Position::new(offset.get(), y)
                }),
                when: When::custom(|_ctx| {}),
                ..RuleOptions::default()
            },
        )
        .unwrap()
}

#[test]
fn registration_runs_an_initial_update_and_binds_triggers() {
    let mut fx = labelled_pair();
    let automove = Automove::new();
    let rule = mean_rule(&automove, &mut fx.graph, fx.label);

    assert_eq!(pos(&fx.graph, fx.label), Position::new(5.0, 10.0));
    assert!(rule.enabled());
    assert!(!rule.is_destroyed());
    assert_eq!(rule.binding_count(), 2);
    assert!(automove.is_tracking());
    // node tracking + the two mean triggers
    assert_eq!(fx.graph.listener_count(), 3);
    assert_eq!(automove.rule_count(), 1);
    assert_eq!(automove.rules()[0].id(), rule.id());
}

#[test]
fn destroyed_rules_never_write_and_tracking_stops_with_the_last_rule() {
    let mut fx = labelled_pair();
    let automove = Automove::new();
    let first = mean_rule(&automove, &mut fx.graph, fx.label);
    let second = automove
        .register(
            &mut fx.graph,
            RuleOptions {
                nodes_matching: NodeSpec::nodes([fx.x]),
                reposition: Reposition::Viewport,
                ..RuleOptions::default()
            },
        )
        .unwrap();
    assert_eq!(fx.graph.listener_count(), 4);

    first.destroy(&mut fx.graph);
    assert!(first.is_destroyed());
    assert_eq!(first.binding_count(), 0);
    assert!(automove.is_tracking());
    assert_eq!(fx.graph.listener_count(), 2);

    let writes = fx.graph.position_writes();
    fx.graph.set_position(fx.a, Position::new(-40.0, 0.0));
    assert_eq!(fx.graph.position_writes(), writes + 1);
    assert_eq!(pos(&fx.graph, fx.label), Position::new(5.0, 10.0));

    let report = first.apply(&mut fx.graph);
    assert!(report.is_empty());
    assert_eq!(report.halted_by, Some(first.id()));

    second.destroy(&mut fx.graph);
    assert!(!automove.is_tracking());
    assert_eq!(automove.tracked_node_count(), 0);
    assert_eq!(fx.graph.listener_count(), 0);

    // nothing is listening for additions any more
    fx.graph.add_node("late", Position::new(1.0, 1.0)).unwrap();
    assert_eq!(automove.tracked_node_count(), 0);

    // idempotent
    second.destroy(&mut fx.graph);
    assert_eq!(automove.rule_count(), 0);
}

#[test]
fn destroy_all_unbinds_everything() {
    let mut fx = labelled_pair();
    let automove = Automove::new();
    let a = mean_rule(&automove, &mut fx.graph, fx.label);
    let b = automove
        .register(
            &mut fx.graph,
            RuleOptions {
                nodes_matching: NodeSpec::selector("#x"),
                reposition: Reposition::Bounds(automove_core::BoundingBox::new(
                    0.0, 0.0, 10.0, 10.0,
                )),
                ..RuleOptions::default()
            },
        )
        .unwrap();

    automove.destroy_all(&mut fx.graph);
    assert!(a.is_destroyed() && b.is_destroyed());
    assert_eq!(automove.rule_count(), 0);
    assert!(!automove.is_tracking());
    assert_eq!(fx.graph.listener_count(), 0);

    fx.graph.add_node("late", Position::new(1.0, 1.0)).unwrap();
    assert_eq!(automove.tracked_node_count(), 0);

    // a fresh rule starts tracking again, seeded from the host
    mean_rule(&automove, &mut fx.graph, fx.label);
    assert!(automove.is_tracking());
    assert_eq!(automove.tracked_node_count(), 5);
}

#[test]
fn tracking_follows_added_and_removed_nodes() {
    let mut fx = labelled_pair();
    let automove = Automove::new();
    let rule = automove
        .register(
            &mut fx.graph,
            RuleOptions {
                nodes_matching: NodeSpec::selector(".label"),
                reposition: Reposition::Bounds(automove_core::BoundingBox::new(
                    0.0, 0.0, 1000.0, 1000.0,
                )),
                ..RuleOptions::default()
            },
        )
        .unwrap();
    assert_eq!(automove.tracked_node_count(), 4);

    let late = fx.graph.add_node("late", Position::new(-1.0, -1.0)).unwrap();
    fx.graph.add_class(late, "label").unwrap();
    assert_eq!(automove.tracked_node_count(), 5);

    let report = rule.apply(&mut fx.graph);
    assert_eq!(report.moved_nodes().collect::<Vec<_>>(), vec![late]);
    assert_eq!(pos(&fx.graph, late), Position::new(0.0, 0.0));

    fx.graph.remove_node(fx.x).unwrap();
    assert_eq!(automove.tracked_node_count(), 4);
    let report = rule.apply(&mut fx.graph);
    assert_eq!(report.pruned, 0);
}

#[test]
fn node_churn_does_not_grow_the_shared_list_under_node_set_rules() {
    let mut fx = labelled_pair();
    let automove = Automove::new();
    let rule = automove
        .register(
            &mut fx.graph,
            RuleOptions {
                nodes_matching: NodeSpec::nodes([fx.x]),
                reposition: Reposition::Bounds(automove_core::BoundingBox::new(
                    0.0, 0.0, 10.0, 10.0,
                )),
                ..RuleOptions::default()
            },
        )
        .unwrap();

    for i in 0..1000 {
        let n = fx.graph.add_node(&format!("tmp{i}"), Position::ORIGIN).unwrap();
        fx.graph.remove_node(n).unwrap();
    }
    rule.apply(&mut fx.graph);
    automove.update(&mut fx.graph);

    assert_eq!(fx.graph.node_count(), 4);
    assert_eq!(automove.tracked_node_count(), 4);
}

#[test]
fn explicit_node_sets_drop_removed_nodes_on_the_next_pass() {
    let mut fx = labelled_pair();
    let automove = Automove::new();
    let rule = automove
        .register(
            &mut fx.graph,
            RuleOptions {
                nodes_matching: NodeSpec::nodes([fx.label, fx.x]),
                reposition: Reposition::Bounds(automove_core::BoundingBox::new(
                    0.0, 0.0, 1000.0, 1000.0,
                )),
                ..RuleOptions::default()
            },
        )
        .unwrap();

    fx.graph.remove_node(fx.x).unwrap();
    let report = rule.apply(&mut fx.graph);
    assert_eq!(report.pruned, 1);
    assert_eq!(rule.apply(&mut fx.graph).pruned, 0);
}

#[test]
fn no_op_update_is_idempotent() {
    let mut fx = labelled_pair();
    let automove = Automove::new();
    mean_rule(&automove, &mut fx.graph, fx.label);
    let writes = fx.graph.position_writes();

    let report = automove.update(&mut fx.graph);
    assert!(report.is_empty());
    assert_eq!(fx.graph.position_writes(), writes);
}

#[test]
fn an_inactive_rule_halts_the_rest_of_a_multi_rule_pass() {
    let mut fx = labelled_pair();
    let automove = Automove::new();
    let offset = Rc::new(Cell::new(0.0));
    let ra = manual_rule(&automove, &mut fx.graph, fx.a, &offset, 1.0);
    let rb = manual_rule(&automove, &mut fx.graph, fx.b, &offset, 2.0);
    let rc = manual_rule(&automove, &mut fx.graph, fx.x, &offset, 3.0);
    assert_eq!(rc.binding_count(), 0);

    offset.set(7.0);
    rb.disable();
    let report = automove.update_rules(&mut fx.graph, &[&ra, &rb, &rc]);
    assert_eq!(report.moved_nodes().collect::<Vec<_>>(), vec![fx.a]);
    assert_eq!(report.halted_by, Some(rb.id()));
    assert_eq!(pos(&fx.graph, fx.x), Position::new(0.0, 3.0));

    let report = automove.update_rules(&mut fx.graph, &[&rc]);
    assert_eq!(report.moved_nodes().collect::<Vec<_>>(), vec![fx.x]);
    assert_eq!(report.halted_by, None);
    assert_eq!(pos(&fx.graph, fx.x), Position::new(7.0, 3.0));
}

#[test]
fn toggle_flips_state_and_updates_when_enabled() {
    let mut fx = labelled_pair();
    let automove = Automove::new();
    let rule = mean_rule(&automove, &mut fx.graph, fx.label);

    assert!(rule.toggle(&mut fx.graph, None).is_empty());
    assert!(!rule.enabled());

    // disabled: dragging an anchor leaves the label behind
    fx.graph.set_position(fx.a, Position::new(10.0, 0.0));
    assert_eq!(pos(&fx.graph, fx.label), Position::new(5.0, 10.0));

    let report = rule.toggle(&mut fx.graph, None);
    assert!(rule.enabled());
    assert_eq!(report.moved_nodes().collect::<Vec<_>>(), vec![fx.label]);
    assert_eq!(pos(&fx.graph, fx.label), Position::new(10.0, 10.0));

    assert!(rule.toggle(&mut fx.graph, Some(true)).is_empty());
    rule.disable();
    assert!(!rule.enabled());
    rule.enable(&mut fx.graph);
    assert!(rule.enabled());
}
