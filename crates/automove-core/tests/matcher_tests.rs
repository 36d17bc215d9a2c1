// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Node specs compile into membership tests that tolerate node removal.

mod common;

use automove_core::{
    Automove, AutomoveError, GraphHost, HostError, Matcher, NodeSpec, Reposition, RuleOptions,
};
use automove_geom::Position;
use common::{labelled_pair, pos};

#[test]
fn each_spec_kind_matches_exactly_its_nodes() {
    let fx = labelled_pair();
    let g = &fx.graph;

    let by_predicate = Matcher::compile(
        &NodeSpec::predicate(|host: &dyn GraphHost, n| {
            host.position(n).is_some_and(|p| p.x > 20.0)
        }),
        g,
    )
    .unwrap();
    let by_selector = Matcher::compile(&NodeSpec::selector("node.label, #x"), g).unwrap();
    let by_set = Matcher::compile(&NodeSpec::nodes([fx.a, fx.b]), g).unwrap();
    let nothing = Matcher::compile(&NodeSpec::Nothing, g).unwrap();

    for node in g.node_ids() {
        let expect_pred = node == fx.label || node == fx.x;
        assert_eq!(by_predicate.matches(g, node), expect_pred, "{node}");
        assert_eq!(by_selector.matches(g, node), expect_pred, "{node}");
        assert_eq!(by_set.matches(g, node), node == fx.a || node == fx.b, "{node}");
        assert!(!nothing.matches(g, node));
        assert!(!Matcher::nothing().matches(g, node));
    }
}

#[test]
fn removed_nodes_never_match_and_predicates_are_not_consulted() {
    let mut fx = labelled_pair();
    let set = Matcher::compile(&NodeSpec::nodes([fx.label]), &fx.graph).unwrap();
    let always = Matcher::compile(
        &NodeSpec::predicate(|host: &dyn GraphHost, n| {
            assert!(host.contains_node(n), "predicate ran on a removed node");
            true
        }),
        &fx.graph,
    )
    .unwrap();

    fx.graph.remove_node(fx.label).unwrap();
    assert!(!set.matches(&fx.graph, fx.label));
    assert!(!always.matches(&fx.graph, fx.label));
}

#[test]
fn node_set_rules_never_evaluate_selectors() {
    let mut fx = labelled_pair();
    let automove = Automove::new();
    automove
        .register(
            &mut fx.graph,
            RuleOptions {
                nodes_matching: NodeSpec::nodes([fx.label]),
                ..RuleOptions::default()
            },
        )
        .unwrap();
    fx.graph.set_position(fx.a, Position::new(2.0, 2.0));

    assert_eq!(pos(&fx.graph, fx.label), Position::new(6.0, 11.0));
    assert_eq!(fx.graph.selector_evaluations(), 0);
}

#[test]
fn selector_rules_do_evaluate_selectors() {
    let mut fx = labelled_pair();
    let automove = Automove::new();
    automove
        .register(
            &mut fx.graph,
            RuleOptions {
                nodes_matching: NodeSpec::selector(".label"),
                ..RuleOptions::default()
            },
        )
        .unwrap();

    assert_eq!(pos(&fx.graph, fx.label), Position::new(5.0, 10.0));
    assert!(fx.graph.selector_evaluations() > 0);
}

#[test]
fn invalid_selector_fails_registration_without_binding_anything() {
    let mut fx = labelled_pair();
    let automove = Automove::new();
    let err = automove
        .register(
            &mut fx.graph,
            RuleOptions {
                nodes_matching: NodeSpec::selector("node ~ .label"),
                ..RuleOptions::default()
            },
        )
        .unwrap_err();

    assert!(matches!(
        err,
        AutomoveError::Host(HostError::InvalidSelector { ref selector, .. })
            if selector == "node ~ .label"
    ));
    assert_eq!(fx.graph.listener_count(), 0);
    assert_eq!(automove.rule_count(), 0);
    assert!(!automove.is_tracking());
}

#[test]
fn invalid_mean_ignores_selector_is_rejected_too() {
    let mut fx = labelled_pair();
    let automove = Automove::new();
    let err = automove
        .register(
            &mut fx.graph,
            RuleOptions {
                nodes_matching: NodeSpec::nodes([fx.label]),
                reposition: Reposition::Mean,
                mean_ignores: NodeSpec::selector("[unclosed"),
                ..RuleOptions::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, AutomoveError::Host(_)));
    assert_eq!(fx.graph.listener_count(), 0);
}
