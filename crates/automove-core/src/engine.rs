// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The batched update pass.
use std::rc::Rc;

use automove_geom::Position;
use rustc_hash::FxHashSet;
use tracing::{trace, warn};

use crate::event::GraphEvent;
use crate::host::GraphHost;
use crate::ident::{NodeId, RuleId};
use crate::registry::RegistryState;
use crate::rule::{NonFinitePolicy, Rule};

/// One position write performed by an update pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedMove {
    /// Rule that moved the node.
    pub rule: RuleId,
    /// The moved node.
    pub node: NodeId,
    /// Position before the write.
    pub from: Position,
    /// Position written.
    pub to: Position,
}

/// Outcome of one update pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    /// Writes in the order they were applied.
    pub moves: Vec<AppliedMove>,
    /// Removed nodes dropped from candidate lists.
    pub pruned: usize,
    /// The inactive rule that ended the pass early, if any.
    pub halted_by: Option<RuleId>,
    /// Rules skipped because a pass already held them.
    pub reentrant_skips: usize,
}

impl UpdateReport {
    /// Returns `true` if the pass wrote nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Nodes moved by the pass, in write order.
    pub fn moved_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.moves.iter().map(|m| m.node)
    }
}

/// Runs `rules` in order inside one host batch.
///
/// An inactive (disabled or destroyed) rule ends the whole pass: later rules
/// in the same call do not run. Rules are normally run as singleton batches,
/// so this only matters to callers passing several rules at once.
///
/// A rule entered by this pass stays claimed until the batch has closed and
/// the host has flushed its deferred events, so position events caused by
/// the rule's own writes cannot re-enter it.
pub(crate) fn run(
    host: &mut dyn GraphHost,
    registry: &RegistryState,
    rules: &[Rc<Rule>],
) -> UpdateReport {
    let mut report = UpdateReport::default();
    if rules.is_empty() {
        return report;
    }
    let mut entered: Vec<&Rule> = Vec::with_capacity(rules.len());
    host.batch(&mut |host: &mut dyn GraphHost| {
        for rule in rules {
            if rule.is_destroyed() || !rule.is_enabled() {
                trace!(
                    rule = %rule.id,
                    destroyed = rule.is_destroyed(),
                    "inactive rule halts update pass"
                );
                report.halted_by = Some(rule.id);
                break;
            }
            if !rule.enter() {
                trace!(rule = %rule.id, "rule already updating; skipped");
                report.reentrant_skips += 1;
                continue;
            }
            entered.push(rule);
            apply_rule(host, registry, rule, &mut report);
        }
    });
    for rule in entered {
        rule.leave();
    }
    report
}

fn apply_rule(
    host: &mut dyn GraphHost,
    registry: &RegistryState,
    rule: &Rule,
    report: &mut UpdateReport,
) {
    let list = rule.nodes.as_ref().unwrap_or(&registry.nodes);
    // Work on a copy: listeners fired by our own writes may push to the list.
    let candidates = list.borrow().clone();
    let mut stale = FxHashSet::default();

    for &node in candidates.iter().rev() {
        if !host.contains_node(node) {
            stale.insert(node);
            continue;
        }
        if !rule.matches(&*host, node) {
            continue;
        }
        let Some(current) = host.position(node) else {
            continue;
        };
        let target = rule.target(&*host, node, current);
        if !target.differs_from(current) {
            continue;
        }
        if !target.is_finite() {
            warn!(
                rule = %rule.id,
                node = %node,
                x = target.x,
                y = target.y,
                policy = ?rule.non_finite,
                "non-finite target position"
            );
            if rule.non_finite == NonFinitePolicy::Skip {
                continue;
            }
        }
        host.set_position(node, target);
        host.emit(GraphEvent::Automove { node });
        trace!(
            rule = %rule.id,
            node = %node,
            from = %current,
            to = %target,
            "automove applied"
        );
        report.moves.push(AppliedMove {
            rule: rule.id,
            node,
            from: current,
            to: target,
        });
    }

    if !stale.is_empty() {
        report.pruned += stale.len();
        list.borrow_mut().retain(|n| !stale.contains(n));
    }
}
