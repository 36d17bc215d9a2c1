// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rule options and the compiled rule record.
use std::cell::{Cell, RefCell};

use automove_geom::Position;

use crate::event::{ElementScope, EventKind};
use crate::host::GraphHost;
use crate::ident::{ListenerId, NodeId, RuleId};
use crate::matcher::{Matcher, NodeSpec};
use crate::strategy::{Reposition, Repositioner};
use crate::trigger::When;

/// What the update pass does with a target that has a non-finite component.
///
/// The only built-in source of such targets is [`Reposition::Mean`] over a
/// neighbourhood that is empty once `mean_ignores` is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NonFinitePolicy {
    /// Write the target as computed (and log a warning).
    #[default]
    Apply,
    /// Leave the node where it is (and log a warning).
    Skip,
}

/// Declarative description of one rule, consumed by
/// [`Automove::register`](crate::Automove::register).
#[derive(Default)]
pub struct RuleOptions {
    /// Nodes the rule governs. Defaults to none.
    pub nodes_matching: NodeSpec,
    /// How a governed node's target is computed. Defaults to [`Reposition::Mean`].
    pub reposition: Reposition,
    /// Nodes left out of the mean. Defaults to none.
    pub mean_ignores: NodeSpec,
    /// When the rule recomputes. Defaults to [`When::Auto`].
    pub when: When,
    /// Handling of non-finite targets.
    pub non_finite: NonFinitePolicy,
}

impl core::fmt::Debug for RuleOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RuleOptions")
            .field("nodes_matching", &self.nodes_matching)
            .field("reposition", &self.reposition)
            .field("mean_ignores", &self.mean_ignores)
            .field("when", &self.when)
            .field("non_finite", &self.non_finite)
            .finish()
    }
}

/// One host subscription owned by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Binding {
    pub(crate) id: ListenerId,
    pub(crate) kinds: Vec<EventKind>,
    pub(crate) scope: ElementScope,
}

/// A compiled rule.
///
/// Shared between the registry, its handle and every listener bound for it;
/// all mutable state is in cells.
pub(crate) struct Rule {
    pub(crate) id: RuleId,
    matcher: Matcher,
    repositioner: Repositioner,
    /// Explicit candidate list, present only for node-set rules.
    pub(crate) nodes: Option<RefCell<Vec<NodeId>>>,
    pub(crate) non_finite: NonFinitePolicy,
    enabled: Cell<bool>,
    destroyed: Cell<bool>,
    in_progress: Cell<bool>,
    bindings: RefCell<Vec<Binding>>,
}

impl Rule {
    pub(crate) fn new(
        id: RuleId,
        matcher: Matcher,
        repositioner: Repositioner,
        nodes: Option<Vec<NodeId>>,
        non_finite: NonFinitePolicy,
    ) -> Self {
        Self {
            id,
            matcher,
            repositioner,
            nodes: nodes.map(RefCell::new),
            non_finite,
            enabled: Cell::new(true),
            destroyed: Cell::new(false),
            in_progress: Cell::new(false),
            bindings: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn matches(&self, host: &dyn GraphHost, node: NodeId) -> bool {
        self.matcher.matches(host, node)
    }

    pub(crate) fn target(&self, host: &dyn GraphHost, node: NodeId, current: Position) -> Position {
        self.repositioner.target(host, node, current)
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub(crate) fn set_enabled(&self, on: bool) {
        self.enabled.set(on);
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// Marks the rule destroyed. Returns `false` if it already was.
    pub(crate) fn mark_destroyed(&self) -> bool {
        !self.destroyed.replace(true)
    }

    /// Claims the rule for an update pass. Returns `false` if a pass already
    /// holds it.
    pub(crate) fn enter(&self) -> bool {
        !self.in_progress.replace(true)
    }

    pub(crate) fn leave(&self) {
        self.in_progress.set(false);
    }

    pub(crate) fn record_binding(&self, binding: Binding) {
        self.bindings.borrow_mut().push(binding);
    }

    pub(crate) fn binding_count(&self) -> usize {
        self.bindings.borrow().len()
    }

    /// Unsubscribes every binding exactly once; returns how many were removed.
    pub(crate) fn unbind_all(&self, host: &mut dyn GraphHost) -> usize {
        let bindings = std::mem::take(&mut *self.bindings.borrow_mut());
        let mut removed = 0;
        for binding in bindings {
            if host.off(binding.id) {
                removed += 1;
            } else {
                tracing::trace!(
                    rule = %self.id,
                    listener = binding.id.0,
                    kinds = ?binding.kinds,
                    scope = ?binding.scope,
                    "binding already gone from host"
                );
            }
        }
        removed
    }
}

impl core::fmt::Debug for Rule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("matcher", &self.matcher)
            .field("explicit_nodes", &self.nodes.as_ref().map(|n| n.borrow().len()))
            .field("enabled", &self.enabled.get())
            .field("destroyed", &self.destroyed.get())
            .field("bindings", &self.bindings.borrow().len())
            .finish_non_exhaustive()
    }
}
