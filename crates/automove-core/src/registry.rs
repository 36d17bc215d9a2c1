// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-host rule registry.
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::engine::{self, UpdateReport};
use crate::error::AutomoveError;
use crate::event::{ElementScope, EventKind, GraphEvent, Listener};
use crate::handle::RuleHandle;
use crate::host::GraphHost;
use crate::ident::{ListenerId, NodeId, RuleId};
use crate::matcher::{Matcher, NodeSpec};
use crate::rule::{Rule, RuleOptions};
use crate::strategy::Repositioner;
use crate::trigger::{self, TriggerContext, Updater};

/// Shared state behind [`Automove`], its handles and its listeners.
#[derive(Debug, Default)]
pub(crate) struct RegistryState {
    pub(crate) rules: RefCell<Vec<Rc<Rule>>>,
    /// Candidate list for rules without an explicit node set; mirrors the
    /// host's node add and remove events while at least one rule is
    /// registered.
    pub(crate) nodes: RefCell<Vec<NodeId>>,
    tracking: Cell<Option<ListenerId>>,
    next_rule: Cell<u64>,
}

impl RegistryState {
    fn next_rule_id(&self) -> RuleId {
        let id = self.next_rule.get();
        self.next_rule.set(id.wrapping_add(1));
        RuleId(id)
    }

    /// Seeds the shared node list and starts following node additions and
    /// removals.
    fn start_tracking(self: &Rc<Self>, host: &mut dyn GraphHost) {
        if self.tracking.get().is_some() {
            return;
        }
        *self.nodes.borrow_mut() = host.node_ids();
        let weak: Weak<Self> = Rc::downgrade(self);
        let listener: Listener = Rc::new(move |_host: &mut dyn GraphHost, event: &GraphEvent| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            match *event {
                GraphEvent::NodeAdded { node } => state.nodes.borrow_mut().push(node),
                GraphEvent::NodeRemoved { node } => {
                    state.nodes.borrow_mut().retain(|&n| n != node);
                }
                _ => {}
            }
        });
        let id = host.on(
            &[EventKind::Add, EventKind::Remove],
            ElementScope::Node,
            listener,
        );
        self.tracking.set(Some(id));
        debug!(
            listener = id.0,
            seeded = self.nodes.borrow().len(),
            "node tracking started"
        );
    }

    fn stop_tracking(&self, host: &mut dyn GraphHost) {
        if let Some(id) = self.tracking.take() {
            host.off(id);
            self.nodes.borrow_mut().clear();
            debug!(listener = id.0, "node tracking stopped");
        }
    }

    /// Drops `rule` from the registry, stopping node tracking when it was the
    /// last one.
    pub(crate) fn remove_rule(&self, rule: &Rc<Rule>, host: &mut dyn GraphHost) {
        let now_empty = {
            let mut rules = self.rules.borrow_mut();
            rules.retain(|r| !Rc::ptr_eq(r, rule));
            rules.is_empty()
        };
        if now_empty {
            self.stop_tracking(host);
        }
    }
}

/// Registry of automove rules attached to one host instance.
///
/// Create one per host and keep it next to the host; cloning shares the same
/// registry. All rules, listeners and handles are single-threaded.
#[derive(Debug, Clone, Default)]
pub struct Automove {
    state: Rc<RegistryState>,
}

impl Automove {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `options` into a rule, binds its trigger and runs one initial
    /// update pass.
    ///
    /// Nothing is bound on the host if compilation fails.
    ///
    /// # Errors
    /// Returns [`AutomoveError::Host`] when the host rejects a selector in
    /// `nodes_matching` or `mean_ignores`.
    pub fn register(
        &self,
        host: &mut dyn GraphHost,
        options: RuleOptions,
    ) -> Result<RuleHandle, AutomoveError> {
        let RuleOptions {
            nodes_matching,
            reposition,
            mean_ignores,
            when,
            non_finite,
        } = options;

        let matcher = Matcher::compile(&nodes_matching, &*host)?;
        let repositioner = Repositioner::compile(&reposition, &mean_ignores, &*host)?;
        let explicit = match nodes_matching {
            NodeSpec::NodeSet(nodes) => Some(nodes),
            _ => None,
        };

        let id = self.state.next_rule_id();
        let rule = Rc::new(Rule::new(id, matcher, repositioner, explicit, non_finite));

        if self.state.rules.borrow().is_empty() {
            self.state.start_tracking(host);
        }

        let updater = Updater::new(Rc::clone(&rule), Rc::clone(&self.state));
        let plan = {
            let mut ctx = TriggerContext::new(&mut *host, updater);
            trigger::install(&mut ctx, &reposition, when)
        };

        self.state.rules.borrow_mut().push(Rc::clone(&rule));
        debug!(
            rule = %id,
            reposition = reposition.name(),
            trigger = ?plan,
            bindings = rule.binding_count(),
            "rule registered"
        );

        let handle = RuleHandle::new(rule, Rc::clone(&self.state));
        handle.apply(host);
        Ok(handle)
    }

    /// Runs every registered rule, in registration order, in one pass.
    pub fn update(&self, host: &mut dyn GraphHost) -> UpdateReport {
        let rules = self.state.rules.borrow().clone();
        engine::run(host, &self.state, &rules)
    }

    /// Runs the given rules, in order, in one pass.
    ///
    /// A disabled or destroyed rule ends the pass; see [`UpdateReport::halted_by`].
    pub fn update_rules(&self, host: &mut dyn GraphHost, rules: &[&RuleHandle]) -> UpdateReport {
        let rules: Vec<Rc<Rule>> = rules.iter().map(|h| h.rule_rc()).collect();
        engine::run(host, &self.state, &rules)
    }

    /// Destroys every rule and stops node tracking.
    pub fn destroy_all(&self, host: &mut dyn GraphHost) {
        let rules = std::mem::take(&mut *self.state.rules.borrow_mut());
        let count = rules.len();
        for rule in rules {
            if rule.mark_destroyed() {
                rule.unbind_all(host);
            }
        }
        self.state.stop_tracking(host);
        debug!(rules = count, "all rules destroyed");
    }

    /// Handles for every live rule, in registration order.
    #[must_use]
    pub fn rules(&self) -> Vec<RuleHandle> {
        self.state
            .rules
            .borrow()
            .iter()
            .map(|r| RuleHandle::new(Rc::clone(r), Rc::clone(&self.state)))
            .collect()
    }

    /// Number of live rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.state.rules.borrow().len()
    }

    /// Length of the shared node list.
    #[must_use]
    pub fn tracked_node_count(&self) -> usize {
        self.state.nodes.borrow().len()
    }

    /// Returns `true` while the registry follows node additions and removals
    /// on the host.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.state.tracking.get().is_some()
    }
}
