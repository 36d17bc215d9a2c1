// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Trigger binding: which host events make a rule recompute.
//!
//! The automatic triggers subscribe as narrowly as the strategy allows so
//! that an unrelated position change does not run a full update pass.
use std::rc::Rc;

use crate::engine::{self, UpdateReport};
use crate::event::{ElementScope, EventKind, GraphEvent, Listener};
use crate::host::GraphHost;
use crate::ident::{ListenerId, NodeId};
use crate::registry::RegistryState;
use crate::rule::{Binding, Rule};
use crate::strategy::Reposition;

/// Caller-supplied scheduling function, run once at registration.
pub type Scheduler = Box<dyn FnOnce(&mut TriggerContext<'_>)>;

/// When a rule recomputes.
#[derive(Default)]
pub enum When {
    /// Chosen from the reposition strategy (see [`TriggerPlan`]).
    #[default]
    Auto,
    /// On position changes of nodes the rule matches.
    Matching,
    /// Whenever the caller's scheduler invokes its [`Updater`].
    ///
    /// Ignored for `Mean`, `Viewport` and `Bounds` strategies, which always
    /// use their own trigger.
    Custom(Scheduler),
}

impl When {
    /// Wraps a closure as [`When::Custom`].
    pub fn custom(f: impl FnOnce(&mut TriggerContext<'_>) + 'static) -> Self {
        Self::Custom(Box::new(f))
    }
}

impl core::fmt::Debug for When {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Auto => f.write_str("Auto"),
            Self::Matching => f.write_str("Matching"),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// The subscription scheme bound for a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPlan {
    /// Position changes next to a governed, connected node, and edge changes
    /// touching one.
    NeighbourhoodMean,
    /// Position changes of governed nodes.
    MatchingNodes,
    /// Position changes of any node.
    AnyPosition,
    /// Left to the caller's scheduler.
    Custom,
}

impl TriggerPlan {
    /// Chooses the plan for a strategy / `when` combination.
    #[must_use]
    pub fn select(reposition: &Reposition, when: &When) -> Self {
        match (reposition, when) {
            (Reposition::Mean, _) => Self::NeighbourhoodMean,
            (Reposition::Bounds(_) | Reposition::Viewport, _) | (_, When::Matching) => {
                Self::MatchingNodes
            }
            (Reposition::Custom(_), When::Custom(_)) => Self::Custom,
            (Reposition::Custom(_), When::Auto) => Self::AnyPosition,
        }
    }
}

/// Runs update passes for one rule.
///
/// Cloned into every listener bound for the rule; a pass for a destroyed
/// rule is a no-op.
#[derive(Clone)]
pub struct Updater {
    rule: Rc<Rule>,
    registry: Rc<RegistryState>,
}

impl Updater {
    pub(crate) fn new(rule: Rc<Rule>, registry: Rc<RegistryState>) -> Self {
        Self { rule, registry }
    }

    /// Runs one update pass for this rule.
    pub fn update(&self, host: &mut dyn GraphHost) -> UpdateReport {
        engine::run(host, &self.registry, std::slice::from_ref(&self.rule))
    }

    pub(crate) fn rule(&self) -> &Rule {
        &self.rule
    }
}

impl core::fmt::Debug for Updater {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Updater").field("rule", &self.rule.id).finish()
    }
}

/// What a [`Scheduler`] gets to work with.
pub struct TriggerContext<'h> {
    host: &'h mut dyn GraphHost,
    updater: Updater,
}

impl<'h> TriggerContext<'h> {
    pub(crate) fn new(host: &'h mut dyn GraphHost, updater: Updater) -> Self {
        Self { host, updater }
    }

    /// The host the rule is being registered on.
    pub fn host(&mut self) -> &mut (dyn GraphHost + 'h) {
        &mut *self.host
    }

    /// A handle that runs an update pass for the rule being registered.
    #[must_use]
    pub fn updater(&self) -> Updater {
        self.updater.clone()
    }

    /// Subscribes `callback` on the host and records the subscription on the
    /// rule, so destroying the rule removes it again.
    pub fn bind(
        &mut self,
        kinds: &[EventKind],
        scope: ElementScope,
        callback: impl Fn(&mut dyn GraphHost, &GraphEvent, &Updater) + 'static,
    ) -> ListenerId {
        let updater = self.updater.clone();
        let listener: Listener = Rc::new(move |host: &mut dyn GraphHost, event: &GraphEvent| {
            callback(host, event, &updater);
        });
        let id = self.host.on(kinds, scope, listener);
        self.updater.rule.record_binding(Binding {
            id,
            kinds: kinds.to_vec(),
            scope,
        });
        id
    }
}

/// A governed node whose neighbourhood holds more than one edge plus one
/// node; leaves and isolated nodes neither move a mean nor follow one.
fn governs_connected(rule: &Rule, host: &dyn GraphHost, node: NodeId) -> bool {
    rule.matches(host, node) && host.neighborhood(node).len() > 2
}

/// Binds the trigger for a freshly compiled rule and returns the plan used.
pub(crate) fn install(
    ctx: &mut TriggerContext<'_>,
    reposition: &Reposition,
    when: When,
) -> TriggerPlan {
    let plan = TriggerPlan::select(reposition, &when);
    if plan != TriggerPlan::Custom && matches!(when, When::Custom(_)) {
        tracing::warn!(
            plan = ?plan,
            "custom `when` scheduler ignored: the reposition strategy binds its own trigger"
        );
    }
    match plan {
        TriggerPlan::NeighbourhoodMean => {
            ctx.bind(&[EventKind::Position], ElementScope::Node, |host, event, updater| {
                let Some(moved) = event.node() else {
                    return;
                };
                let view: &dyn GraphHost = &*host;
                let affected = view
                    .neighborhood(moved)
                    .into_iter()
                    .filter_map(|el| el.as_node())
                    .any(|n| governs_connected(updater.rule(), view, n));
                if affected {
                    updater.update(host);
                }
            });
            ctx.bind(
                &[EventKind::Add, EventKind::Remove],
                ElementScope::Edge,
                |host, event, updater| {
                    let Some((source, target)) = event.endpoints() else {
                        return;
                    };
                    let view: &dyn GraphHost = &*host;
                    let affected = [source, target]
                        .into_iter()
                        .any(|n| governs_connected(updater.rule(), view, n));
                    if affected {
                        updater.update(host);
                    }
                },
            );
        }
        TriggerPlan::MatchingNodes => {
            ctx.bind(&[EventKind::Position], ElementScope::Node, |host, event, updater| {
                let Some(moved) = event.node() else {
                    return;
                };
                if updater.rule().matches(&*host, moved) {
                    updater.update(host);
                }
            });
        }
        TriggerPlan::AnyPosition => {
            ctx.bind(&[EventKind::Position], ElementScope::Node, |host, _event, updater| {
                updater.update(host);
            });
        }
        TriggerPlan::Custom => {
            if let When::Custom(scheduler) = when {
                scheduler(ctx);
            }
        }
    }
    plan
}
