// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::rc::Rc;

use tracing::debug;

use crate::engine::{self, UpdateReport};
use crate::host::GraphHost;
use crate::ident::RuleId;
use crate::registry::RegistryState;
use crate::rule::Rule;

/// Caller-side handle to one registered rule.
///
/// Handles are cheap to clone; all clones control the same rule.
#[derive(Clone)]
pub struct RuleHandle {
    rule: Rc<Rule>,
    registry: Rc<RegistryState>,
}

impl RuleHandle {
    pub(crate) fn new(rule: Rc<Rule>, registry: Rc<RegistryState>) -> Self {
        Self { rule, registry }
    }

    pub(crate) fn rule_rc(&self) -> Rc<Rule> {
        Rc::clone(&self.rule)
    }

    /// Registry-unique id of the rule.
    #[must_use]
    pub fn id(&self) -> RuleId {
        self.rule.id
    }

    /// Runs one update pass for this rule now.
    pub fn apply(&self, host: &mut dyn GraphHost) -> UpdateReport {
        engine::run(host, &self.registry, std::slice::from_ref(&self.rule))
    }

    /// Enables the rule and runs an update pass.
    pub fn enable(&self, host: &mut dyn GraphHost) -> UpdateReport {
        self.toggle(host, Some(true))
    }

    /// Disables the rule. Its bindings stay in place.
    pub fn disable(&self) {
        self.rule.set_enabled(false);
    }

    /// Sets the enabled state to `on`, or flips it when `on` is `None`.
    ///
    /// Ending up enabled runs an update pass; the returned report is empty
    /// otherwise.
    pub fn toggle(&self, host: &mut dyn GraphHost, on: Option<bool>) -> UpdateReport {
        let enabled = on.unwrap_or(!self.rule.is_enabled());
        self.rule.set_enabled(enabled);
        if enabled {
            self.apply(host)
        } else {
            UpdateReport::default()
        }
    }

    /// Returns `true` if the rule is enabled.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.rule.is_enabled()
    }

    /// Returns `true` once the rule has been destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.rule.is_destroyed()
    }

    /// Number of host subscriptions the rule currently owns.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.rule.binding_count()
    }

    /// Unbinds the rule's listeners and removes it from the registry.
    ///
    /// Destroying the last rule also stops the registry's node tracking.
    /// Calling this again is a no-op.
    pub fn destroy(&self, host: &mut dyn GraphHost) {
        if !self.rule.mark_destroyed() {
            return;
        }
        let removed = self.rule.unbind_all(host);
        self.registry.remove_rule(&self.rule, host);
        debug!(rule = %self.rule.id, bindings = removed, "rule destroyed");
    }
}

impl core::fmt::Debug for RuleHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RuleHandle")
            .field("rule", &self.rule)
            .finish_non_exhaustive()
    }
}
