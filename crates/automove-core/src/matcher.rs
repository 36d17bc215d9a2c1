// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Compiles node specifications into membership tests.
use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::error::AutomoveError;
use crate::host::GraphHost;
use crate::ident::NodeId;

/// Caller-supplied node predicate.
pub type NodePredicate = Rc<dyn Fn(&dyn GraphHost, NodeId) -> bool>;

/// Which nodes a rule option refers to.
#[derive(Clone, Default)]
pub enum NodeSpec {
    /// No node.
    #[default]
    Nothing,
    /// Nodes for which the predicate returns `true`.
    Predicate(NodePredicate),
    /// Nodes matching a host selector.
    Selector(String),
    /// A fixed set of nodes.
    ///
    /// Membership is a hash lookup, so this is the cheapest spec to evaluate;
    /// when used for `nodes_matching` it also becomes the rule's candidate
    /// list, so the update pass never scans unrelated nodes.
    NodeSet(Vec<NodeId>),
}

impl NodeSpec {
    /// Wraps a closure as a [`NodeSpec::Predicate`].
    pub fn predicate(f: impl Fn(&dyn GraphHost, NodeId) -> bool + 'static) -> Self {
        Self::Predicate(Rc::new(f))
    }

    /// Builds a [`NodeSpec::Selector`].
    pub fn selector(selector: impl Into<String>) -> Self {
        Self::Selector(selector.into())
    }

    /// Builds a [`NodeSpec::NodeSet`].
    pub fn nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self::NodeSet(nodes.into_iter().collect())
    }
}

impl core::fmt::Debug for NodeSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Nothing => f.write_str("Nothing"),
            Self::Predicate(_) => f.write_str("Predicate(<fn>)"),
            Self::Selector(s) => f.debug_tuple("Selector").field(s).finish(),
            Self::NodeSet(nodes) => f.debug_tuple("NodeSet").field(&nodes.len()).finish(),
        }
    }
}

#[derive(Clone)]
enum Test {
    Nothing,
    Predicate(NodePredicate),
    Selector(Rc<str>),
    Set(Rc<FxHashSet<NodeId>>),
}

/// A compiled membership test.
///
/// Every test first checks that the node still exists, so a removed node
/// never matches and predicates/selectors are never run against one.
#[derive(Clone)]
pub struct Matcher {
    test: Test,
}

impl Matcher {
    /// Compiles `spec`, asking the host to validate selectors up front.
    ///
    /// # Errors
    /// Returns [`AutomoveError::Host`] when the host rejects a selector.
    pub fn compile(spec: &NodeSpec, host: &dyn GraphHost) -> Result<Self, AutomoveError> {
        let test = match spec {
            NodeSpec::Nothing => Test::Nothing,
            NodeSpec::Predicate(f) => Test::Predicate(Rc::clone(f)),
            NodeSpec::Selector(s) => {
                host.validate_selector(s)?;
                Test::Selector(Rc::from(s.as_str()))
            }
            NodeSpec::NodeSet(nodes) => Test::Set(Rc::new(nodes.iter().copied().collect())),
        };
        Ok(Self { test })
    }

    /// A matcher that never matches.
    #[must_use]
    pub fn nothing() -> Self {
        Self {
            test: Test::Nothing,
        }
    }

    /// Returns `true` if `node` exists and satisfies the compiled spec.
    pub fn matches(&self, host: &dyn GraphHost, node: NodeId) -> bool {
        if !host.contains_node(node) {
            return false;
        }
        match &self.test {
            Test::Nothing => false,
            Test::Predicate(f) => f(host, node),
            Test::Selector(s) => host.matches_selector(node, s),
            Test::Set(set) => set.contains(&node),
        }
    }
}

impl core::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let kind = match &self.test {
            Test::Nothing => "nothing",
            Test::Predicate(_) => "predicate",
            Test::Selector(_) => "selector",
            Test::Set(_) => "node-set",
        };
        f.debug_struct("Matcher").field("kind", &kind).finish()
    }
}
