// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Declarative (JSON) rule configuration.
//!
//! A rule file holds one rule object or an array of them:
//!
//! ```json
//! [
//!   { "nodesMatching": ".label", "reposition": "mean", "meanIgnores": ["hub"] },
//!   { "nodesMatching": ["legend"], "reposition": "viewport" },
//!   { "nodesMatching": "node", "reposition": { "x1": 0, "y1": 0, "x2": 800, "y2": 600 } }
//! ]
//! ```
//!
//! Strings are selectors, arrays are node sets (resolved through
//! [`GraphHost::resolve_node`]). Functions cannot be expressed here; use
//! [`RuleOptions`] directly for predicates, custom strategies and schedulers.
use automove_geom::BoundingBox;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AutomoveError;
use crate::host::GraphHost;
use crate::matcher::NodeSpec;
use crate::rule::{NonFinitePolicy, RuleOptions};
use crate::strategy::Reposition;
use crate::trigger::When;

const KNOWN_KEYS: [&str; 5] = [
    "nodesMatching",
    "reposition",
    "meanIgnores",
    "when",
    "nonFinite",
];

/// One rule as written in a rule file, before shape checking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    /// Selector string or array of node ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes_matching: Option<Value>,
    /// `"mean"`, `"viewport"` or `{x1, y1, x2, y2}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reposition: Option<Value>,
    /// Selector string or array of node ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_ignores: Option<Value>,
    /// `"matching"` or absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Value>,
    /// `"apply"` or `"skip"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_finite: Option<Value>,
}

impl RuleConfig {
    /// Reads one rule object, rejecting unknown keys.
    ///
    /// # Errors
    /// [`AutomoveError::Configuration`] if `value` is not an object or has an
    /// unrecognised key.
    pub fn from_value(value: &Value) -> Result<Self, AutomoveError> {
        let Value::Object(map) = value else {
            return Err(AutomoveError::configuration("rule", value));
        };
        if let Some(key) = map.keys().find(|k| !KNOWN_KEYS.contains(&k.as_str())) {
            return Err(AutomoveError::configuration(
                "rule",
                format!("with unknown option `{key}`"),
            ));
        }
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Shape-checks every option and builds [`RuleOptions`].
    ///
    /// # Errors
    /// [`AutomoveError::Configuration`] naming the first option whose value
    /// has an unrecognised shape or references an unknown node.
    pub fn to_options(&self, host: &dyn GraphHost) -> Result<RuleOptions, AutomoveError> {
        Ok(RuleOptions {
            nodes_matching: node_spec("nodesMatching", self.nodes_matching.as_ref(), host)?,
            reposition: reposition(self.reposition.as_ref())?,
            mean_ignores: node_spec("meanIgnores", self.mean_ignores.as_ref(), host)?,
            when: when(self.when.as_ref())?,
            non_finite: non_finite(self.non_finite.as_ref())?,
        })
    }
}

/// Parses a rule file (one object or an array of objects).
///
/// # Errors
/// [`AutomoveError::Json`] for malformed JSON, [`AutomoveError::Configuration`]
/// for anything that is not a rule object.
pub fn parse_rule_file(text: &str) -> Result<Vec<RuleConfig>, AutomoveError> {
    let value: Value = serde_json::from_str(text)?;
    match &value {
        Value::Array(items) => items.iter().map(RuleConfig::from_value).collect(),
        Value::Object(_) => Ok(vec![RuleConfig::from_value(&value)?]),
        other => Err(AutomoveError::configuration("rule file", other)),
    }
}

fn node_spec(
    option: &'static str,
    value: Option<&Value>,
    host: &dyn GraphHost,
) -> Result<NodeSpec, AutomoveError> {
    match value {
        None | Some(Value::Null) => Ok(NodeSpec::Nothing),
        Some(Value::String(selector)) => Ok(NodeSpec::Selector(selector.clone())),
        Some(Value::Array(items)) => {
            let mut nodes = Vec::with_capacity(items.len());
            for item in items {
                let Value::String(key) = item else {
                    return Err(AutomoveError::configuration(option, item));
                };
                let Some(node) = host.resolve_node(key) else {
                    return Err(AutomoveError::configuration(
                        option,
                        format!("with unknown node `{key}`"),
                    ));
                };
                nodes.push(node);
            }
            Ok(NodeSpec::NodeSet(nodes))
        }
        Some(other) => Err(AutomoveError::configuration(option, other)),
    }
}

fn reposition(value: Option<&Value>) -> Result<Reposition, AutomoveError> {
    match value {
        None | Some(Value::Null) => Ok(Reposition::Mean),
        Some(Value::String(name)) => match name.as_str() {
            "mean" => Ok(Reposition::Mean),
            "viewport" => Ok(Reposition::Viewport),
            _ => Err(AutomoveError::configuration("reposition", format!("\"{name}\""))),
        },
        Some(obj @ Value::Object(_)) => serde_json::from_value::<BoundingBox>(obj.clone())
            .map(Reposition::Bounds)
            .map_err(|_| AutomoveError::configuration("reposition", obj)),
        Some(other) => Err(AutomoveError::configuration("reposition", other)),
    }
}

fn when(value: Option<&Value>) -> Result<When, AutomoveError> {
    match value {
        None | Some(Value::Null) => Ok(When::Auto),
        Some(Value::String(s)) if s == "matching" => Ok(When::Matching),
        Some(other) => Err(AutomoveError::configuration("when", other)),
    }
}

fn non_finite(value: Option<&Value>) -> Result<NonFinitePolicy, AutomoveError> {
    match value {
        None | Some(Value::Null) => Ok(NonFinitePolicy::Apply),
        Some(Value::String(s)) if s == "apply" => Ok(NonFinitePolicy::Apply),
        Some(Value::String(s)) if s == "skip" => Ok(NonFinitePolicy::Skip),
        Some(other) => Err(AutomoveError::configuration("nonFinite", other)),
    }
}
