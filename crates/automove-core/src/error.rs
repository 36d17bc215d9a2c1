// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use thiserror::Error;

use crate::host::HostError;

/// Errors returned when registering or configuring a rule.
#[derive(Debug, Error)]
pub enum AutomoveError {
    /// A rule option has a shape the engine does not recognise.
    #[error("can not create {option} from specification {spec}")]
    Configuration {
        /// The option name as it appears in rule configuration.
        option: &'static str,
        /// Rendering of the rejected specification.
        spec: String,
    },
    /// The host rejected part of the rule (e.g. an invalid selector).
    #[error(transparent)]
    Host(#[from] HostError),
    /// Rule configuration text is not valid JSON.
    #[error("malformed rule configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl AutomoveError {
    pub(crate) fn configuration(option: &'static str, spec: impl core::fmt::Display) -> Self {
        Self::Configuration {
            option,
            spec: spec.to_string(),
        }
    }
}
