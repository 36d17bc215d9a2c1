// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! automove-core: declarative rules that keep graph nodes where they belong.
//!
//! A rule says which nodes it governs ([`NodeSpec`]), how their target
//! position is computed ([`Reposition`]) and when it recomputes ([`When`]).
//! Rules live in an [`Automove`] registry attached to one [`GraphHost`]; the
//! registry subscribes to the host's change events and rewrites positions in
//! batched update passes.
//!
//! ```ignore
//! let automove = Automove::new();
//! let rule = automove.register(&mut graph, RuleOptions {
//!     nodes_matching: NodeSpec::selector(".label"),
//!     reposition: Reposition::Mean,
//!     ..RuleOptions::default()
//! })?;
//! // ... later
//! rule.destroy(&mut graph);
//! ```
//!
//! Everything here is single-threaded: shared state lives behind `Rc` and
//! cells, and listeners may re-enter the registry while the host dispatches.
#![forbid(unsafe_code)]

mod config;
mod engine;
mod error;
mod event;
mod handle;
mod host;
mod ident;
mod matcher;
mod registry;
mod rule;
mod strategy;
mod trigger;

pub use automove_geom::{constrain, BoundingBox, Position, Size};
pub use config::{parse_rule_file, RuleConfig};
pub use engine::{AppliedMove, UpdateReport};
pub use error::AutomoveError;
pub use event::{ElementScope, EventKind, GraphEvent, Listener};
pub use handle::RuleHandle;
pub use host::{GraphHost, HostError};
pub use ident::{EdgeId, Element, ListenerId, NodeId, RuleId};
pub use matcher::{Matcher, NodePredicate, NodeSpec};
pub use registry::Automove;
pub use rule::{NonFinitePolicy, RuleOptions};
pub use strategy::{PositionFn, Reposition, Repositioner};
pub use trigger::{Scheduler, TriggerContext, TriggerPlan, Updater, When};
