// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Position strategies: where a governed node should be.
use std::rc::Rc;

use automove_geom::{BoundingBox, Position};

use crate::error::AutomoveError;
use crate::host::GraphHost;
use crate::ident::NodeId;
use crate::matcher::{Matcher, NodeSpec};

/// Caller-supplied position function.
pub type PositionFn = Rc<dyn Fn(&dyn GraphHost, NodeId) -> Position>;

/// How a governed node's target position is derived.
#[derive(Clone, Default)]
pub enum Reposition {
    /// Average position of the node's neighbours (minus `mean_ignores`).
    #[default]
    Mean,
    /// Keep the node's whole rendered body inside the visible extent.
    Viewport,
    /// Clamp the node's position into a fixed box.
    Bounds(BoundingBox),
    /// Put the node wherever the function says.
    Custom(PositionFn),
}

impl Reposition {
    /// Wraps a closure as [`Reposition::Custom`].
    pub fn custom(f: impl Fn(&dyn GraphHost, NodeId) -> Position + 'static) -> Self {
        Self::Custom(Rc::new(f))
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Viewport => "viewport",
            Self::Bounds(_) => "bounds",
            Self::Custom(_) => "custom",
        }
    }
}

impl core::fmt::Debug for Reposition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bounds(bb) => f.debug_tuple("Bounds").field(bb).finish(),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Clone)]
enum Strategy {
    Mean { ignore: Matcher },
    Viewport,
    Bounds(BoundingBox),
    Custom(PositionFn),
}

/// A compiled [`Reposition`].
#[derive(Clone)]
pub struct Repositioner {
    strategy: Strategy,
}

impl Repositioner {
    /// Compiles `reposition`; `mean_ignores` is only consulted for
    /// [`Reposition::Mean`].
    ///
    /// # Errors
    /// Propagates host errors from compiling `mean_ignores`.
    pub fn compile(
        reposition: &Reposition,
        mean_ignores: &NodeSpec,
        host: &dyn GraphHost,
    ) -> Result<Self, AutomoveError> {
        let strategy = match reposition {
            Reposition::Mean => Strategy::Mean {
                ignore: Matcher::compile(mean_ignores, host)?,
            },
            Reposition::Viewport => Strategy::Viewport,
            Reposition::Bounds(bb) => Strategy::Bounds(*bb),
            Reposition::Custom(f) => Strategy::Custom(Rc::clone(f)),
        };
        Ok(Self { strategy })
    }

    /// Computes the target position of `node`, currently at `current`.
    ///
    /// The mean over an empty neighbourhood divides by zero and returns
    /// `NaN` components; callers decide what to do with that.
    pub fn target(&self, host: &dyn GraphHost, node: NodeId, current: Position) -> Position {
        match &self.strategy {
            Strategy::Mean { ignore } => mean_of_neighbours(host, node, ignore),
            Strategy::Viewport => host
                .extent()
                .shrink_by_half(host.rendered_size(node))
                .constrain(current),
            Strategy::Bounds(bb) => bb.constrain(current),
            Strategy::Custom(f) => f(host, node),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean_of_neighbours(host: &dyn GraphHost, node: NodeId, ignore: &Matcher) -> Position {
    let mut sum = Position::ORIGIN;
    let mut count = 0usize;
    for member in host.neighborhood(node).into_iter().filter_map(|el| el.as_node()) {
        if ignore.matches(host, member) {
            continue;
        }
        if let Some(pos) = host.position(member) {
            sum = sum + pos;
            count += 1;
        }
    }
    sum / count as f64
}
