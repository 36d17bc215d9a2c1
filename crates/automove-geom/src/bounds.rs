// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use serde::{Deserialize, Serialize};

use crate::{Position, Size};

/// Clamps `value` into `[min, max]`.
///
/// Unlike [`f64::clamp`] this never panics: when `min > max` the lower bound
/// wins for values below it and the upper bound wins otherwise, which is what
/// an oversized node inside a small viewport needs. `NaN` passes through.
#[must_use]
pub fn constrain(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Axis-aligned bounding box in model coordinates.
///
/// Field names follow the host convention (`x1`/`y1` top-left, `x2`/`y2`
/// bottom-right). No ordering invariant is enforced; see [`constrain`].
/// Deserialization rejects keys other than the four corners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundingBox {
    /// Minimum x.
    pub x1: f64,
    /// Minimum y.
    pub y1: f64,
    /// Maximum x.
    pub x2: f64,
    /// Maximum y.
    pub y2: f64,
}

impl BoundingBox {
    /// Constructs a box from its corner coordinates.
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width of the box (`x2 - x1`).
    #[must_use]
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    /// Height of the box (`y2 - y1`).
    #[must_use]
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Returns `true` if `pos` lies inside the box (inclusive on edges).
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x1 && pos.x <= self.x2 && pos.y >= self.y1 && pos.y <= self.y2
    }

    /// Shrinks every side inward by half of `size`.
    ///
    /// Used to keep a node's whole rendered body inside the box: clamping the
    /// node's centre into the shrunk box places its visual edges inside the
    /// original one.
    #[must_use]
    pub fn shrink_by_half(&self, size: Size) -> Self {
        let hw = size.half_width();
        let hh = size.half_height();
        Self {
            x1: self.x1 + hw,
            x2: self.x2 - hw,
            y1: self.y1 + hh,
            y2: self.y2 - hh,
        }
    }

    /// Clamps `pos` into the box, axis by axis.
    #[must_use]
    pub fn constrain(&self, pos: Position) -> Position {
        Position {
            x: constrain(pos.x, self.x1, self.x2),
            y: constrain(pos.y, self.y1, self.y2),
        }
    }
}
