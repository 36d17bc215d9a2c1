// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use serde::{Deserialize, Serialize};

/// A point in model coordinates.
///
/// Components may be non-finite: the mean strategy over an empty
/// neighbourhood produces `NaN`, and that value is carried as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal model coordinate.
    pub x: f64,
    /// Vertical model coordinate.
    pub y: f64,
}

impl Position {
    /// The origin `(0, 0)`.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Constructs a position from its components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `true` when both components are finite (neither `NaN` nor infinite).
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Component-wise difference test.
    ///
    /// Mirrors the host's `!==` comparison: a `NaN` component is always
    /// considered different, including from another `NaN`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn differs_from(self, other: Self) -> bool {
        self.x != other.x || self.y != other.y
    }
}

impl core::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

/// Division by a zero divisor yields non-finite components rather than panicking.
impl core::ops::Div<f64> for Position {
    type Output = Self;

    fn div(self, divisor: f64) -> Self {
        Self::new(self.x / divisor, self.y / divisor)
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Rendered dimensions of a node (outer width and height, including border).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Outer width in model units.
    pub width: f64,
    /// Outer height in model units.
    pub height: f64,
}

impl Size {
    /// Constructs a size from width and height.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Half of the width.
    #[must_use]
    pub fn half_width(self) -> f64 {
        self.width / 2.0
    }

    /// Half of the height.
    #[must_use]
    pub fn half_height(self) -> f64 {
        self.height / 2.0
    }
}
