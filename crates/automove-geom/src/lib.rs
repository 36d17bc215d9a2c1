// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! automove-geom: planar geometry primitives shared by the automove crates.
//!
//! Everything here is expressed in *model* coordinates (the host graph's
//! coordinate space, not screen pixels). Values are `f64` so that positions
//! round-trip exactly through the host without precision loss.
#![forbid(unsafe_code)]

mod bounds;
mod position;

pub use bounds::{constrain, BoundingBox};
pub use position::{Position, Size};
