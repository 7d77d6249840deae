// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! Provides the small set of 3D math primitives shared with the simulator.
//!
//! The simulator describes every body with `f32` vectors and axis-aligned
//! bounding boxes, so these types mirror that precision exactly to keep the
//! wire representation lossless.

pub mod geometry;
pub mod vector;

pub use self::geometry::Aabb;
pub use self::vector::Vec3;

/// Spans and references at or below this are treated as degenerate.
const DEGENERATE: f32 = 1e-5;

/// Maps `value` from the `[min, max]` range onto `[-1, 1]` and hard-clamps the result.
///
/// Values outside the source range saturate at the boundaries, infinities
/// included. NaN and a degenerate range (`max <= min`) map to `0.0`.
///
/// # Examples
///
/// ```
/// use volley_core::math::normalize_symmetric;
/// assert_eq!(normalize_symmetric(0.0, -30.0, 30.0), 0.0);
/// assert_eq!(normalize_symmetric(30.0, -30.0, 30.0), 1.0);
/// assert_eq!(normalize_symmetric(90.0, -30.0, 30.0), 1.0);
/// assert_eq!(normalize_symmetric(f32::NAN, -30.0, 30.0), 0.0);
/// ```
#[inline]
pub fn normalize_symmetric(value: f32, min: f32, max: f32) -> f32 {
    let span = max - min;
    if span.is_nan() || span <= DEGENERATE {
        return 0.0;
    }
    saturate(2.0 * (value - min) / span - 1.0)
}

/// Divides `value` by `reference` and hard-clamps the result to `[-1, 1]`.
///
/// NaN and a near-zero reference map to `0.0`.
#[inline]
pub fn scale_clamped(value: f32, reference: f32) -> f32 {
    if reference.is_nan() || reference.abs() <= DEGENERATE {
        return 0.0;
    }
    saturate(value / reference)
}

/// `f32::clamp` passes NaN through.
#[inline]
fn saturate(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(-1.0, 1.0)
    }
}
