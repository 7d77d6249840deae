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


//! Provides the 3D vector type used for positions and velocities.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A point or velocity in simulator space.
///
/// Serialized as a `{ x, y, z }` record, matching the simulator's own vector type.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// Forward axis; the paddles sit at opposite ends of it.
    pub x: f32,
    /// First axis of the paddle plane.
    pub y: f32,
    /// Second axis of the paddle plane.
    pub z: f32,
}

impl Vec3 {
    /// The origin, or a body at rest.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// All components `1.0`.
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    /// Creates a vector from its components.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Component-wise absolute value.
    #[inline]
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Distance between the two points projected onto the y/z plane.
    ///
    /// Paddles move only on this plane, so tracking quality ignores the forward axis.
    #[inline]
    pub fn planar_distance_yz(&self, other: Self) -> f32 {
        (self.y - other.y).hypot(self.z - other.z)
    }

    /// Returns `true` if no component is NaN or infinite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}
