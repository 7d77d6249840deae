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


//! Provides the axis-aligned bounding volume carried by every rigid body.

use serde::{Deserialize, Serialize};

use super::Vec3;

/// The collision box of a body, aligned with the world axes.
///
/// It travels with every body description on the wire. A well-formed box has
/// `min <= max` on every axis; see [`Aabb::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Lowest corner.
    pub min: Vec3,
    /// Highest corner.
    pub max: Vec3,
}

impl Aabb {
    /// Builds the box centred on `center`. Negative half-extents are flipped.
    #[inline]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Returns `true` if `min <= max` on every axis. Flat boxes are valid;
    /// a NaN corner is not.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_center_half_extents() {
        let paddle = Aabb::from_center_half_extents(
            Vec3::new(-25.0, 0.0, 0.0),
            Vec3::new(1.0, -3.0, 3.0),
        );
        assert_eq!(paddle.min, Vec3::new(-26.0, -3.0, -3.0));
        assert_eq!(paddle.max, Vec3::new(-24.0, 3.0, 3.0));
        assert!(paddle.is_valid());
    }

    #[test]
    fn test_validity() {
        let flat = Aabb {
            min: Vec3::ONE,
            max: Vec3::ONE,
        };
        assert!(flat.is_valid());

        let inverted = Aabb {
            min: Vec3::ONE,
            max: Vec3::ZERO,
        };
        assert!(!inverted.is_valid());

        let poisoned = Aabb {
            min: Vec3::new(f32::NAN, 0.0, 0.0),
            max: Vec3::ONE,
        };
        assert!(!poisoned.is_valid());
    }
}
