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

use serde::{Deserialize, Serialize};

use crate::math::{Aabb, Vec3};

/// The state of a single rigid body as reported by the simulator.
///
/// Bodies are never mutated in place: a new [`WorldSnapshot`](super::WorldSnapshot)
/// replaces the whole body list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyState {
    /// Stable identifier, unique within a snapshot (e.g. `"paddle1"`, `"ball"`).
    pub id: String,
    /// World-space position of the body's center.
    pub position: Vec3,
    /// Linear velocity in units per second.
    pub velocity: Vec3,
    /// Whether the simulator integrates motion for this body.
    pub dynamic: bool,
    /// Collision volume of the body.
    #[serde(rename = "aabb")]
    pub bounding_volume: Aabb,
    /// Mass of the body (positive for dynamic bodies).
    pub mass: f32,
    /// Coefficient of restitution, typically in `[0, 1]`.
    pub restitution: f32,
}

impl RigidBodyState {
    /// Builds a body from its center and half-extents, deriving the bounding volume.
    pub fn from_extents(
        id: impl Into<String>,
        position: Vec3,
        velocity: Vec3,
        half_extents: Vec3,
        mass: f32,
        restitution: f32,
        dynamic: bool,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            velocity,
            dynamic,
            bounding_volume: Aabb::from_center_half_extents(position, half_extents),
            mass,
            restitution,
        }
    }
}
