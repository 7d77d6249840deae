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

use super::RigidBodyState;
use crate::math::{Aabb, Vec3};

/// Maximum length, in bytes, of a body identifier accepted by the simulator.
pub const MAX_BODY_ID_LEN: usize = 32;

/// A complete body description sent to the simulator.
///
/// Only `velocity` is meant to change; every other field is carried over from
/// the last known state of the body, because the simulator overwrites all of
/// them on receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingCommand {
    /// Identifier of the target body.
    pub body_id: String,
    /// The new velocity requested by the caller.
    pub velocity: Vec3,
    /// Carried-over position.
    pub position: Vec3,
    /// Carried-over collision volume.
    #[serde(rename = "aabb")]
    pub bounding_volume: Aabb,
    /// Carried-over mass.
    pub mass: f32,
    /// Carried-over restitution.
    pub restitution: f32,
    /// Carried-over dynamic flag.
    pub dynamic: bool,
}

impl OutgoingCommand {
    /// Builds a command that replaces only the velocity of `body`.
    pub fn from_body(body: &RigidBodyState, velocity: Vec3) -> Self {
        Self {
            body_id: body.id.clone(),
            velocity,
            position: body.position,
            bounding_volume: body.bounding_volume,
            mass: body.mass,
            restitution: body.restitution,
            dynamic: body.dynamic,
        }
    }
}
