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


//! Projection of a world snapshot into the agent's bounded observation vector.

use thiserror::Error;
use volley_core::math::{normalize_symmetric, scale_clamped, Vec3};
use volley_core::world::{RigidBodyState, WorldSnapshot};

use crate::config::{BodySlots, ObservationConfig};

/// Number of observation components.
pub const OBSERVATION_LEN: usize = 10;

/// Normalized view of the arena, every component in `[-1, 1]`:
///
/// | index | content |
/// |---|---|
/// | 0..3 | ball position (x, y, z) |
/// | 3..6 | ball velocity (x, y, z) |
/// | 6..8 | agent paddle position (y, z) |
/// | 8..10 | agent paddle velocity (y, z) |
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Observation([f32; OBSERVATION_LEN]);

impl Observation {
    /// The all-zero observation returned when no state is usable.
    pub const ZERO: Self = Self([0.0; OBSERVATION_LEN]);

    /// Returns the raw components.
    #[inline]
    pub fn as_array(&self) -> &[f32; OBSERVATION_LEN] {
        &self.0
    }

    /// Normalized ball position.
    pub fn ball_position(&self) -> [f32; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Normalized ball velocity.
    pub fn ball_velocity(&self) -> [f32; 3] {
        [self.0[3], self.0[4], self.0[5]]
    }

    /// Normalized paddle position on y and z.
    pub fn paddle_position(&self) -> [f32; 2] {
        [self.0[6], self.0[7]]
    }

    /// Normalized paddle velocity on y and z.
    pub fn paddle_velocity(&self) -> [f32; 2] {
        [self.0[8], self.0[9]]
    }
}

impl From<Observation> for [f32; OBSERVATION_LEN] {
    fn from(value: Observation) -> Self {
        value.0
    }
}

/// A configured slot is beyond the end of the snapshot's body list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("snapshot has {body_count} bodies, slot {slot} is missing")]
pub struct MissingBody {
    /// The slot that was looked up.
    pub slot: usize,
    /// Number of bodies actually present.
    pub body_count: usize,
}

/// Looks up a body by slot.
pub fn body_in_slot(snapshot: &WorldSnapshot, slot: usize) -> Result<&RigidBodyState, MissingBody> {
    snapshot.body_at(slot).ok_or(MissingBody {
        slot,
        body_count: snapshot.body_count(),
    })
}

/// Builds the observation for the ball and the agent's paddle.
pub fn build_observation(
    snapshot: &WorldSnapshot,
    slots: &BodySlots,
    config: &ObservationConfig,
) -> Result<Observation, MissingBody> {
    let ball = body_in_slot(snapshot, slots.ball)?;
    let paddle = body_in_slot(snapshot, slots.primary_paddle)?;

    let min = config.arena_min;
    let max = config.arena_max;
    let v_ref = config.max_velocity;
    let pos = |p: Vec3| {
        [
            normalize_symmetric(p.x, min.x, max.x),
            normalize_symmetric(p.y, min.y, max.y),
            normalize_symmetric(p.z, min.z, max.z),
        ]
    };
    let [bx, by, bz] = pos(ball.position);
    let [_, py, pz] = pos(paddle.position);

    Ok(Observation([
        bx,
        by,
        bz,
        scale_clamped(ball.velocity.x, v_ref),
        scale_clamped(ball.velocity.y, v_ref),
        scale_clamped(ball.velocity.z, v_ref),
        py,
        pz,
        scale_clamped(paddle.velocity.y, v_ref),
        scale_clamped(paddle.velocity.z, v_ref),
    ]))
}
