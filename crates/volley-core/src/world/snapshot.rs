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

/// One complete, timestamped description of every tracked body plus the score.
///
/// A snapshot is immutable once constructed. Newer snapshots replace older
/// ones wholesale; they are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// All bodies, in the simulator's fixed slot order.
    pub bodies: Vec<RigidBodyState>,
    /// Simulation clock in seconds, monotonic within a session.
    #[serde(rename = "time")]
    pub simulation_time: f32,
    /// Points scored by player 1 (the primary agent's side).
    pub score_player1: u32,
    /// Points scored by player 2 (the opponent's side).
    pub score_player2: u32,
}

impl WorldSnapshot {
    /// Returns the body occupying `slot`, if the snapshot is long enough.
    #[inline]
    pub fn body_at(&self, slot: usize) -> Option<&RigidBodyState> {
        self.bodies.get(slot)
    }

    /// Finds a body by identifier.
    pub fn find_body(&self, id: &str) -> Option<&RigidBodyState> {
        self.bodies.iter().find(|body| body.id == id)
    }

    /// Returns the number of bodies in the snapshot.
    #[inline]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
