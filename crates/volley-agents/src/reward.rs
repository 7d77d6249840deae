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


//! Per-tick reward shaping.

use volley_core::math::Vec3;
use volley_core::world::RigidBodyState;

use crate::action::Action;
use crate::config::RewardConfig;

/// The additive terms of one tick's reward.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RewardComponents {
    /// Tracking reward while the ball is on the defending half.
    pub proximity: f32,
    /// Bonus for a detected paddle contact.
    pub hit: f32,
    /// Penalty for the action's magnitude (zero or negative).
    pub action_cost: f32,
    /// Score bonus or concede penalty.
    pub terminal: f32,
}

impl RewardComponents {
    /// Sum of the shaping terms, without the terminal adjustment.
    pub fn shaping(&self) -> f32 {
        self.proximity + self.hit + self.action_cost
    }

    /// The full reward.
    pub fn total(&self) -> f32 {
        self.shaping() + self.terminal
    }
}

/// Score movements observed in one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChange {
    /// Player 1 (the agent) scored.
    pub scored: bool,
    /// Player 2 scored.
    pub conceded: bool,
}

impl ScoreChange {
    /// Returns `true` if either side scored.
    pub fn any(&self) -> bool {
        self.scored || self.conceded
    }
}

/// Computes the shaping terms for the agent's paddle.
///
/// A hit is inferred, not observed: the ball's x velocity must have jumped by
/// more than `hit_velocity_delta` since the previous tick while the ball is
/// inside the hit zone. No contact event is available from the simulator.
pub fn shaping_reward(
    config: &RewardConfig,
    paddle: &RigidBodyState,
    ball: &RigidBodyState,
    previous_ball_velocity: Option<Vec3>,
    action: &Action,
) -> RewardComponents {
    let tracked = ball.position.is_finite() && paddle.position.is_finite();
    let proximity = if tracked && ball.position.x < config.proximity_threshold_x {
        let distance = paddle.position.planar_distance_yz(ball.position);
        config.proximity_scale * (-distance / config.proximity_decay).exp()
    } else {
        0.0
    };

    let hit = match previous_ball_velocity {
        Some(previous)
            if (ball.velocity.x - previous.x).abs() > config.hit_velocity_delta
                && ball.position.x < config.hit_zone_x =>
        {
            config.hit_bonus
        }
        _ => 0.0,
    };

    RewardComponents {
        proximity,
        hit,
        action_cost: -config.action_cost * action.magnitude(),
        terminal: 0.0,
    }
}

/// Terminal adjustment for a tick's score movement. Both terms apply if both
/// players scored since the previous tick.
pub fn terminal_reward(config: &RewardConfig, change: ScoreChange) -> f32 {
    let mut reward = 0.0;
    if change.scored {
        reward += config.score_bonus;
    }
    if change.conceded {
        reward -= config.concede_penalty;
    }
    reward
}
