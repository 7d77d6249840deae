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


//! Ball-tracking scripted opponent.
//!
//! The opponent aims at the ball with Gaussian jitter and only re-aims once
//! its reaction delay has elapsed, so it commits to a stale aim point in
//! between. It moves at a fixed speed toward that point, expressed in the
//! same normalized action range as the agent.

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use volley_core::math::Vec3;

use crate::action::Action;
use crate::config::OpponentConfig;

/// Scripted controller for the second paddle.
///
/// Stateful per instance; call [`reset`](Self::reset) between episodes.
#[derive(Debug, Clone)]
pub struct ScriptedOpponent {
    config: OpponentConfig,
    reference_speed: f32,
    noise: Option<Normal<f32>>,
    rng: ChaCha8Rng,
    target: Option<[f32; 2]>,
    last_update: Option<Duration>,
}

impl ScriptedOpponent {
    /// Creates an opponent whose output is normalized by `reference_speed`,
    /// the agent's maximum paddle speed.
    pub fn new(config: OpponentConfig, reference_speed: f32) -> Self {
        let noise = if config.tracking_noise > 0.0 {
            match Normal::new(0.0, config.tracking_noise) {
                Ok(normal) => Some(normal),
                Err(e) => {
                    log::warn!("Disabling opponent tracking noise: {e}");
                    None
                }
            }
        } else {
            None
        };
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            config,
            reference_speed,
            noise,
            rng,
            target: None,
            last_update: None,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &OpponentConfig {
        &self.config
    }

    /// Returns the current aim point on y and z, if one was chosen.
    pub fn target(&self) -> Option<[f32; 2]> {
        self.target
    }

    /// Forgets the aim point so the next call re-aims immediately.
    pub fn reset(&mut self) {
        self.target = None;
        self.last_update = None;
    }

    /// Computes the opponent's normalized action.
    ///
    /// `now` is a monotonic timestamp on any fixed epoch; only differences
    /// between successive calls matter.
    pub fn compute_action(&mut self, paddle: Vec3, ball: Vec3, now: Duration) -> Action {
        let [target_y, target_z] = match (self.target, self.last_update) {
            (Some(target), Some(last)) if !self.reaction_elapsed(last, now) => target,
            _ => self.retarget(ball, now),
        };

        let dy = target_y - paddle.y;
        let dz = target_z - paddle.z;
        let distance = (dy * dy + dz * dz).sqrt();
        if distance <= self.config.target_epsilon {
            return Action::ZERO;
        }

        let speed = self.config.max_speed;
        Action::from_velocity(
            Vec3::new(0.0, dy / distance * speed, dz / distance * speed),
            self.reference_speed,
        )
    }

    fn reaction_elapsed(&self, last: Duration, now: Duration) -> bool {
        self.config.reaction_delay <= 0.0
            || now.saturating_sub(last).as_secs_f32() > self.config.reaction_delay
    }

    fn retarget(&mut self, ball: Vec3, now: Duration) -> [f32; 2] {
        let bound = self.config.movement_bound;
        let (jitter_y, jitter_z) = match &self.noise {
            Some(normal) => (normal.sample(&mut self.rng), normal.sample(&mut self.rng)),
            None => (0.0, 0.0),
        };
        let target = [
            (ball.y + jitter_y).clamp(-bound, bound),
            (ball.z + jitter_z).clamp(-bound, bound),
        ];
        self.target = Some(target);
        self.last_update = Some(now);
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn exact(delay: f32) -> ScriptedOpponent {
        ScriptedOpponent::new(
            OpponentConfig {
                reaction_delay: delay,
                tracking_noise: 0.0,
                seed: Some(1),
                ..Default::default()
            },
            15.0,
        )
    }

    #[test]
    fn test_aims_directly_at_ball_without_noise_or_delay() {
        let mut opponent = exact(0.0);
        let paddle = Vec3::new(25.0, 1.0, -2.0);

        for (i, ball) in [
            Vec3::new(0.0, 5.0, 5.0),
            Vec3::new(3.0, -12.0, 4.0),
            Vec3::new(-8.0, 1.0, 19.0),
        ]
        .into_iter()
        .enumerate()
        {
            let action = opponent.compute_action(paddle, ball, Duration::from_millis(i as u64));
            let [ay, az] = action.components();
            let (dy, dz) = (ball.y - paddle.y, ball.z - paddle.z);
            // Parallel vectors have a zero 2D cross product.
            assert_relative_eq!(ay * dz - az * dy, 0.0, epsilon = 1e-4);
            assert!(ay * dy + az * dz > 0.0);
            assert_relative_eq!((ay * ay + az * az).sqrt(), 12.0 / 15.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_keeps_stale_target_until_delay_elapses() {
        let mut opponent = exact(1.0);
        let paddle = Vec3::new(25.0, 0.0, 0.0);

        let up = opponent.compute_action(paddle, Vec3::new(0.0, 10.0, 0.0), Duration::ZERO);
        assert!(up.components()[0] > 0.0);

        let still_up =
            opponent.compute_action(paddle, Vec3::new(0.0, -10.0, 0.0), Duration::from_millis(500));
        assert_eq!(still_up, up);
        assert_eq!(opponent.target(), Some([10.0, 0.0]));

        let down = opponent.compute_action(
            paddle,
            Vec3::new(0.0, -10.0, 0.0),
            Duration::from_millis(1500),
        );
        assert!(down.components()[0] < 0.0);
    }

    #[test]
    fn test_target_is_clamped_and_stops_on_arrival() {
        let mut opponent = exact(0.0);
        let action = opponent.compute_action(
            Vec3::new(25.0, 19.95, 0.0),
            Vec3::new(0.0, 50.0, 0.0),
            Duration::ZERO,
        );
        assert_eq!(opponent.target(), Some([20.0, 0.0]));
        assert_eq!(action, Action::ZERO);
    }

    #[test]
    fn test_reset_forces_retarget() {
        let mut opponent = exact(10.0);
        let paddle = Vec3::new(25.0, 0.0, 0.0);
        opponent.compute_action(paddle, Vec3::new(0.0, 10.0, 0.0), Duration::ZERO);

        opponent.reset();
        assert!(opponent.target().is_none());
        opponent.compute_action(paddle, Vec3::new(0.0, -4.0, 0.0), Duration::from_millis(1));
        assert_eq!(opponent.target(), Some([-4.0, 0.0]));
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let config = OpponentConfig {
            reaction_delay: 0.0,
            tracking_noise: 2.0,
            seed: Some(42),
            ..Default::default()
        };
        let mut a = ScriptedOpponent::new(config.clone(), 15.0);
        let mut b = ScriptedOpponent::new(config, 15.0);
        let paddle = Vec3::new(25.0, 0.0, 0.0);
        let ball = Vec3::new(0.0, 3.0, -3.0);

        let mut jittered = false;
        for i in 0..10 {
            let now = Duration::from_millis(i);
            assert_eq!(
                a.compute_action(paddle, ball, now),
                b.compute_action(paddle, ball, now)
            );
            assert_eq!(a.target(), b.target());
            jittered |= a.target() != Some([3.0, -3.0]);
        }
        assert!(jittered);
    }
}
