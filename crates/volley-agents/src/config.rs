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

//! Configuration of the episode stepper and its collaborators.
//!
//! Every struct has a `Default` carrying the reference arena constants and
//! accepts partial RON documents: omitted fields keep their default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use volley_core::math::Vec3;
use volley_core::transport::Endpoints;
use volley_core::world::MAX_BODY_ID_LEN;
use volley_io::WireFormat;
use volley_sync::ReceiverConfig;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid RON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The configuration could not be rendered as RON.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
    /// A value is out of its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which snapshot slots and identifiers the stepper reads and commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodySlots {
    /// Slot of the ball.
    pub ball: usize,
    /// Slot of the agent's paddle.
    pub primary_paddle: usize,
    /// Slot of the opponent's paddle.
    pub opponent_paddle: usize,
    /// Identifier commands for the agent's paddle are addressed to.
    pub primary_id: String,
    /// Identifier commands for the opponent's paddle are addressed to.
    pub opponent_id: String,
}

impl Default for BodySlots {
    fn default() -> Self {
        Self {
            ball: 6,
            primary_paddle: 4,
            opponent_paddle: 5,
            primary_id: "paddle1".to_string(),
            opponent_id: "paddle2".to_string(),
        }
    }
}

/// Normalization references for observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationConfig {
    /// Lower arena corner.
    pub arena_min: Vec3,
    /// Upper arena corner.
    pub arena_max: Vec3,
    /// Speed mapped to ±1.
    pub max_velocity: f32,
}

impl Default for ObservationConfig {
    fn default() -> Self {
        Self {
            arena_min: Vec3::new(-30.0, -20.0, -20.0),
            arena_max: Vec3::new(30.0, 20.0, 20.0),
            max_velocity: 20.0,
        }
    }
}

/// Reward shaping constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Proximity shaping applies while the ball's x is below this.
    pub proximity_threshold_x: f32,
    /// Proximity reward at zero distance.
    pub proximity_scale: f32,
    /// Distance over which the proximity reward decays by a factor e.
    pub proximity_decay: f32,
    /// Minimum change of the ball's x velocity that counts as a hit.
    pub hit_velocity_delta: f32,
    /// A hit only counts while the ball's x is below this.
    pub hit_zone_x: f32,
    /// Reward for a detected hit.
    pub hit_bonus: f32,
    /// Penalty per unit of action magnitude (sum of absolute components).
    pub action_cost: f32,
    /// Reward when player 1 scores.
    pub score_bonus: f32,
    /// Penalty (subtracted) when player 2 scores.
    pub concede_penalty: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            proximity_threshold_x: 5.0,
            proximity_scale: 0.1,
            proximity_decay: 10.0,
            hit_velocity_delta: 5.0,
            hit_zone_x: -20.0,
            hit_bonus: 1.0,
            action_cost: 0.01,
            score_bonus: 10.0,
            concede_penalty: 10.0,
        }
    }
}

/// Parameters of the scripted opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    /// Paddle speed the opponent moves at.
    pub max_speed: f32,
    /// Seconds the opponent keeps its aim point before retargeting.
    pub reaction_delay: f32,
    /// Standard deviation of the aim jitter on each axis.
    pub tracking_noise: f32,
    /// Aim points are clamped to `±movement_bound` on y and z.
    pub movement_bound: f32,
    /// Below this distance to its aim point the opponent stops.
    pub target_epsilon: f32,
    /// Seed for the jitter generator. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            max_speed: 12.0,
            reaction_delay: 0.05,
            tracking_noise: 0.3,
            movement_bound: 20.0,
            target_epsilon: 0.1,
            seed: None,
        }
    }
}

/// Top-level configuration of a [`PongEnv`](crate::env::PongEnv).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Transport endpoints.
    pub endpoints: Endpoints,
    /// Framing used on both channels.
    pub wire_format: WireFormat,
    /// Paddle speed an action component of ±1 maps to.
    pub max_paddle_speed: f32,
    /// Episode length cap; reaching it truncates the episode.
    pub max_episode_steps: u64,
    /// Control loop rate.
    pub control_hz: f32,
    /// Poll interval while waiting for the first snapshot.
    pub first_snapshot_poll: Duration,
    /// Give up waiting for the first snapshot after this long. `None` waits forever.
    pub first_snapshot_timeout: Option<Duration>,
    /// How long `close` waits for the receiver thread.
    pub close_timeout: Duration,
    /// Body slots and identifiers.
    pub slots: BodySlots,
    /// Observation normalization.
    pub observation: ObservationConfig,
    /// Reward shaping.
    pub reward: RewardConfig,
    /// Background receiver tuning.
    pub receiver: ReceiverConfig,
    /// Scripted opponent driving the second paddle, if any.
    pub opponent: Option<OpponentConfig>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            wire_format: WireFormat::default(),
            max_paddle_speed: 15.0,
            max_episode_steps: 1000,
            control_hz: 60.0,
            first_snapshot_poll: Duration::from_millis(10),
            first_snapshot_timeout: None,
            close_timeout: Duration::from_secs(1),
            slots: BodySlots::default(),
            observation: ObservationConfig::default(),
            reward: RewardConfig::default(),
            receiver: ReceiverConfig::default(),
            opponent: None,
        }
    }
}

impl EnvConfig {
    /// Parses a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    /// Reads and parses a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded environment config from '{}'.", path.display());
        Self::from_ron_str(&source)
    }

    /// Renders the configuration as pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Returns the control tick period.
    ///
    /// Saturates at [`Duration::MAX`] for rates that [`validate`](Self::validate) rejects.
    pub fn tick_period(&self) -> Duration {
        Duration::try_from_secs_f32(1.0 / self.control_hz).unwrap_or(Duration::MAX)
    }

    /// Checks every value against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(msg: impl Into<String>) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid(msg.into()))
        }

        if !(self.max_paddle_speed.is_finite() && self.max_paddle_speed > 0.0) {
            return invalid("max_paddle_speed must be positive");
        }
        if self.max_episode_steps == 0 {
            return invalid("max_episode_steps must be at least 1");
        }
        if !(self.control_hz.is_finite() && self.control_hz > 0.0) {
            return invalid("control_hz must be positive");
        }
        if Duration::try_from_secs_f32(1.0 / self.control_hz).is_err() {
            return invalid("control_hz is too small for a representable tick period");
        }
        if self.first_snapshot_poll.is_zero() {
            return invalid("first_snapshot_poll must be non-zero");
        }

        for (name, id) in [
            ("primary_id", &self.slots.primary_id),
            ("opponent_id", &self.slots.opponent_id),
        ] {
            if id.is_empty() || id.len() > MAX_BODY_ID_LEN {
                return invalid(format!(
                    "slots.{name} must be 1 to {MAX_BODY_ID_LEN} bytes long"
                ));
            }
        }

        let obs = &self.observation;
        if !(obs.arena_min.x < obs.arena_max.x
            && obs.arena_min.y < obs.arena_max.y
            && obs.arena_min.z < obs.arena_max.z)
        {
            return invalid("observation.arena_min must be below arena_max on every axis");
        }
        if !(obs.max_velocity.is_finite() && obs.max_velocity > 0.0) {
            return invalid("observation.max_velocity must be positive");
        }
        if !(self.reward.proximity_decay.is_finite() && self.reward.proximity_decay > 0.0) {
            return invalid("reward.proximity_decay must be positive");
        }

        if let Some(opponent) = &self.opponent {
            if !(opponent.max_speed.is_finite() && opponent.max_speed >= 0.0) {
                return invalid("opponent.max_speed must be non-negative");
            }
            if !(opponent.reaction_delay.is_finite() && opponent.reaction_delay >= 0.0) {
                return invalid("opponent.reaction_delay must be non-negative");
            }
            if !(opponent.tracking_noise.is_finite() && opponent.tracking_noise >= 0.0) {
                return invalid("opponent.tracking_noise must be non-negative");
            }
            if !(opponent.movement_bound.is_finite() && opponent.movement_bound >= 0.0) {
                return invalid("opponent.movement_bound must be non-negative");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EnvConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_episode_steps, 1000);
        assert_eq!(config.slots.ball, 6);
        assert!(config.opponent.is_none());
        assert!((config.tick_period().as_secs_f32() - 1.0 / 60.0).abs() < 0.0001);
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = EnvConfig::from_ron_str(
            "(max_episode_steps: 50, wire_format: Bincode, opponent: Some((max_speed: 10.0, seed: Some(7))))",
        )
        .unwrap();

        assert_eq!(config.max_episode_steps, 50);
        assert_eq!(config.wire_format, WireFormat::Bincode);
        assert_eq!(config.max_paddle_speed, 15.0);

        let opponent = config.opponent.unwrap();
        assert_eq!(opponent.max_speed, 10.0);
        assert_eq!(opponent.seed, Some(7));
        assert_eq!(opponent.reaction_delay, 0.05);
    }

    #[test]
    fn test_ron_round_trip() {
        let config = EnvConfig {
            opponent: Some(OpponentConfig::default()),
            first_snapshot_timeout: Some(Duration::from_secs(5)),
            ..Default::default()
        };
        let text = config.to_ron_string().unwrap();
        assert_eq!(EnvConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_malformed_ron_is_a_parse_error() {
        assert!(matches!(
            EnvConfig::from_ron_str("(max_episode_steps: \"many\")"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_tick_period_never_panics() {
        let config = EnvConfig {
            control_hz: 1e-30,
            ..Default::default()
        };
        assert_eq!(config.tick_period(), Duration::MAX);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let cases = [
            EnvConfig {
                max_paddle_speed: 0.0,
                ..Default::default()
            },
            EnvConfig {
                max_episode_steps: 0,
                ..Default::default()
            },
            EnvConfig {
                control_hz: -1.0,
                ..Default::default()
            },
            EnvConfig {
                control_hz: 1e-30,
                ..Default::default()
            },
            EnvConfig {
                observation: ObservationConfig {
                    arena_min: Vec3::new(30.0, -20.0, -20.0),
                    ..Default::default()
                },
                ..Default::default()
            },
            EnvConfig {
                slots: BodySlots {
                    primary_id: "p".repeat(MAX_BODY_ID_LEN + 1),
                    ..Default::default()
                },
                ..Default::default()
            },
            EnvConfig {
                opponent: Some(OpponentConfig {
                    tracking_noise: -0.5,
                    ..Default::default()
                }),
                ..Default::default()
            },
        ];

        for config in cases {
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "{config:?}"
            );
        }
    }
}
