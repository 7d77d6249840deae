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


//! # Volley Agents
//!
//! The agent-facing side of the bridge: [`PongEnv`] exposes the external
//! simulation as a `reset` / `step` / `close` episode loop, turning the
//! newest cached world state into observations and shaped rewards.
//! A [`ScriptedOpponent`] can drive the second paddle from the same loop.

#![warn(missing_docs)]

pub mod action;
pub mod config;
pub mod env;
pub mod observation;
pub mod opponent;
pub mod reward;

pub use action::{Action, ACTION_LEN};
pub use config::{BodySlots, ConfigError, EnvConfig, ObservationConfig, OpponentConfig, RewardConfig};
pub use env::{Diagnostic, EnvError, Episode, EpisodePhase, PongEnv, StepInfo, StepResult};
pub use observation::{build_observation, MissingBody, Observation, OBSERVATION_LEN};
pub use opponent::ScriptedOpponent;
pub use reward::{shaping_reward, terminal_reward, RewardComponents, ScoreChange};
