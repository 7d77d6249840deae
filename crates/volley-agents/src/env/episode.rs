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


use volley_core::math::Vec3;
use volley_core::world::WorldSnapshot;

use crate::observation::{MissingBody, Observation};
use crate::reward::{RewardComponents, ScoreChange};

/// Lifecycle of a [`PongEnv`](super::PongEnv).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EpisodePhase {
    /// Never reset; no transport connected.
    #[default]
    Uninitialized,
    /// Reset done, no step taken yet.
    Ready,
    /// At least one step taken, episode still running.
    Stepping,
    /// A score change (or missing state) ended the episode.
    Terminated,
    /// The step cap ended the episode.
    Truncated,
    /// Closed; the transport and receiver are released.
    Closed,
}

impl EpisodePhase {
    /// Returns `true` for the two end-of-episode phases.
    pub fn is_done(&self) -> bool {
        matches!(self, EpisodePhase::Terminated | EpisodePhase::Truncated)
    }

    /// Returns `true` if `step` may be called.
    pub fn accepts_step(&self) -> bool {
        !matches!(self, EpisodePhase::Uninitialized | EpisodePhase::Closed)
    }
}

/// Per-episode bookkeeping, created by `reset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    /// Steps taken in this episode.
    pub step_count: u64,
    /// Player 1 score at the previous check.
    pub last_score_player1: u32,
    /// Player 2 score at the previous check.
    pub last_score_player2: u32,
    /// Ball velocity at the previous step, for hit detection.
    pub previous_ball_velocity: Option<Vec3>,
}

impl Episode {
    /// Starts an episode at the scores of `snapshot`.
    pub fn start(snapshot: &WorldSnapshot) -> Self {
        Self {
            step_count: 0,
            last_score_player1: snapshot.score_player1,
            last_score_player2: snapshot.score_player2,
            previous_ball_velocity: None,
        }
    }

    /// Compares the scores with the last check, then stores them.
    pub fn record_scores(&mut self, score_player1: u32, score_player2: u32) -> ScoreChange {
        let change = ScoreChange {
            scored: score_player1 > self.last_score_player1,
            conceded: score_player2 > self.last_score_player2,
        };
        self.last_score_player1 = score_player1;
        self.last_score_player2 = score_player2;
        change
    }
}

/// Why a step (or reset) could not use the world state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// The state cache was empty after the tick.
    NoStateAvailable,
    /// The snapshot is too short for the configured slots.
    MissingBody(MissingBody),
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::NoStateAvailable => write!(f, "no state received"),
            Diagnostic::MissingBody(missing) => write!(f, "{missing}"),
        }
    }
}

/// Side information returned with every reset and step.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StepInfo {
    /// Steps taken in the current episode.
    pub step_count: u64,
    /// Raw player 1 score.
    pub score_player1: u32,
    /// Raw player 2 score.
    pub score_player2: u32,
    /// Simulation clock of the snapshot used, if any.
    pub simulation_time: Option<f32>,
    /// Set when the step degraded instead of using fresh state.
    pub diagnostic: Option<Diagnostic>,
    /// Breakdown of the reward.
    pub reward: RewardComponents,
    /// Commands of this step that never reached the transport.
    pub commands_dropped: u32,
}

/// Outcome of one `step`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Observation after the tick.
    pub observation: Observation,
    /// Total reward of the tick.
    pub reward: f32,
    /// The episode ended on a score change or missing state.
    pub terminated: bool,
    /// The episode hit its step cap.
    pub truncated: bool,
    /// Diagnostics and raw values.
    pub info: StepInfo,
}

impl StepResult {
    /// Returns `true` if either end flag is set.
    pub fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(p1: u32, p2: u32) -> WorldSnapshot {
        WorldSnapshot {
            bodies: Vec::new(),
            simulation_time: 0.0,
            score_player1: p1,
            score_player2: p2,
        }
    }

    #[test]
    fn test_episode_starts_from_snapshot_scores() {
        let episode = Episode::start(&snapshot(2, 3));
        assert_eq!(episode.step_count, 0);
        assert_eq!(episode.last_score_player1, 2);
        assert_eq!(episode.last_score_player2, 3);
        assert!(episode.previous_ball_velocity.is_none());
    }

    #[test]
    fn test_record_scores_updates_regardless() {
        let mut episode = Episode::start(&snapshot(0, 0));

        let change = episode.record_scores(1, 0);
        assert!(change.scored && !change.conceded);

        assert_eq!(episode.record_scores(1, 0), ScoreChange::default());

        let change = episode.record_scores(1, 1);
        assert!(!change.scored && change.conceded);

        // A simulator restart lowers the scores; nothing fires but they are stored.
        assert_eq!(episode.record_scores(0, 0), ScoreChange::default());
        assert_eq!(episode.last_score_player2, 0);
    }

    #[test]
    fn test_phase_predicates() {
        assert_eq!(EpisodePhase::default(), EpisodePhase::Uninitialized);
        assert!(!EpisodePhase::Uninitialized.accepts_step());
        assert!(!EpisodePhase::Closed.accepts_step());
        assert!(EpisodePhase::Ready.accepts_step());
        assert!(EpisodePhase::Truncated.accepts_step());
        assert!(EpisodePhase::Terminated.is_done());
        assert!(!EpisodePhase::Stepping.is_done());
    }
}
