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


//! The fixed-cadence control loop.
//!
//! [`PongEnv`] owns the transport connection, the background receiver and the
//! command dispatcher. Each [`step`](PongEnv::step) sends the agent's command
//! (and the scripted opponent's, if configured), waits for the next tick
//! boundary, then reads whatever world state is newest at that instant.

mod episode;
mod pacer;

pub use episode::{Diagnostic, Episode, EpisodePhase, StepInfo, StepResult};
pub use pacer::TickPacer;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use volley_core::telemetry::{BridgeEvent, SharedSink};
use volley_core::transport::{TransportConnector, TransportError};
use volley_core::world::{RigidBodyState, WorldSnapshot};
use volley_io::WireCodec;
use volley_sync::{BackgroundReceiver, CommandDispatcher, ReceiverStats, StateCache};
use volley_telemetry::LogEventSink;

use crate::action::Action;
use crate::config::{ConfigError, EnvConfig};
use crate::observation::{body_in_slot, build_observation, MissingBody, Observation};
use crate::opponent::ScriptedOpponent;
use crate::reward::{shaping_reward, terminal_reward, RewardComponents};

/// Errors returned by [`PongEnv`].
#[derive(Debug, Error)]
pub enum EnvError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The transport could not be connected.
    #[error("failed to connect to the simulator: {0}")]
    Connect(#[source] TransportError),
    /// The receiver thread could not be started.
    #[error("failed to start the snapshot receiver: {0}")]
    ReceiverSpawn(#[source] std::io::Error),
    /// No snapshot arrived within the configured first-snapshot timeout.
    #[error("no world snapshot received within {0:?}")]
    FirstSnapshotTimeout(Duration),
    /// The operation is not allowed in the current phase.
    #[error("cannot {operation} while {phase:?}")]
    InvalidPhase {
        /// The rejected operation.
        operation: &'static str,
        /// The phase the environment was in.
        phase: EpisodePhase,
    },
}

struct Session {
    cache: StateCache,
    dispatcher: CommandDispatcher,
    receiver: BackgroundReceiver,
}

/// Episode stepper driving one paddle of the external simulation.
pub struct PongEnv {
    config: EnvConfig,
    connector: Box<dyn TransportConnector>,
    events: SharedSink,
    codec: WireCodec,
    session: Option<Session>,
    opponent: Option<ScriptedOpponent>,
    pacer: TickPacer,
    episode: Option<Episode>,
    phase: EpisodePhase,
    epoch: Instant,
}

impl PongEnv {
    /// Creates an environment. Nothing is connected until the first
    /// [`reset`](Self::reset).
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Config`] if `config` fails validation.
    pub fn new(config: EnvConfig, connector: Box<dyn TransportConnector>) -> Result<Self, EnvError> {
        config.validate()?;

        let opponent = config
            .opponent
            .clone()
            .map(|opponent| ScriptedOpponent::new(opponent, config.max_paddle_speed));

        Ok(Self {
            codec: WireCodec::new(config.wire_format),
            pacer: TickPacer::new(config.tick_period()),
            connector,
            events: Arc::new(LogEventSink::new()),
            session: None,
            opponent,
            episode: None,
            phase: EpisodePhase::Uninitialized,
            epoch: Instant::now(),
            config,
        })
    }

    /// Replaces the event sink. Takes effect on the next connection.
    pub fn with_event_sink(mut self, events: SharedSink) -> Self {
        self.events = events;
        self
    }

    /// Starts a new episode and returns its initial observation.
    ///
    /// The first call connects the transport, starts the receiver and blocks
    /// until a snapshot has been received. If the snapshot lacks a configured
    /// body, the zero observation is returned with a
    /// [`Diagnostic::MissingBody`].
    ///
    /// # Errors
    ///
    /// - [`EnvError::Connect`] / [`EnvError::ReceiverSpawn`] on the first call.
    /// - [`EnvError::FirstSnapshotTimeout`] if a timeout is configured and no
    ///   snapshot arrives in time. The connection is kept for the next try.
    pub fn reset(&mut self) -> Result<(Observation, StepInfo), EnvError> {
        let cache = match &self.session {
            Some(session) => session.cache.clone(),
            None => {
                let session = self.open_session()?;
                let cache = session.cache.clone();
                self.session = Some(session);
                cache
            }
        };

        let snapshot = self.wait_for_first_snapshot(&cache)?;
        let episode = Episode::start(&snapshot);

        if let Some(opponent) = self.opponent.as_mut() {
            opponent.reset();
        }
        self.pacer.reset();

        let (observation, diagnostic) =
            match build_observation(&snapshot, &self.config.slots, &self.config.observation) {
                Ok(observation) => (observation, None),
                Err(missing) => {
                    log::warn!("Reset snapshot is incomplete: {missing}.");
                    (Observation::ZERO, Some(Diagnostic::MissingBody(missing)))
                }
            };

        let info = StepInfo {
            step_count: 0,
            score_player1: snapshot.score_player1,
            score_player2: snapshot.score_player2,
            simulation_time: Some(snapshot.simulation_time),
            diagnostic,
            ..StepInfo::default()
        };

        log::debug!(
            "Episode reset at t={:.3}s (score {}-{}).",
            snapshot.simulation_time,
            snapshot.score_player1,
            snapshot.score_player2
        );
        self.episode = Some(episode);
        self.phase = EpisodePhase::Ready;
        Ok((observation, info))
    }

    /// Advances the episode by one control tick.
    ///
    /// Stepping after the episode ended is tolerated (with a warning) and
    /// keeps counting; call [`reset`](Self::reset) to start over.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidPhase`] before the first reset or after
    /// [`close`](Self::close). Missing world state is not an error; it ends
    /// the episode with a [`Diagnostic`] instead.
    pub fn step(&mut self, action: Action) -> Result<StepResult, EnvError> {
        if !self.phase.accepts_step() {
            return Err(EnvError::InvalidPhase {
                operation: "step",
                phase: self.phase,
            });
        }
        if self.phase.is_done() {
            log::warn!("step() called on a finished episode ({:?}).", self.phase);
        }

        let result = self.advance(action)?;

        self.phase = if result.terminated {
            EpisodePhase::Terminated
        } else if result.truncated {
            EpisodePhase::Truncated
        } else {
            EpisodePhase::Stepping
        };

        if result.is_done() {
            log::debug!(
                "Episode ended after {} steps (terminated: {}, truncated: {}).",
                result.info.step_count,
                result.terminated,
                result.truncated
            );
            self.events.emit(BridgeEvent::EpisodeEnded {
                steps: result.info.step_count,
                terminated: result.terminated,
                truncated: result.truncated,
                score_player1: result.info.score_player1,
                score_player2: result.info.score_player2,
            });
        }
        Ok(result)
    }

    fn advance(&mut self, action: Action) -> Result<StepResult, EnvError> {
        let (Some(session), Some(episode)) = (self.session.as_mut(), self.episode.as_mut()) else {
            return Err(EnvError::InvalidPhase {
                operation: "step",
                phase: self.phase,
            });
        };
        let config = &self.config;

        episode.step_count += 1;
        let mut commands_dropped = 0;

        let velocity = action.to_velocity(config.max_paddle_speed);
        if session
            .dispatcher
            .send_velocity_command(&config.slots.primary_id, velocity)
            .is_err()
        {
            commands_dropped += 1;
        }

        if let (Some(opponent), Some(snapshot)) = (self.opponent.as_mut(), session.cache.latest()) {
            match (
                body_in_slot(&snapshot, config.slots.opponent_paddle),
                body_in_slot(&snapshot, config.slots.ball),
            ) {
                (Ok(paddle), Ok(ball)) => {
                    let reply =
                        opponent.compute_action(paddle.position, ball.position, self.epoch.elapsed());
                    if session
                        .dispatcher
                        .send_velocity_command(
                            &config.slots.opponent_id,
                            reply.to_velocity(config.max_paddle_speed),
                        )
                        .is_err()
                    {
                        commands_dropped += 1;
                    }
                }
                (Err(missing), _) | (_, Err(missing)) => {
                    log::trace!("Opponent skipped this tick: {missing}.");
                }
            }
        }

        self.pacer.wait_for_tick();

        let Some(snapshot) = session.cache.latest() else {
            log::warn!("No world state available at step {}.", episode.step_count);
            self.events.emit(BridgeEvent::NoStateAvailable {
                step: episode.step_count,
            });
            return Ok(degraded(
                episode,
                config,
                None,
                Diagnostic::NoStateAvailable,
                commands_dropped,
            ));
        };

        let (observation, ball, paddle) = match observe(&snapshot, config) {
            Ok(observed) => observed,
            Err(missing) => {
                log::warn!("Step {} snapshot is incomplete: {missing}.", episode.step_count);
                return Ok(degraded(
                    episode,
                    config,
                    Some(snapshot.as_ref()),
                    Diagnostic::MissingBody(missing),
                    commands_dropped,
                ));
            }
        };

        let mut reward = shaping_reward(
            &config.reward,
            paddle,
            ball,
            episode.previous_ball_velocity,
            &action,
        );
        episode.previous_ball_velocity = Some(ball.velocity);

        let change = episode.record_scores(snapshot.score_player1, snapshot.score_player2);
        reward.terminal = terminal_reward(&config.reward, change);
        if change.scored {
            log::debug!("Agent scored at step {}.", episode.step_count);
        }
        if change.conceded {
            log::debug!("Agent conceded at step {}.", episode.step_count);
        }

        Ok(StepResult {
            observation,
            reward: reward.total(),
            terminated: change.any(),
            truncated: episode.step_count >= config.max_episode_steps,
            info: StepInfo {
                step_count: episode.step_count,
                score_player1: snapshot.score_player1,
                score_player2: snapshot.score_player2,
                simulation_time: Some(snapshot.simulation_time),
                diagnostic: None,
                reward,
                commands_dropped,
            },
        })
    }

    /// Stops the receiver and releases the transport. Idempotent; a later
    /// [`reset`](Self::reset) reconnects.
    pub fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.receiver.stop(self.config.close_timeout);
            log::info!(
                "Bridge closed ({} commands sent, {} dropped).",
                session.dispatcher.sent(),
                session.dispatcher.dropped()
            );
        }
        self.episode = None;
        self.phase = EpisodePhase::Closed;
    }

    /// Returns the current phase.
    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    /// Returns the running episode, if any.
    pub fn episode(&self) -> Option<&Episode> {
        self.episode.as_ref()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Returns the newest cached snapshot, if connected and one was received.
    pub fn latest_snapshot(&self) -> Option<Arc<WorldSnapshot>> {
        self.session.as_ref().and_then(|session| session.cache.latest())
    }

    /// Returns the receiver's running totals, if connected.
    pub fn receiver_stats(&self) -> Option<ReceiverStats> {
        self.session.as_ref().map(|session| session.receiver.stats())
    }

    fn open_session(&mut self) -> Result<Session, EnvError> {
        let endpoints = &self.config.endpoints;
        log::info!(
            "Connecting to simulator (commands: {}, state: {}).",
            endpoints.action,
            endpoints.state
        );
        let pair = self.connector.connect(endpoints).map_err(EnvError::Connect)?;

        let cache = StateCache::new();
        let receiver = BackgroundReceiver::spawn(
            pair.snapshots,
            self.codec,
            cache.clone(),
            self.config.receiver.clone(),
            Arc::clone(&self.events),
        )
        .map_err(EnvError::ReceiverSpawn)?;
        let dispatcher =
            CommandDispatcher::new(pair.commands, cache.clone(), self.codec, Arc::clone(&self.events));

        Ok(Session {
            cache,
            dispatcher,
            receiver,
        })
    }

    fn wait_for_first_snapshot(&self, cache: &StateCache) -> Result<Arc<WorldSnapshot>, EnvError> {
        let started = Instant::now();
        let mut announced = false;
        loop {
            if let Some(snapshot) = cache.latest() {
                return Ok(snapshot);
            }
            if let Some(limit) = self.config.first_snapshot_timeout {
                if started.elapsed() >= limit {
                    return Err(EnvError::FirstSnapshotTimeout(limit));
                }
            }
            if !announced {
                log::info!("Waiting for the first world snapshot...");
                announced = true;
            }
            thread::sleep(self.config.first_snapshot_poll);
        }
    }
}

impl Drop for PongEnv {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for PongEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PongEnv")
            .field("phase", &self.phase)
            .field("episode", &self.episode)
            .field("connected", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

fn observe<'a>(
    snapshot: &'a WorldSnapshot,
    config: &EnvConfig,
) -> Result<(Observation, &'a RigidBodyState, &'a RigidBodyState), MissingBody> {
    let observation = build_observation(snapshot, &config.slots, &config.observation)?;
    let ball = body_in_slot(snapshot, config.slots.ball)?;
    let paddle = body_in_slot(snapshot, config.slots.primary_paddle)?;
    Ok((observation, ball, paddle))
}

/// The result of a tick without usable state: zero observation, zero reward,
/// episode terminated.
fn degraded(
    episode: &Episode,
    config: &EnvConfig,
    snapshot: Option<&WorldSnapshot>,
    diagnostic: Diagnostic,
    commands_dropped: u32,
) -> StepResult {
    let (score_player1, score_player2) = match snapshot {
        Some(snapshot) => (snapshot.score_player1, snapshot.score_player2),
        None => (episode.last_score_player1, episode.last_score_player2),
    };
    StepResult {
        observation: Observation::ZERO,
        reward: 0.0,
        terminated: true,
        truncated: episode.step_count >= config.max_episode_steps,
        info: StepInfo {
            step_count: episode.step_count,
            score_player1,
            score_player2,
            simulation_time: snapshot.map(|snapshot| snapshot.simulation_time),
            diagnostic: Some(diagnostic),
            reward: RewardComponents::default(),
            commands_dropped,
        },
    }
}
