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

//! Turns "set this body's velocity" into a complete, encoded command.

use thiserror::Error;
use volley_core::math::Vec3;
use volley_core::telemetry::{BridgeEvent, CommandDropReason, SharedSink};
use volley_core::transport::{CommandSink, TransportError};
use volley_core::world::{OutgoingCommand, WorldSnapshot};
use volley_io::{EncodingError, WireCodec};

use crate::cache::StateCache;

/// Why a command was not handed to the transport.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// No snapshot has been received yet.
    #[error("no world state available yet")]
    NoStateAvailable,
    /// The target body is not in the latest snapshot.
    #[error("body '{0}' not found in the latest snapshot")]
    BodyNotFound(String),
    /// The command could not be encoded.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// The transport refused the payload.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DispatchError {
    /// Maps the error to the reason reported in [`BridgeEvent::CommandDropped`].
    pub fn drop_reason(&self) -> CommandDropReason {
        match self {
            DispatchError::NoStateAvailable => CommandDropReason::NoStateAvailable,
            DispatchError::BodyNotFound(_) => CommandDropReason::BodyNotFound,
            DispatchError::Encoding(e) => CommandDropReason::Encoding(e.to_string()),
            DispatchError::Transport(TransportError::Unavailable) => {
                CommandDropReason::TransportUnavailable
            }
            DispatchError::Transport(e) => CommandDropReason::Transport(e.to_string()),
        }
    }
}

/// Builds the command that sets `body_id`'s velocity, carrying every other
/// field over from `snapshot`.
pub fn build_command(
    snapshot: &WorldSnapshot,
    body_id: &str,
    velocity: Vec3,
) -> Result<OutgoingCommand, DispatchError> {
    snapshot
        .find_body(body_id)
        .map(|body| OutgoingCommand::from_body(body, velocity))
        .ok_or_else(|| DispatchError::BodyNotFound(body_id.to_string()))
}

/// Sends velocity commands built from the latest cached snapshot.
///
/// Sending is fire-and-forget: a payload the transport cannot accept right
/// away is dropped, never queued or retried. The cache is only read.
pub struct CommandDispatcher {
    sink: Box<dyn CommandSink>,
    cache: StateCache,
    codec: WireCodec,
    events: SharedSink,
    sent: u64,
    dropped: u64,
}

impl CommandDispatcher {
    /// Creates a dispatcher writing to `sink`.
    pub fn new(
        sink: Box<dyn CommandSink>,
        cache: StateCache,
        codec: WireCodec,
        events: SharedSink,
    ) -> Self {
        Self {
            sink,
            cache,
            codec,
            events,
            sent: 0,
            dropped: 0,
        }
    }

    /// Sets the velocity of `body_id`.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::NoStateAvailable`] before the first snapshot.
    /// - [`DispatchError::BodyNotFound`] if the latest snapshot lacks the body.
    /// - [`DispatchError::Encoding`] if the command cannot be encoded.
    /// - [`DispatchError::Transport`] if the transport refused it; with
    ///   [`TransportError::Unavailable`] the command was simply dropped.
    pub fn send_velocity_command(
        &mut self,
        body_id: &str,
        velocity: Vec3,
    ) -> Result<(), DispatchError> {
        let result = self.dispatch(body_id, velocity);
        match &result {
            Ok(()) => {
                self.sent += 1;
                log::trace!("Sent velocity {velocity:?} to '{body_id}'.");
                self.events.emit(BridgeEvent::CommandSent {
                    body_id: body_id.to_string(),
                });
            }
            Err(e) => {
                self.dropped += 1;
                log::debug!("Dropped command for '{body_id}': {e}");
                self.events.emit(BridgeEvent::CommandDropped {
                    body_id: body_id.to_string(),
                    reason: e.drop_reason(),
                });
            }
        }
        result
    }

    fn dispatch(&mut self, body_id: &str, velocity: Vec3) -> Result<(), DispatchError> {
        let snapshot = self.cache.latest().ok_or(DispatchError::NoStateAvailable)?;
        let command = build_command(&snapshot, body_id, velocity)?;
        let payload = self.codec.encode_command(&command)?;
        self.sink.try_send(&payload)?;
        Ok(())
    }

    /// Number of commands handed to the transport.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Number of commands dropped for any reason.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("codec", &self.codec)
            .field("sent", &self.sent)
            .field("dropped", &self.dropped)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use volley_core::telemetry::{ChannelSink, NoopSink};
    use volley_core::transport::{Endpoints, TransportConnector};
    use volley_core::world::RigidBodyState;
    use volley_infra::{loopback, SimulatorEndpoint};

    fn paddle_snapshot() -> WorldSnapshot {
        WorldSnapshot {
            bodies: vec![RigidBodyState::from_extents(
                "paddle1",
                Vec3::new(-25.0, 2.0, -1.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 3.0, 3.0),
                1000.0,
                0.95,
                false,
            )],
            simulation_time: 3.0,
            score_player1: 0,
            score_player2: 0,
        }
    }

    fn dispatcher(
        capacity: usize,
        events: SharedSink,
    ) -> (CommandDispatcher, StateCache, SimulatorEndpoint) {
        let (mut connector, simulator) = loopback(capacity);
        let pair = connector.connect(&Endpoints::default()).unwrap();
        let cache = StateCache::new();
        let dispatcher =
            CommandDispatcher::new(pair.commands, cache.clone(), WireCodec::default(), events);
        (dispatcher, cache, simulator)
    }

    #[test]
    fn test_build_command_is_complete() {
        let snapshot = paddle_snapshot();
        let command = build_command(&snapshot, "paddle1", Vec3::new(0.0, 15.0, -15.0)).unwrap();
        let body = &snapshot.bodies[0];

        assert_eq!(command.body_id, "paddle1");
        assert_eq!(command.velocity, Vec3::new(0.0, 15.0, -15.0));
        assert_eq!(command.position, body.position);
        assert_eq!(command.bounding_volume, body.bounding_volume);
        assert_eq!(command.mass, body.mass);
        assert_eq!(command.restitution, body.restitution);
        assert_eq!(command.dynamic, body.dynamic);
    }

    #[test]
    fn test_build_command_unknown_body() {
        assert_eq!(
            build_command(&paddle_snapshot(), "paddle9", Vec3::ZERO),
            Err(DispatchError::BodyNotFound("paddle9".to_string()))
        );
    }

    #[test]
    fn test_no_state_before_first_snapshot() {
        let (mut dispatcher, _cache, simulator) = dispatcher(4, Arc::new(NoopSink));
        assert_eq!(
            dispatcher.send_velocity_command("paddle1", Vec3::ZERO),
            Err(DispatchError::NoStateAvailable)
        );
        assert!(simulator.try_recv_command().is_none());
        assert_eq!(dispatcher.dropped(), 1);
    }

    #[test]
    fn test_sends_encoded_command() {
        let (mut dispatcher, cache, simulator) = dispatcher(4, Arc::new(NoopSink));
        cache.publish(paddle_snapshot());

        dispatcher
            .send_velocity_command("paddle1", Vec3::new(0.0, -7.5, 3.0))
            .unwrap();

        let payload = simulator.try_recv_command().unwrap();
        let command = WireCodec::default().decode_command(&payload).unwrap();
        assert_eq!(command.velocity, Vec3::new(0.0, -7.5, 3.0));
        assert_eq!(command.position, Vec3::new(-25.0, 2.0, -1.0));
        assert_eq!(dispatcher.sent(), 1);
    }

    #[test]
    fn test_full_buffer_drops_without_blocking() {
        let (sink, events) = ChannelSink::bounded(8);
        let (mut dispatcher, cache, simulator) = dispatcher(1, Arc::new(sink));
        cache.publish(paddle_snapshot());

        dispatcher.send_velocity_command("paddle1", Vec3::ZERO).unwrap();
        assert_eq!(
            dispatcher.send_velocity_command("paddle1", Vec3::ONE),
            Err(DispatchError::Transport(TransportError::Unavailable))
        );
        assert_eq!(simulator.drain_commands().len(), 1);
        assert!(events.try_iter().any(|e| e
            == BridgeEvent::CommandDropped {
                body_id: "paddle1".to_string(),
                reason: CommandDropReason::TransportUnavailable,
            }));
    }

    #[test]
    fn test_dispatch_does_not_touch_the_cache() {
        let (mut dispatcher, cache, _simulator) = dispatcher(4, Arc::new(NoopSink));
        cache.publish(paddle_snapshot());
        let before = cache.latest_entry().unwrap();

        dispatcher.send_velocity_command("paddle1", Vec3::ONE).unwrap();

        let after = cache.latest_entry().unwrap();
        assert_eq!(before.sequence, after.sequence);
        assert_eq!(*after.snapshot, paddle_snapshot());
    }
}
