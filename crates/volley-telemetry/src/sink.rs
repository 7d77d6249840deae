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


use volley_core::telemetry::{BridgeEvent, CommandDropReason, EventSink};

/// Renders bridge events through the `log` facade.
///
/// Per-message events go to `trace`, periodic summaries and episode ends to
/// `debug`/`info`, and contained failures to `warn`/`error`.
#[derive(Debug, Clone)]
pub struct LogEventSink {
    target: &'static str,
}

impl LogEventSink {
    /// Creates a sink logging under the default `volley::bridge` target.
    pub fn new() -> Self {
        Self::with_target("volley::bridge")
    }

    /// Creates a sink logging under a custom target.
    pub fn with_target(target: &'static str) -> Self {
        Self { target }
    }

    /// Returns the level an event is logged at.
    pub fn level_of(event: &BridgeEvent) -> log::Level {
        match event {
            BridgeEvent::FirstSnapshot { .. } => log::Level::Info,
            BridgeEvent::ReceiverStats { .. } => log::Level::Debug,
            BridgeEvent::DecodeFailed { .. } => log::Level::Warn,
            BridgeEvent::TransportFailed { .. } => log::Level::Error,
            BridgeEvent::CommandSent { .. } => log::Level::Trace,
            BridgeEvent::CommandDropped {
                reason: CommandDropReason::TransportUnavailable,
                ..
            } => log::Level::Debug,
            BridgeEvent::CommandDropped { .. } => log::Level::Warn,
            BridgeEvent::NoStateAvailable { .. } => log::Level::Warn,
            BridgeEvent::EpisodeEnded { .. } => log::Level::Info,
        }
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: BridgeEvent) {
        let level = Self::level_of(&event);
        if !log::log_enabled!(target: self.target, level) {
            return;
        }

        match event {
            BridgeEvent::FirstSnapshot {
                body_count,
                simulation_time,
                payload_len,
            } => log::log!(
                target: self.target,
                level,
                "First snapshot: {body_count} bodies, {payload_len} bytes, t={simulation_time:.3}"
            ),
            BridgeEvent::ReceiverStats {
                published,
                decode_failures,
                transport_failures,
            } => log::log!(
                target: self.target,
                level,
                "Receiver: {published} published, {decode_failures} malformed, {transport_failures} transport failures"
            ),
            BridgeEvent::DecodeFailed {
                payload_len,
                reason,
            } => log::log!(
                target: self.target,
                level,
                "Discarded {payload_len}-byte snapshot: {reason}"
            ),
            BridgeEvent::TransportFailed { reason } => {
                log::log!(target: self.target, level, "State transport failed: {reason}")
            }
            BridgeEvent::CommandSent { body_id } => {
                log::log!(target: self.target, level, "Command sent to '{body_id}'")
            }
            BridgeEvent::CommandDropped { body_id, reason } => log::log!(
                target: self.target,
                level,
                "Command for '{body_id}' dropped: {reason}"
            ),
            BridgeEvent::NoStateAvailable { step } => log::log!(
                target: self.target,
                level,
                "No world state available at step {step}"
            ),
            BridgeEvent::EpisodeEnded {
                steps,
                terminated,
                truncated,
                score_player1,
                score_player2,
            } => log::log!(
                target: self.target,
                level,
                "Episode ended after {steps} steps (terminated={terminated}, truncated={truncated}, score {score_player1}-{score_player2})"
            ),
        }
    }
}
