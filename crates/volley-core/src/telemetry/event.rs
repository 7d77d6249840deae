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

//! Event types reported by the bridge components.

use std::fmt;

/// Why a command never left the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandDropReason {
    /// No snapshot had been received yet.
    NoStateAvailable,
    /// The target body is absent from the latest snapshot.
    BodyNotFound,
    /// The command could not be encoded.
    Encoding(String),
    /// The outbound buffer was full.
    TransportUnavailable,
    /// The transport reported a failure.
    Transport(String),
}

impl fmt::Display for CommandDropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandDropReason::NoStateAvailable => write!(f, "no state available"),
            CommandDropReason::BodyNotFound => write!(f, "body not found"),
            CommandDropReason::Encoding(msg) => write!(f, "encoding failed: {msg}"),
            CommandDropReason::TransportUnavailable => write!(f, "outbound buffer full"),
            CommandDropReason::Transport(msg) => write!(f, "transport failure: {msg}"),
        }
    }
}

/// A diagnostic event emitted by the receiver, the dispatcher or the control loop.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    /// The first snapshot of a receiver's lifetime was decoded and published.
    FirstSnapshot {
        /// Number of bodies in the snapshot.
        body_count: usize,
        /// Simulation clock of the snapshot.
        simulation_time: f32,
        /// Size of the encoded payload in bytes.
        payload_len: usize,
    },
    /// Periodic receiver throughput summary.
    ReceiverStats {
        /// Snapshots published so far.
        published: u64,
        /// Payloads discarded because they failed to decode.
        decode_failures: u64,
        /// Transport failures that triggered a backoff.
        transport_failures: u64,
    },
    /// An inbound payload was discarded.
    DecodeFailed {
        /// Size of the malformed payload in bytes.
        payload_len: usize,
        /// Human-readable decoder message.
        reason: String,
    },
    /// The inbound transport failed; the receiver is backing off.
    TransportFailed {
        /// Human-readable transport message.
        reason: String,
    },
    /// A command was handed to the transport.
    CommandSent {
        /// Target body.
        body_id: String,
    },
    /// A command was dropped before reaching the transport.
    CommandDropped {
        /// Target body.
        body_id: String,
        /// Why it was dropped.
        reason: CommandDropReason,
    },
    /// The control loop found the state cache empty after a tick.
    NoStateAvailable {
        /// Step count at which it happened.
        step: u64,
    },
    /// An episode finished.
    EpisodeEnded {
        /// Number of steps taken.
        steps: u64,
        /// Whether a scoring event (or missing state) ended it.
        terminated: bool,
        /// Whether the step cap ended it.
        truncated: bool,
        /// Final score of player 1.
        score_player1: u32,
        /// Final score of player 2.
        score_player2: u32,
    },
}
