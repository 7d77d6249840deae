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

//! Abstract transport contracts between the bridge and the simulator.
//!
//! The bridge talks to the simulator over two one-way channels: a push channel
//! for commands and a publish/subscribe channel for world-state broadcasts.
//! Both are strictly non-blocking from the bridge's point of view. Concrete
//! implementations live in `volley-infra`.

use serde::{Deserialize, Serialize};

/// Transport endpoints, passed as configuration rather than protocol content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Endpoint the command push channel connects to.
    pub action: String,
    /// Endpoint the state subscription connects to.
    pub state: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            action: "tcp://127.0.0.1:5555".to_string(),
            state: "tcp://127.0.0.1:5556".to_string(),
        }
    }
}

/// Errors reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The operation could not complete immediately (outbound buffer full).
    /// Callers treat this as a dropped, non-fatal operation.
    #[error("transport unavailable: operation would block")]
    Unavailable,
    /// The peer side of the channel is gone.
    #[error("transport disconnected: {0}")]
    Disconnected(String),
    /// Any other transport-level failure.
    #[error("transport failure: {0}")]
    Failed(String),
}

/// Inbound side: yields raw world-state payloads without blocking.
pub trait SnapshotSource: Send + 'static {
    /// Attempts to receive one payload.
    ///
    /// Returns `Ok(None)` when no message is currently available.
    fn try_recv(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}

/// Outbound side: best-effort, fire-and-forget command channel.
pub trait CommandSink: Send {
    /// Attempts to enqueue one payload without blocking.
    ///
    /// Returns [`TransportError::Unavailable`] if the payload cannot be accepted
    /// right now; the payload is then dropped, never retried.
    fn try_send(&mut self, payload: &[u8]) -> Result<(), TransportError>;
}

/// The pair of channel ends produced by a successful connection.
pub struct TransportPair {
    /// Command push channel.
    pub commands: Box<dyn CommandSink>,
    /// World-state subscription.
    pub snapshots: Box<dyn SnapshotSource>,
}

impl std::fmt::Debug for TransportPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportPair").finish_non_exhaustive()
    }
}

/// Establishes the connection to the simulator.
pub trait TransportConnector: Send {
    /// Connects both channels to the given endpoints.
    fn connect(&mut self, endpoints: &Endpoints) -> Result<TransportPair, TransportError>;
}
