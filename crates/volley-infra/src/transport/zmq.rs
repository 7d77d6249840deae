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

//! ZeroMQ transport: a PUSH socket for commands and a SUB socket for state.

use volley_core::transport::{
    CommandSink, Endpoints, SnapshotSource, TransportConnector, TransportError, TransportPair,
};

/// Default send high-water mark, in messages.
const DEFAULT_SEND_HWM: i32 = 1000;

/// Connects to a simulator over ZeroMQ.
pub struct ZmqConnector {
    context: zmq::Context,
    send_high_water_mark: i32,
}

impl ZmqConnector {
    /// Creates a connector with its own ZeroMQ context.
    pub fn new() -> Self {
        Self {
            context: zmq::Context::new(),
            send_high_water_mark: DEFAULT_SEND_HWM,
        }
    }

    /// Overrides how many commands may queue before sends report
    /// [`TransportError::Unavailable`].
    pub fn with_send_high_water_mark(mut self, hwm: i32) -> Self {
        self.send_high_water_mark = hwm;
        self
    }
}

impl Default for ZmqConnector {
    fn default() -> Self {
        Self::new()
    }
}

fn failed(e: zmq::Error) -> TransportError {
    TransportError::Failed(e.to_string())
}

impl TransportConnector for ZmqConnector {
    fn connect(&mut self, endpoints: &Endpoints) -> Result<TransportPair, TransportError> {
        let push = self.context.socket(zmq::PUSH).map_err(failed)?;
        push.set_linger(0).map_err(failed)?;
        push.set_sndhwm(self.send_high_water_mark).map_err(failed)?;
        push.connect(&endpoints.action).map_err(failed)?;

        let sub = self.context.socket(zmq::SUB).map_err(failed)?;
        sub.set_linger(0).map_err(failed)?;
        sub.connect(&endpoints.state).map_err(failed)?;
        sub.set_subscribe(b"").map_err(failed)?;

        log::info!(
            "Connected to simulator (commands: {}, state: {}).",
            endpoints.action,
            endpoints.state
        );

        Ok(TransportPair {
            commands: Box::new(ZmqCommandSink { socket: push }),
            snapshots: Box::new(ZmqSnapshotSource { socket: sub }),
        })
    }
}

struct ZmqCommandSink {
    socket: zmq::Socket,
}

impl CommandSink for ZmqCommandSink {
    fn try_send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        match self.socket.send(payload, zmq::DONTWAIT) {
            Ok(()) => Ok(()),
            Err(zmq::Error::EAGAIN) => Err(TransportError::Unavailable),
            Err(e) => Err(failed(e)),
        }
    }
}

struct ZmqSnapshotSource {
    socket: zmq::Socket,
}

impl SnapshotSource for ZmqSnapshotSource {
    fn try_recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.socket.recv_bytes(zmq::DONTWAIT) {
            Ok(payload) => Ok(Some(payload)),
            Err(zmq::Error::EAGAIN) => Ok(None),
            Err(e) => Err(failed(e)),
        }
    }
}
