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

//! In-process transport backed by bounded crossbeam channels.
//!
//! [`loopback`] returns the two halves of a connection: the
//! [`LoopbackConnector`] handed to the bridge, and the [`SimulatorEndpoint`]
//! kept by whoever plays the simulator (usually a test thread). Both channel
//! directions are bounded and lossy when full, like the socket buffers they
//! stand in for.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use volley_core::transport::{
    CommandSink, Endpoints, SnapshotSource, TransportConnector, TransportError, TransportPair,
};

/// Creates a connected connector/simulator pair.
///
/// `capacity` bounds both the command and the snapshot channels.
pub fn loopback(capacity: usize) -> (LoopbackConnector, SimulatorEndpoint) {
    let (command_tx, command_rx) = crossbeam_channel::bounded(capacity);
    let (snapshot_tx, snapshot_rx) = crossbeam_channel::bounded(capacity);

    let connector = LoopbackConnector {
        command_tx,
        snapshot_rx,
        connections: 0,
    };
    let simulator = SimulatorEndpoint {
        command_rx,
        snapshot_tx,
        dropped_snapshots: AtomicU64::new(0),
    };
    (connector, simulator)
}

/// The bridge-side half of a loopback connection.
#[derive(Debug, Clone)]
pub struct LoopbackConnector {
    command_tx: Sender<Vec<u8>>,
    snapshot_rx: Receiver<Vec<u8>>,
    connections: u32,
}

impl LoopbackConnector {
    /// Returns how many times [`TransportConnector::connect`] succeeded.
    pub fn connections(&self) -> u32 {
        self.connections
    }
}

impl TransportConnector for LoopbackConnector {
    fn connect(&mut self, endpoints: &Endpoints) -> Result<TransportPair, TransportError> {
        self.connections += 1;
        log::debug!(
            "Loopback transport connected (action: {}, state: {}).",
            endpoints.action,
            endpoints.state
        );
        Ok(TransportPair {
            commands: Box::new(LoopbackCommandSink {
                tx: self.command_tx.clone(),
            }),
            snapshots: Box::new(LoopbackSnapshotSource {
                rx: self.snapshot_rx.clone(),
            }),
        })
    }
}

struct LoopbackCommandSink {
    tx: Sender<Vec<u8>>,
}

impl CommandSink for LoopbackCommandSink {
    fn try_send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        match self.tx.try_send(payload.to_vec()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(TransportError::Unavailable),
            Err(TrySendError::Disconnected(_)) => Err(TransportError::Disconnected(
                "simulator endpoint dropped".to_string(),
            )),
        }
    }
}

struct LoopbackSnapshotSource {
    rx: Receiver<Vec<u8>>,
}

impl SnapshotSource for LoopbackSnapshotSource {
    fn try_recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.rx.try_recv() {
            Ok(payload) => Ok(Some(payload)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(TransportError::Disconnected(
                "simulator endpoint dropped".to_string(),
            )),
        }
    }
}

/// The simulator-side half of a loopback connection.
#[derive(Debug)]
pub struct SimulatorEndpoint {
    command_rx: Receiver<Vec<u8>>,
    snapshot_tx: Sender<Vec<u8>>,
    dropped_snapshots: AtomicU64,
}

impl SimulatorEndpoint {
    /// Broadcasts one encoded snapshot.
    ///
    /// Returns `false` if the channel was full and the payload was dropped.
    pub fn publish_snapshot_bytes(&self, payload: Vec<u8>) -> bool {
        match self.snapshot_tx.try_send(payload) {
            Ok(()) => true,
            Err(_) => {
                self.dropped_snapshots.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Number of snapshots dropped because the channel was full.
    pub fn dropped_snapshots(&self) -> u64 {
        self.dropped_snapshots.load(Ordering::Relaxed)
    }

    /// Takes one pending command, if any.
    pub fn try_recv_command(&self) -> Option<Vec<u8>> {
        self.command_rx.try_recv().ok()
    }

    /// Waits up to `timeout` for one command.
    pub fn recv_command_timeout(&self, timeout: Duration) -> Option<Vec<u8>> {
        match self.command_rx.recv_timeout(timeout) {
            Ok(payload) => Some(payload),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drains every pending command.
    pub fn drain_commands(&self) -> Vec<Vec<u8>> {
        self.command_rx.try_iter().collect()
    }
}
