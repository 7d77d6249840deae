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

use std::sync::Arc;

use super::BridgeEvent;

/// Receives diagnostic events from bridge components.
///
/// Sinks are shared between the background receiver thread and the control
/// loop, so they must be thread-safe and must never block.
pub trait EventSink: Send + Sync {
    /// Handles one event.
    fn emit(&self, event: BridgeEvent);
}

/// A reference-counted sink handle, as stored by components.
pub type SharedSink = Arc<dyn EventSink>;

/// Sink that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: BridgeEvent) {}
}

/// Forwards events into a bounded channel.
///
/// If the channel is full or its receiver was dropped, the event is discarded:
/// observability must never apply backpressure to the bridge.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: flume::Sender<BridgeEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiver end that drains it.
    pub fn bounded(capacity: usize) -> (Self, flume::Receiver<BridgeEvent>) {
        let (sender, receiver) = flume::bounded(capacity);
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: BridgeEvent) {
        if let Err(e) = self.sender.try_send(event) {
            log::trace!("Dropping bridge event: {e}");
        }
    }
}

/// Dispatches every event to several sinks, in order.
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<SharedSink>,
}

impl FanoutSink {
    /// Creates an empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink, returning the extended fan-out.
    pub fn with(mut self, sink: SharedSink) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Returns the number of attached sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns `true` if no sink is attached.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: BridgeEvent) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.emit(event.clone());
            }
            last.emit(event);
        }
    }
}
