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


//! Atomic tallies of bridge events.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use volley_core::telemetry::{BridgeEvent, EventSink, NoopSink, SharedSink};

/// A point-in-time copy of [`BridgeCounters`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// `FirstSnapshot` events seen (one per receiver lifetime).
    pub first_snapshots: u64,
    /// Latest `published` figure from a `ReceiverStats` event.
    pub snapshots_published: u64,
    /// Malformed snapshot payloads.
    pub decode_failures: u64,
    /// State transport failures.
    pub transport_failures: u64,
    /// Commands handed to the transport.
    pub commands_sent: u64,
    /// Commands dropped before reaching the transport.
    pub commands_dropped: u64,
    /// Steps that found no world state.
    pub no_state_steps: u64,
    /// Finished episodes.
    pub episodes: u64,
}

/// Lock-free counters fed by a [`CountingSink`].
#[derive(Debug, Default)]
pub struct BridgeCounters {
    first_snapshots: AtomicU64,
    snapshots_published: AtomicU64,
    decode_failures: AtomicU64,
    transport_failures: AtomicU64,
    commands_sent: AtomicU64,
    commands_dropped: AtomicU64,
    no_state_steps: AtomicU64,
    episodes: AtomicU64,
}

impl BridgeCounters {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the counters for one event.
    pub fn record(&self, event: &BridgeEvent) {
        let counter = match event {
            BridgeEvent::FirstSnapshot { .. } => &self.first_snapshots,
            BridgeEvent::ReceiverStats { published, .. } => {
                self.snapshots_published.fetch_max(*published, Ordering::Relaxed);
                return;
            }
            BridgeEvent::DecodeFailed { .. } => &self.decode_failures,
            BridgeEvent::TransportFailed { .. } => &self.transport_failures,
            BridgeEvent::CommandSent { .. } => &self.commands_sent,
            BridgeEvent::CommandDropped { .. } => &self.commands_dropped,
            BridgeEvent::NoStateAvailable { .. } => &self.no_state_steps,
            BridgeEvent::EpisodeEnded { .. } => &self.episodes,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads every counter.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            first_snapshots: self.first_snapshots.load(Ordering::Relaxed),
            snapshots_published: self.snapshots_published.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
            commands_sent: self.commands_sent.load(Ordering::Relaxed),
            commands_dropped: self.commands_dropped.load(Ordering::Relaxed),
            no_state_steps: self.no_state_steps.load(Ordering::Relaxed),
            episodes: self.episodes.load(Ordering::Relaxed),
        }
    }
}

/// Counts every event, then forwards it to an inner sink.
#[derive(Clone)]
pub struct CountingSink {
    counters: Arc<BridgeCounters>,
    inner: SharedSink,
}

impl CountingSink {
    /// Counts events without forwarding them.
    pub fn new() -> Self {
        Self::wrapping(Arc::new(NoopSink))
    }

    /// Counts events and forwards them to `inner`.
    pub fn wrapping(inner: SharedSink) -> Self {
        Self {
            counters: Arc::new(BridgeCounters::new()),
            inner,
        }
    }

    /// Returns a handle to the shared counters.
    pub fn counters(&self) -> Arc<BridgeCounters> {
        Arc::clone(&self.counters)
    }
}

impl Default for CountingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for CountingSink {
    fn emit(&self, event: BridgeEvent) {
        self.counters.record(&event);
        self.inner.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volley_core::telemetry::{ChannelSink, CommandDropReason};

    #[test]
    fn test_counts_and_forwards() {
        let (channel, rx) = ChannelSink::bounded(8);
        let sink = CountingSink::wrapping(Arc::new(channel));
        let counters = sink.counters();

        sink.emit(BridgeEvent::CommandSent {
            body_id: "paddle1".to_string(),
        });
        sink.emit(BridgeEvent::CommandDropped {
            body_id: "paddle2".to_string(),
            reason: CommandDropReason::NoStateAvailable,
        });
        sink.emit(BridgeEvent::CommandSent {
            body_id: "paddle1".to_string(),
        });

        let snap = counters.snapshot();
        assert_eq!(snap.commands_sent, 2);
        assert_eq!(snap.commands_dropped, 1);
        assert_eq!(rx.len(), 3);
    }

    #[test]
    fn test_receiver_stats_keep_the_maximum() {
        let counters = BridgeCounters::new();
        for published in [1000, 3000, 2000] {
            counters.record(&BridgeEvent::ReceiverStats {
                published,
                decode_failures: 0,
                transport_failures: 0,
            });
        }
        assert_eq!(counters.snapshot().snapshots_published, 3000);
        assert_eq!(counters.snapshot().decode_failures, 0);
    }
}
