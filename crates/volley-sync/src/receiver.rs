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

//! Background thread feeding the [`StateCache`] from the state transport.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use serde::{Deserialize, Serialize};
use volley_core::telemetry::{BridgeEvent, SharedSink};
use volley_core::transport::SnapshotSource;
use volley_io::WireCodec;

use crate::cache::StateCache;

/// What the receiver does with the cache when a payload fails to decode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodeFailurePolicy {
    /// Keep serving the last good snapshot.
    #[default]
    KeepLast,
    /// Empty the cache until the next good snapshot arrives.
    Invalidate,
}

/// Configuration for the [`BackgroundReceiver`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Sleep between polls when no message is pending.
    pub idle_sleep: Duration,
    /// Sleep after a transport failure before retrying.
    pub error_backoff: Duration,
    /// Emit a [`BridgeEvent::ReceiverStats`] every this many published
    /// snapshots. Zero disables the periodic summary.
    pub stats_interval: u64,
    /// Cache handling on decode failure.
    pub decode_failure_policy: DecodeFailurePolicy,
    /// How long [`Drop`] waits for the thread before detaching it.
    pub join_timeout: Duration,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            idle_sleep: Duration::from_micros(500),
            error_backoff: Duration::from_millis(100),
            stats_interval: 1000,
            decode_failure_policy: DecodeFailurePolicy::KeepLast,
            join_timeout: Duration::from_secs(1),
        }
    }
}

/// Running totals of the receiver loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverStats {
    /// Snapshots decoded and published.
    pub published: u64,
    /// Payloads discarded by the decoder.
    pub decode_failures: u64,
    /// Transport failures that triggered a backoff.
    pub transport_failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    published: AtomicU64,
    decode_failures: AtomicU64,
    transport_failures: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> ReceiverStats {
        ReceiverStats {
            published: self.published.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
        }
    }
}

/// Owns the thread that drains the state transport into a [`StateCache`].
///
/// The loop never lets an error escape: decode failures are reported and
/// skipped, transport failures are reported and retried after a backoff.
/// Dropping the receiver stops it with [`ReceiverConfig::join_timeout`].
pub struct BackgroundReceiver {
    running: Arc<AtomicBool>,
    counters: Arc<Counters>,
    handle: Option<thread::JoinHandle<()>>,
    done_rx: Receiver<()>,
    join_timeout: Duration,
}

impl BackgroundReceiver {
    /// Spawns the receiver thread.
    ///
    /// # Errors
    ///
    /// Fails only if the operating system refuses to create the thread.
    pub fn spawn(
        mut source: Box<dyn SnapshotSource>,
        codec: WireCodec,
        cache: StateCache,
        config: ReceiverConfig,
        events: SharedSink,
    ) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let counters = Arc::new(Counters::default());
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let join_timeout = config.join_timeout;

        let thread_running = Arc::clone(&running);
        let thread_counters = Arc::clone(&counters);

        let handle = thread::Builder::new()
            .name("volley-receiver".to_string())
            .spawn(move || {
                log::info!("Snapshot receiver started ({} framing).", codec.format());
                let mut first_reported = false;

                while thread_running.load(Ordering::Relaxed) {
                    match source.try_recv() {
                        Ok(Some(payload)) => handle_payload(
                            &payload,
                            &codec,
                            &cache,
                            &config,
                            &thread_counters,
                            &events,
                            &mut first_reported,
                        ),
                        Ok(None) => thread::sleep(config.idle_sleep),
                        Err(e) => {
                            thread_counters
                                .transport_failures
                                .fetch_add(1, Ordering::Relaxed);
                            log::error!(
                                "Snapshot transport failure: {e}. Retrying in {:?}.",
                                config.error_backoff
                            );
                            events.emit(BridgeEvent::TransportFailed {
                                reason: e.to_string(),
                            });
                            thread::sleep(config.error_backoff);
                        }
                    }
                }

                drop(source);
                log::info!("Snapshot receiver stopped.");
                let _ = done_tx.send(());
            })?;

        Ok(Self {
            running,
            counters,
            handle: Some(handle),
            done_rx,
            join_timeout,
        })
    }

    /// Returns `true` until [`stop`](Self::stop) has been called.
    pub fn is_running(&self) -> bool {
        self.handle.is_some() && self.running.load(Ordering::SeqCst)
    }

    /// Returns the loop's running totals.
    pub fn stats(&self) -> ReceiverStats {
        self.counters.snapshot()
    }

    /// Signals the thread to stop and waits up to `timeout` for it to finish.
    ///
    /// Returns `true` if the thread was joined (or was already stopped), and
    /// `false` if it did not finish in time and was detached.
    ///
    /// The thread releases the transport source before it signals completion,
    /// so after a `true` return the source is already closed. A detached thread
    /// keeps the source until its pending `try_recv` returns and it sees the
    /// stop flag; a source that never returns is never closed.
    pub fn stop(&mut self, timeout: Duration) -> bool {
        self.running.store(false, Ordering::SeqCst);
        let Some(handle) = self.handle.take() else {
            return true;
        };

        match self.done_rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if handle.join().is_err() {
                    log::error!("Snapshot receiver thread panicked.");
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                log::warn!("Snapshot receiver did not stop within {timeout:?}; detaching it.");
                false
            }
        }
    }
}

impl Drop for BackgroundReceiver {
    fn drop(&mut self) {
        self.stop(self.join_timeout);
    }
}

impl std::fmt::Debug for BackgroundReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundReceiver")
            .field("running", &self.is_running())
            .field("stats", &self.stats())
            .finish()
    }
}

fn handle_payload(
    payload: &[u8],
    codec: &WireCodec,
    cache: &StateCache,
    config: &ReceiverConfig,
    counters: &Counters,
    events: &SharedSink,
    first_reported: &mut bool,
) {
    match codec.decode_snapshot(payload) {
        Ok(snapshot) => {
            let body_count = snapshot.body_count();
            let simulation_time = snapshot.simulation_time;
            let sequence = cache.publish(snapshot);
            let published = counters.published.fetch_add(1, Ordering::Relaxed) + 1;
            log::trace!("Published snapshot #{sequence} (t={simulation_time:.3}).");

            if !*first_reported {
                *first_reported = true;
                log::info!(
                    "First snapshot received: {body_count} bodies, {} bytes, t={simulation_time:.3}.",
                    payload.len()
                );
                events.emit(BridgeEvent::FirstSnapshot {
                    body_count,
                    simulation_time,
                    payload_len: payload.len(),
                });
            }

            if config.stats_interval > 0 && published % config.stats_interval == 0 {
                let stats = counters.snapshot();
                log::debug!("Snapshot receiver stats: {stats:?}");
                events.emit(BridgeEvent::ReceiverStats {
                    published: stats.published,
                    decode_failures: stats.decode_failures,
                    transport_failures: stats.transport_failures,
                });
            }
        }
        Err(e) => {
            counters.decode_failures.fetch_add(1, Ordering::Relaxed);
            log::warn!("Discarding snapshot payload: {e}");
            if config.decode_failure_policy == DecodeFailurePolicy::Invalidate && cache.invalidate()
            {
                log::debug!("State cache invalidated after decode failure.");
            }
            events.emit(BridgeEvent::DecodeFailed {
                payload_len: e.len,
                reason: e.reason,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use volley_core::math::Vec3;
    use volley_core::telemetry::{ChannelSink, NoopSink};
    use volley_core::transport::{Endpoints, TransportConnector, TransportError};
    use volley_core::world::{RigidBodyState, WorldSnapshot};
    use volley_infra::{loopback, SimulatorEndpoint};

    fn snapshot(time: f32) -> WorldSnapshot {
        WorldSnapshot {
            bodies: vec![RigidBodyState::from_extents(
                "ball",
                Vec3::ZERO,
                Vec3::new(-10.0, 0.0, 0.0),
                Vec3::ONE,
                1.0,
                1.0,
                true,
            )],
            simulation_time: time,
            score_player1: 0,
            score_player2: 0,
        }
    }

    fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        condition()
    }

    fn start(
        config: ReceiverConfig,
        events: SharedSink,
    ) -> (BackgroundReceiver, StateCache, SimulatorEndpoint) {
        let (mut connector, simulator) = loopback(64);
        let pair = connector.connect(&Endpoints::default()).unwrap();
        let cache = StateCache::new();
        let receiver = BackgroundReceiver::spawn(
            pair.snapshots,
            WireCodec::default(),
            cache.clone(),
            config,
            events,
        )
        .unwrap();
        (receiver, cache, simulator)
    }

    fn publish(simulator: &SimulatorEndpoint, time: f32) {
        let bytes = WireCodec::default().encode_snapshot(&snapshot(time)).unwrap();
        assert!(simulator.publish_snapshot_bytes(bytes));
    }

    #[test]
    fn test_receiver_publishes_latest_snapshot() {
        let (mut receiver, cache, simulator) =
            start(ReceiverConfig::default(), Arc::new(NoopSink));
        assert!(receiver.is_running());

        publish(&simulator, 1.0);
        publish(&simulator, 2.0);
        assert!(wait_until(Duration::from_secs(2), || {
            cache
                .latest()
                .is_some_and(|snap| snap.simulation_time == 2.0)
        }));
        assert_eq!(receiver.stats().published, 2);

        assert!(receiver.stop(Duration::from_secs(1)));
        assert!(!receiver.is_running());
    }

    #[test]
    fn test_first_snapshot_reported_once() {
        let (sink, events) = ChannelSink::bounded(64);
        let config = ReceiverConfig {
            stats_interval: 2,
            ..Default::default()
        };
        let (mut receiver, _cache, simulator) = start(config, Arc::new(sink));

        for i in 0..4 {
            publish(&simulator, i as f32);
        }
        assert!(wait_until(Duration::from_secs(2), || receiver.stats().published == 4));
        receiver.stop(Duration::from_secs(1));

        let events: Vec<_> = events.try_iter().collect();
        let firsts = events
            .iter()
            .filter(|e| matches!(e, BridgeEvent::FirstSnapshot { .. }))
            .count();
        let stats = events
            .iter()
            .filter(|e| matches!(e, BridgeEvent::ReceiverStats { .. }))
            .count();
        assert_eq!(firsts, 1);
        assert_eq!(stats, 2);
    }

    #[test]
    fn test_decode_failure_keeps_last_snapshot() {
        let (sink, events) = ChannelSink::bounded(64);
        let (mut receiver, cache, simulator) = start(ReceiverConfig::default(), Arc::new(sink));

        publish(&simulator, 1.0);
        assert!(simulator.publish_snapshot_bytes(vec![0xc1, 0x00, 0x01]));
        assert!(wait_until(Duration::from_secs(2), || {
            receiver.stats().decode_failures == 1
        }));
        receiver.stop(Duration::from_secs(1));

        assert_eq!(cache.latest().unwrap().simulation_time, 1.0);
        assert!(events
            .try_iter()
            .any(|e| matches!(e, BridgeEvent::DecodeFailed { payload_len: 3, .. })));
    }

    #[test]
    fn test_decode_failure_can_invalidate() {
        let config = ReceiverConfig {
            decode_failure_policy: DecodeFailurePolicy::Invalidate,
            ..Default::default()
        };
        let (mut receiver, cache, simulator) = start(config, Arc::new(NoopSink));

        publish(&simulator, 1.0);
        assert!(wait_until(Duration::from_secs(2), || cache.latest().is_some()));
        assert!(simulator.publish_snapshot_bytes(vec![0xff]));
        assert!(wait_until(Duration::from_secs(2), || cache.latest().is_none()));

        publish(&simulator, 2.0);
        assert!(wait_until(Duration::from_secs(2), || cache.latest().is_some()));
        receiver.stop(Duration::from_secs(1));
    }

    #[test]
    fn test_transport_failure_is_contained() {
        let (sink, events) = ChannelSink::bounded(64);
        let config = ReceiverConfig {
            error_backoff: Duration::from_millis(5),
            ..Default::default()
        };
        let (mut receiver, _cache, simulator) = start(config, Arc::new(sink));
        drop(simulator);

        assert!(wait_until(Duration::from_secs(2), || {
            receiver.stats().transport_failures >= 2
        }));
        assert!(receiver.is_running());
        assert!(receiver.stop(Duration::from_secs(1)));
        assert!(events
            .try_iter()
            .any(|e| matches!(e, BridgeEvent::TransportFailed { .. })));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut receiver, _cache, _simulator) =
            start(ReceiverConfig::default(), Arc::new(NoopSink));
        assert!(receiver.stop(Duration::from_secs(1)));
        assert!(receiver.stop(Duration::from_secs(1)));
    }

    /// Blocks for `delay` on every poll and records when it is dropped.
    struct SlowSource {
        delay: Duration,
        released: Arc<AtomicBool>,
    }

    impl SnapshotSource for SlowSource {
        fn try_recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
            thread::sleep(self.delay);
            Ok(None)
        }
    }

    impl Drop for SlowSource {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    fn spawn_slow(delay: Duration) -> (BackgroundReceiver, Arc<AtomicBool>) {
        let released = Arc::new(AtomicBool::new(false));
        let source = SlowSource {
            delay,
            released: Arc::clone(&released),
        };
        let receiver = BackgroundReceiver::spawn(
            Box::new(source),
            WireCodec::default(),
            StateCache::new(),
            ReceiverConfig::default(),
            Arc::new(NoopSink),
        )
        .unwrap();
        (receiver, released)
    }

    #[test]
    fn test_stop_detaches_after_timeout() {
        let (mut receiver, released) = spawn_slow(Duration::from_millis(300));

        thread::sleep(Duration::from_millis(20));
        let start = Instant::now();
        assert!(!receiver.stop(Duration::from_millis(20)));
        assert!(start.elapsed() < Duration::from_millis(250));

        // The detached thread still closes the source once its poll returns.
        assert!(wait_until(Duration::from_secs(2), || {
            released.load(Ordering::SeqCst)
        }));
    }

    #[test]
    fn test_joined_stop_has_released_the_source() {
        let (mut receiver, released) = spawn_slow(Duration::from_millis(1));

        thread::sleep(Duration::from_millis(10));
        assert!(receiver.stop(Duration::from_secs(1)));
        assert!(released.load(Ordering::SeqCst));
    }
}
