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

//! The single-slot, latest-wins world-state cache.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use volley_core::world::WorldSnapshot;

/// A published snapshot together with its freshness stamps.
#[derive(Debug, Clone)]
pub struct CachedSnapshot {
    /// The snapshot itself. Never mutated after publication.
    pub snapshot: Arc<WorldSnapshot>,
    /// Publication counter, starting at 1 for the first publish.
    pub sequence: u64,
    /// When the snapshot was published.
    pub received_at: Instant,
}

#[derive(Debug, Default)]
struct Slot {
    entry: Option<CachedSnapshot>,
    published: u64,
}

/// Holds exactly one "most recent" world snapshot.
///
/// Publishing replaces the previous snapshot wholesale; there is no queue and
/// no history. The lock is only held for the pointer swap or clone, so readers
/// never observe a partially written snapshot and never wait on I/O.
///
/// The handle is cheap to clone; all clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct StateCache {
    slot: Arc<RwLock<Slot>>,
}

impl StateCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the cached snapshot and returns its sequence number.
    pub fn publish(&self, snapshot: WorldSnapshot) -> u64 {
        let snapshot = Arc::new(snapshot);
        let received_at = Instant::now();
        let mut slot = self.write();
        slot.published += 1;
        let sequence = slot.published;
        slot.entry = Some(CachedSnapshot {
            snapshot,
            sequence,
            received_at,
        });
        sequence
    }

    /// Returns the most recent snapshot, or `None` if nothing was published yet.
    pub fn latest(&self) -> Option<Arc<WorldSnapshot>> {
        self.read()
            .entry
            .as_ref()
            .map(|entry| Arc::clone(&entry.snapshot))
    }

    /// Returns the most recent snapshot along with its freshness stamps.
    pub fn latest_entry(&self) -> Option<CachedSnapshot> {
        self.read().entry.clone()
    }

    /// Number of snapshots published so far, including invalidated ones.
    pub fn sequence(&self) -> u64 {
        self.read().published
    }

    /// Returns `true` if the cache is empty or its snapshot is older than `max_age`.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        match &self.read().entry {
            Some(entry) => entry.received_at.elapsed() > max_age,
            None => true,
        }
    }

    /// Empties the cache. Returns `true` if a snapshot was discarded.
    pub fn invalidate(&self) -> bool {
        self.write().entry.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use volley_core::math::Vec3;
    use volley_core::world::RigidBodyState;

    /// Builds a snapshot where every field encodes `n`, so a torn read shows up
    /// as a mismatch between fields.
    fn snapshot(n: u32) -> WorldSnapshot {
        let bodies = (0..7)
            .map(|slot| {
                RigidBodyState::from_extents(
                    format!("body{slot}"),
                    Vec3::new(n as f32, slot as f32, 0.0),
                    Vec3::new(n as f32, 0.0, 0.0),
                    Vec3::ONE,
                    1.0,
                    1.0,
                    true,
                )
            })
            .collect();
        WorldSnapshot {
            bodies,
            simulation_time: n as f32,
            score_player1: n,
            score_player2: n,
        }
    }

    #[test]
    fn test_empty_before_first_publish() {
        let cache = StateCache::new();
        assert!(cache.latest().is_none());
        assert!(cache.latest_entry().is_none());
        assert_eq!(cache.sequence(), 0);
        assert!(cache.is_stale(Duration::from_secs(60)));
    }

    #[test]
    fn test_latest_wins() {
        let cache = StateCache::new();
        assert_eq!(cache.publish(snapshot(1)), 1);
        assert_eq!(cache.publish(snapshot(2)), 2);
        assert_eq!(cache.publish(snapshot(3)), 3);

        let latest = cache.latest().unwrap();
        assert_eq!(latest.score_player1, 3);
        assert_eq!(cache.latest_entry().unwrap().sequence, 3);
    }

    #[test]
    fn test_readers_keep_their_snapshot_after_replacement() {
        let cache = StateCache::new();
        cache.publish(snapshot(1));
        let held = cache.latest().unwrap();
        cache.publish(snapshot(2));

        assert_eq!(held.score_player1, 1);
        assert_eq!(cache.latest().unwrap().score_player1, 2);
    }

    #[test]
    fn test_clones_share_the_slot() {
        let writer = StateCache::new();
        let reader = writer.clone();
        writer.publish(snapshot(5));
        assert_eq!(reader.latest().unwrap().score_player2, 5);
    }

    #[test]
    fn test_invalidate() {
        let cache = StateCache::new();
        assert!(!cache.invalidate());
        cache.publish(snapshot(1));
        assert!(cache.invalidate());
        assert!(cache.latest().is_none());
        assert_eq!(cache.sequence(), 1);
    }

    #[test]
    fn test_staleness() {
        let cache = StateCache::new();
        cache.publish(snapshot(1));
        assert!(!cache.is_stale(Duration::from_secs(60)));
        thread::sleep(Duration::from_millis(20));
        assert!(cache.is_stale(Duration::from_millis(5)));
    }

    #[test]
    fn test_no_torn_reads_under_contention() {
        let cache = StateCache::new();
        cache.publish(snapshot(0));

        thread::scope(|scope| {
            let writer = cache.clone();
            scope.spawn(move || {
                for n in 1..=2_000 {
                    writer.publish(snapshot(n));
                }
            });

            for _ in 0..4 {
                let reader = cache.clone();
                scope.spawn(move || {
                    let mut last_seen = 0;
                    for _ in 0..2_000 {
                        let snap = reader.latest().unwrap();
                        let n = snap.score_player1;
                        assert_eq!(snap.score_player2, n);
                        assert_eq!(snap.simulation_time, n as f32);
                        for body in &snap.bodies {
                            assert_eq!(body.position.x, n as f32);
                            assert_eq!(body.velocity.x, n as f32);
                        }
                        assert!(n >= last_seen, "snapshot went backwards");
                        last_seen = n;
                    }
                });
            }
        });

        assert_eq!(cache.latest().unwrap().score_player1, 2_000);
        assert_eq!(cache.sequence(), 2_001);
    }
}
