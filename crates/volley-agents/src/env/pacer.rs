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


use std::thread;
use std::time::{Duration, Instant};

/// Fixed-period tick pacing.
///
/// Deadlines advance by exactly one period per tick, so short jitter in the
/// caller does not accumulate into drift. After an overrun longer than a full
/// period the schedule restarts from the current instant instead of firing a
/// burst of catch-up ticks.
#[derive(Debug, Clone)]
pub struct TickPacer {
    period: Duration,
    next_deadline: Option<Instant>,
    overruns: u64,
}

impl TickPacer {
    /// Creates a pacer with the given tick period.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_deadline: None,
            overruns: 0,
        }
    }

    /// Returns the tick period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of ticks whose deadline had already passed.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Restarts the schedule; the next tick waits a full period.
    pub fn reset(&mut self) {
        self.next_deadline = None;
    }

    /// Advances the schedule as of `now` and returns how long to sleep.
    pub fn advance(&mut self, now: Instant) -> Duration {
        let deadline = self.next_deadline.unwrap_or(now + self.period);
        let wait = deadline.saturating_duration_since(now);
        if wait.is_zero() {
            self.overruns += 1;
        }

        let next = deadline + self.period;
        self.next_deadline = Some(if next <= now { now + self.period } else { next });
        wait
    }

    /// Sleeps until the next tick boundary.
    pub fn wait_for_tick(&mut self) {
        let wait = self.advance(Instant::now());
        if !wait.is_zero() {
            thread::sleep(wait);
        }
    }
}
