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


//! # Volley Telemetry
//!
//! Logging bootstrap and the standard [`EventSink`](volley_core::telemetry::EventSink)
//! implementations: one that renders bridge events through `log`, and one
//! that counts them.

#![warn(missing_docs)]

pub mod counters;
pub mod logging;
pub mod sink;

pub use counters::{BridgeCounters, CounterSnapshot, CountingSink};
pub use logging::{init_logging, init_logging_with, init_test_logging};
pub use sink::LogEventSink;
