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

//! Observability hooks for the bridge.
//!
//! Components never keep hidden "already reported" flags or global counters.
//! Instead they are handed an [`EventSink`] and report [`BridgeEvent`]s to it;
//! what happens to those events (logging, counting, forwarding to a test) is
//! decided by whoever builds the sink. `volley-telemetry` provides the
//! log-backed and counting implementations.

mod event;
mod sink;

pub use self::event::{BridgeEvent, CommandDropReason};
pub use self::sink::{ChannelSink, EventSink, FanoutSink, NoopSink, SharedSink};
