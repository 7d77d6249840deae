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

//! # Volley Sync
//!
//! The client-side synchronization layer: a background thread keeps a
//! latest-wins [`StateCache`] current, and a [`CommandDispatcher`] turns
//! velocity requests into complete commands built from that cache.

#![warn(missing_docs)]

pub mod cache;
pub mod dispatcher;
pub mod receiver;

pub use cache::{CachedSnapshot, StateCache};
pub use dispatcher::{build_command, CommandDispatcher, DispatchError};
pub use receiver::{BackgroundReceiver, DecodeFailurePolicy, ReceiverConfig, ReceiverStats};
