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

//! # Volley Infra
//!
//! Concrete implementations of the transport contracts defined in
//! `volley_core::transport`.
//!
//! - [`transport::loopback`]: in-process channels, used by tests and by
//!   embedders that host the simulator in the same process.
//! - `transport::zmq` (feature `zmq`): PUSH/SUB sockets talking to a live
//!   simulator process.

#![warn(missing_docs)]

pub mod transport;

pub use transport::loopback::{loopback, LoopbackConnector, SimulatorEndpoint};
#[cfg(feature = "zmq")]
pub use transport::zmq::ZmqConnector;
