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

//! The world data model exchanged with the simulator.
//!
//! The simulator owns the true state of every body. It broadcasts it as
//! [`WorldSnapshot`]s and accepts [`OutgoingCommand`]s, each of which is a
//! complete body description: the protocol has no partial-update form.
//!
//! Field names and field order follow the simulator's own structs so that
//! both named and positional framings interoperate with it.

mod body;
mod command;
mod snapshot;

pub use self::body::RigidBodyState;
pub use self::command::{OutgoingCommand, MAX_BODY_ID_LEN};
pub use self::snapshot::WorldSnapshot;
