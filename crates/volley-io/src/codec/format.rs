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

use std::fmt;

use serde::{Deserialize, Serialize};

/// Byte-level framing used on the wire.
///
/// Both framings share one serde schema per message type, so switching the
/// format never changes which fields are carried.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireFormat {
    /// MessagePack with named fields. Self-describing.
    #[default]
    MessagePack,
    /// Positional bincode with the standard (varint, little-endian) configuration.
    Bincode,
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormat::MessagePack => write!(f, "msgpack"),
            WireFormat::Bincode => write!(f, "bincode"),
        }
    }
}
