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

use thiserror::Error;

/// An error that can occur while encoding an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The body identifier does not fit in the simulator's fixed-width id field.
    #[error("body id is {len} bytes long, at most {max} are accepted")]
    BodyIdTooLong {
        /// Length of the offending identifier, in bytes.
        len: usize,
        /// Maximum accepted length, in bytes.
        max: usize,
    },
    /// The serializer itself failed.
    #[error("failed to serialize message: {0}")]
    Serialize(String),
}

/// An inbound payload that could not be turned into a complete message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to decode {len}-byte payload: {reason}")]
pub struct DecodingError {
    /// Size of the rejected payload, in bytes.
    pub len: usize,
    /// What the decoder reported.
    pub reason: String,
}

impl DecodingError {
    pub(crate) fn new(len: usize, reason: impl Into<String>) -> Self {
        Self {
            len,
            reason: reason.into(),
        }
    }
}
