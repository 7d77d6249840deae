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

//! Encoding and decoding of simulator messages.
//!
//! Every message is self-contained: one payload carries exactly one command
//! or one snapshot, with no extra framing. Decoding is all-or-nothing. A
//! payload that is truncated, has trailing bytes, or is missing a field is
//! rejected as a whole.

mod error;
mod format;

pub use self::error::{DecodingError, EncodingError};
pub use self::format::WireFormat;

use std::io::Cursor;

use serde::{de::DeserializeOwned, Serialize};
use volley_core::world::{OutgoingCommand, WorldSnapshot, MAX_BODY_ID_LEN};

/// Stateless encoder/decoder for one [`WireFormat`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WireCodec {
    format: WireFormat,
}

impl WireCodec {
    /// Creates a codec for the given framing.
    pub fn new(format: WireFormat) -> Self {
        Self { format }
    }

    /// Returns the framing this codec produces and accepts.
    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Encodes an outbound command.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::BodyIdTooLong`] if the body id is longer than
    /// [`MAX_BODY_ID_LEN`] bytes.
    pub fn encode_command(&self, command: &OutgoingCommand) -> Result<Vec<u8>, EncodingError> {
        let len = command.body_id.len();
        if len > MAX_BODY_ID_LEN {
            return Err(EncodingError::BodyIdTooLong {
                len,
                max: MAX_BODY_ID_LEN,
            });
        }
        encode(self.format, command)
    }

    /// Decodes an inbound world-state broadcast.
    ///
    /// A snapshot holding a body whose bounding volume has `min > max` on
    /// some axis (or a NaN corner) is rejected like a malformed payload.
    pub fn decode_snapshot(&self, bytes: &[u8]) -> Result<WorldSnapshot, DecodingError> {
        let snapshot: WorldSnapshot = decode(self.format, bytes)?;
        if let Some(body) = snapshot
            .bodies
            .iter()
            .find(|body| !body.bounding_volume.is_valid())
        {
            return Err(DecodingError::new(
                bytes.len(),
                format!("body '{}' has an inverted bounding volume", body.id),
            ));
        }
        Ok(snapshot)
    }

    /// Encodes a world snapshot, as the simulator does when broadcasting.
    pub fn encode_snapshot(&self, snapshot: &WorldSnapshot) -> Result<Vec<u8>, EncodingError> {
        encode(self.format, snapshot)
    }

    /// Decodes a command, as the simulator does on receipt.
    pub fn decode_command(&self, bytes: &[u8]) -> Result<OutgoingCommand, DecodingError> {
        decode(self.format, bytes)
    }
}

fn encode<T: Serialize>(format: WireFormat, value: &T) -> Result<Vec<u8>, EncodingError> {
    match format {
        WireFormat::MessagePack => {
            rmp_serde::to_vec_named(value).map_err(|e| EncodingError::Serialize(e.to_string()))
        }
        WireFormat::Bincode => bincode::serde::encode_to_vec(value, bincode::config::standard())
            .map_err(|e| EncodingError::Serialize(e.to_string())),
    }
}

fn decode<T: DeserializeOwned>(format: WireFormat, bytes: &[u8]) -> Result<T, DecodingError> {
    let len = bytes.len();
    let (value, consumed) = match format {
        WireFormat::MessagePack => {
            let mut cursor = Cursor::new(bytes);
            let value: T = rmp_serde::from_read(&mut cursor)
                .map_err(|e| DecodingError::new(len, e.to_string()))?;
            (value, cursor.position() as usize)
        }
        WireFormat::Bincode => {
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| DecodingError::new(len, e.to_string()))?
        }
    };

    if consumed != len {
        return Err(DecodingError::new(
            len,
            format!("{} trailing bytes after message", len - consumed),
        ));
    }
    Ok(value)
}
