//! Response encoding for outgoing Kafka protocol messages.
//!
//! Every response is framed as a 4-byte size prefix followed by the
//! correlation id and the encoded body.

mod fetch;
mod groups;
mod metadata;
mod offsets;
mod produce;

use bytes::BufMut;

use crate::encode::ToByte;
use crate::error::Result;

// Re-export all response data types
pub use fetch::*;
pub use groups::*;
pub use metadata::*;
pub use offsets::*;
pub use produce::*;

/// Response header for Kafka protocol.
#[derive(Debug, Clone)]
pub struct ResponseHeader {
    pub correlation_id: i32,
}

impl ToByte for ResponseHeader {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.correlation_id.encode(buffer)
    }
}

/// Encode a nullable string in Kafka protocol format.
///
/// In the Kafka wire protocol, nullable strings are encoded as:
/// - `-1` (i16) if the string is None/null
/// - Length (i16) followed by UTF-8 bytes if the string is present
pub(crate) fn encode_nullable_string<W: BufMut>(s: Option<&str>, buffer: &mut W) -> Result<()> {
    match s {
        Some(val) => val.encode(buffer),
        None => (-1i16).encode(buffer),
    }
}

/// Response wrapper that includes correlation ID and response body.
pub struct Response {
    pub correlation_id: i32,
    body: Vec<u8>,
}

impl Response {
    /// Create a new response with the given correlation ID and body.
    pub fn new<T: ToByte>(correlation_id: i32, body: &T) -> Result<Self> {
        let mut buf = Vec::new();
        body.encode(&mut buf)?;
        Ok(Self {
            correlation_id,
            body: buf,
        })
    }

    /// Create a new response with pre-encoded body bytes.
    pub fn new_raw(correlation_id: i32, body: Vec<u8>) -> Self {
        Self {
            correlation_id,
            body,
        }
    }

    /// Encode the response to a buffer with the size prefix.
    pub fn encode_with_size(&self) -> Result<Vec<u8>> {
        let mut header = Vec::new();
        self.correlation_id.encode(&mut header)?;

        let total_size = (header.len() + self.body.len()) as i32;
        let mut result = Vec::with_capacity(4 + total_size as usize);
        total_size.encode(&mut result)?;
        result.extend_from_slice(&header);
        result.extend_from_slice(&self.body);
        Ok(result)
    }
}
