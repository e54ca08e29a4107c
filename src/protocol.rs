//! Wire codec for the classic (v0) Kafka message set.
//!
//! A message set is a flat concatenation of entries, each laid out as:
//!
//! ```text
//! Offset  Size  Field
//! 0       8     offset
//! 8       4     message_size
//! 12      4     crc
//! 16      1     magic (0)
//! 17      1     attributes
//! 18      4+n   key   (nullable bytes)
//! ..      4+m   value (nullable bytes)
//! ```
//!
//! The CRC-32 (IEEE) checksum covers everything after the crc field, from the
//! magic byte through the end of the value.

use bytes::{BufMut, Bytes};
use nom::{
    InputLength, IResult,
    bytes::complete::take,
    number::complete::{be_i8, be_i32, be_i64, be_u32},
};
use nombytes::NomBytes;

use crate::{
    constants::{MESSAGE_CRC_SKIP, MESSAGE_SET_ENTRY_OVERHEAD},
    encode::ToByte,
    error::{Error, Result},
    parser::parse_nullable_bytes,
};

// CRC-32 (IEEE) polynomial, as used by the v0/v1 message format.
// Using a simple implementation since we don't want to add dependencies
const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB88320; // CRC-32 (IEEE) polynomial
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// Compute a CRC-32 (IEEE) checksum.
fn crc32(data: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &byte in data {
        let index = ((crc ^ byte as u32) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    !crc
}

/// A single message as carried on the wire inside a message set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireMessage {
    pub offset: i64,
    pub key: Option<Bytes>,
    pub value: Option<Bytes>,
}

impl WireMessage {
    pub fn new(offset: i64, key: Option<Bytes>, value: Option<Bytes>) -> Self {
        WireMessage { offset, key, value }
    }
}

/// Encode messages as a v0 message set, computing each entry's CRC.
pub fn encode_message_set<W: BufMut>(buffer: &mut W, messages: &[WireMessage]) -> Result<()> {
    for message in messages {
        let mut body = Vec::with_capacity(
            MESSAGE_SET_ENTRY_OVERHEAD
                + message.key.as_ref().map_or(0, |k| k.len())
                + message.value.as_ref().map_or(0, |v| v.len()),
        );
        0i8.encode(&mut body)?; // magic
        0i8.encode(&mut body)?; // attributes
        message.key.encode(&mut body)?;
        message.value.encode(&mut body)?;

        buffer.put_i64(message.offset);
        buffer.put_i32((body.len() + MESSAGE_CRC_SKIP) as i32);
        buffer.put_u32(crc32(&body));
        buffer.put_slice(&body);
    }
    Ok(())
}

/// Encode messages as a standalone v0 message set.
pub fn message_set_bytes(messages: &[WireMessage]) -> Result<Bytes> {
    let mut buffer = Vec::new();
    encode_message_set(&mut buffer, messages)?;
    Ok(buffer.into())
}

fn parse_message(s: NomBytes) -> IResult<NomBytes, WireMessage> {
    let (s, offset) = be_i64(s)?;
    let (s, size) = be_i32(s)?;

    // crc + magic + attributes + two null fields is the smallest valid body
    if (size as usize) < MESSAGE_CRC_SKIP + 2 {
        return Err(nom::Err::Failure(nom::error::Error::new(
            s,
            nom::error::ErrorKind::Verify,
        )));
    }

    let (s, body) = take(size as u32)(s)?;
    let body_bytes = body.clone().into_bytes();

    let (b, crc) = be_u32(body)?;
    if crc != crc32(&body_bytes[MESSAGE_CRC_SKIP..]) {
        return Err(nom::Err::Failure(nom::error::Error::new(
            b,
            nom::error::ErrorKind::Verify,
        )));
    }

    let (b, magic) = be_i8(b)?;
    if magic != 0 {
        return Err(nom::Err::Failure(nom::error::Error::new(
            b,
            nom::error::ErrorKind::Verify,
        )));
    }

    let (b, _attributes) = be_i8(b)?;
    let (b, key) = parse_nullable_bytes(b)?;
    let (_, value) = parse_nullable_bytes(b)?;

    Ok((s, WireMessage { offset, key, value }))
}

/// Decode a complete v0 message set, validating each entry's CRC.
///
/// The input must span exactly the message set; a truncated trailing entry,
/// a CRC mismatch or an unknown magic byte is a parsing error.
pub fn parse_message_set(data: Bytes) -> Result<Vec<WireMessage>> {
    let mut s = NomBytes::new(data.clone());
    let mut messages = Vec::new();

    while s.input_len() > 0 {
        let (rest, message) = parse_message(s).map_err(|_| Error::ParsingError(data.clone()))?;
        messages.push(message);
        s = rest;
    }

    Ok(messages)
}
