//! Request parsing for incoming Kafka protocol messages.
//!
//! Only the classic (v0) request shapes are understood; that is what the
//! seven supported APIs looked like before flexible versions existed.

mod fetch;
mod groups;
mod metadata;
mod offsets;
mod produce;

use bytes::Bytes;
use nom::{
    IResult,
    number::complete::{be_i16, be_i32},
};
use nombytes::NomBytes;

use crate::error::{Error, Result};
use crate::parser::{bytes_to_string_opt, parse_nullable_string};

// Re-export all request data types
pub use fetch::*;
pub use groups::*;
pub use metadata::*;
pub use offsets::*;
pub use produce::*;

/// API keys for the supported subset of the Kafka protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum ApiKey {
    Produce = 0,
    Fetch = 1,
    Offsets = 2,
    Metadata = 3,
    OffsetCommit = 8,
    OffsetFetch = 9,
    GroupCoordinator = 10,
    Unknown(i16),
}

impl From<i16> for ApiKey {
    fn from(value: i16) -> Self {
        match value {
            0 => ApiKey::Produce,
            1 => ApiKey::Fetch,
            2 => ApiKey::Offsets,
            3 => ApiKey::Metadata,
            8 => ApiKey::OffsetCommit,
            9 => ApiKey::OffsetFetch,
            10 => ApiKey::GroupCoordinator,
            n => ApiKey::Unknown(n),
        }
    }
}

impl From<ApiKey> for i16 {
    fn from(key: ApiKey) -> Self {
        match key {
            ApiKey::Produce => 0,
            ApiKey::Fetch => 1,
            ApiKey::Offsets => 2,
            ApiKey::Metadata => 3,
            ApiKey::OffsetCommit => 8,
            ApiKey::OffsetFetch => 9,
            ApiKey::GroupCoordinator => 10,
            ApiKey::Unknown(n) => n,
        }
    }
}

impl ApiKey {
    /// Returns a static string name for this API key.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKey::Produce => "Produce",
            ApiKey::Fetch => "Fetch",
            ApiKey::Offsets => "Offsets",
            ApiKey::Metadata => "Metadata",
            ApiKey::OffsetCommit => "OffsetCommit",
            ApiKey::OffsetFetch => "OffsetFetch",
            ApiKey::GroupCoordinator => "GroupCoordinator",
            ApiKey::Unknown(_) => "Unknown",
        }
    }
}

/// Parsed request header from incoming Kafka messages.
#[derive(Debug, Clone)]
pub struct RequestHeader {
    pub api_key: ApiKey,
    pub api_version: i16,
    pub correlation_id: i32,
    pub client_id: Option<String>,
}

/// Parse a request header from bytes.
pub fn parse_request_header(s: NomBytes) -> IResult<NomBytes, RequestHeader> {
    let (s, api_key) = be_i16(s)?;
    let (s, api_version) = be_i16(s)?;
    let (s, correlation_id) = be_i32(s)?;
    let (s, client_id) = parse_nullable_string(s)?;

    let client_id = bytes_to_string_opt(client_id)?;

    Ok((
        s,
        RequestHeader {
            api_key: ApiKey::from(api_key),
            api_version,
            correlation_id,
            client_id,
        },
    ))
}

/// Parsed Kafka request with header and body.
#[derive(Debug)]
pub enum Request {
    Produce(RequestHeader, ProduceRequestData),
    Fetch(RequestHeader, FetchRequestData),
    Offsets(RequestHeader, OffsetsRequestData),
    Metadata(RequestHeader, MetadataRequestData),
    OffsetCommit(RequestHeader, OffsetCommitRequestData),
    OffsetFetch(RequestHeader, OffsetFetchRequestData),
    GroupCoordinator(RequestHeader, GroupCoordinatorRequestData),
    Unknown(RequestHeader, Bytes),
}

impl Request {
    /// Get the request header.
    pub fn header(&self) -> &RequestHeader {
        match self {
            Request::Produce(h, _) => h,
            Request::Fetch(h, _) => h,
            Request::Offsets(h, _) => h,
            Request::Metadata(h, _) => h,
            Request::OffsetCommit(h, _) => h,
            Request::OffsetFetch(h, _) => h,
            Request::GroupCoordinator(h, _) => h,
            Request::Unknown(h, _) => h,
        }
    }

    /// Parse a request from raw bytes.
    pub fn parse(data: Bytes) -> Result<Self> {
        let input = NomBytes::new(data.clone());
        let (remaining, header) =
            parse_request_header(input).map_err(|_| Error::ParsingError(data.clone()))?;

        match header.api_key {
            ApiKey::Produce => {
                let (_, body) = produce::parse_produce_request(remaining, header.api_version)
                    .map_err(|_| Error::ParsingError(data))?;
                Ok(Request::Produce(header, body))
            }
            ApiKey::Fetch => {
                let (_, body) = fetch::parse_fetch_request(remaining, header.api_version)
                    .map_err(|_| Error::ParsingError(data))?;
                Ok(Request::Fetch(header, body))
            }
            ApiKey::Offsets => {
                let (_, body) = offsets::parse_offsets_request(remaining, header.api_version)
                    .map_err(|_| Error::ParsingError(data))?;
                Ok(Request::Offsets(header, body))
            }
            ApiKey::Metadata => {
                let (_, body) = metadata::parse_metadata_request(remaining, header.api_version)
                    .map_err(|_| Error::ParsingError(data))?;
                Ok(Request::Metadata(header, body))
            }
            ApiKey::OffsetCommit => {
                let (_, body) = offsets::parse_offset_commit_request(remaining, header.api_version)
                    .map_err(|_| Error::ParsingError(data))?;
                Ok(Request::OffsetCommit(header, body))
            }
            ApiKey::OffsetFetch => {
                let (_, body) = offsets::parse_offset_fetch_request(remaining, header.api_version)
                    .map_err(|_| Error::ParsingError(data))?;
                Ok(Request::OffsetFetch(header, body))
            }
            ApiKey::GroupCoordinator => {
                let (_, body) =
                    groups::parse_group_coordinator_request(remaining, header.api_version)
                        .map_err(|_| Error::ParsingError(data))?;
                Ok(Request::GroupCoordinator(header, body))
            }
            ApiKey::Unknown(_) => Ok(Request::Unknown(header, remaining.into_bytes())),
        }
    }
}
