//! Metadata request parsing.

use nom::{IResult, number::complete::be_i32};
use nombytes::NomBytes;

use crate::parser::{bytes_to_string, parse_array, parse_string};

/// Metadata request data.
#[derive(Debug, Clone, Default)]
pub struct MetadataRequestData {
    /// The topics to fetch metadata for. None means all topics.
    pub topics: Option<Vec<String>>,
}

pub fn parse_metadata_request(
    s: NomBytes,
    _version: i16,
) -> IResult<NomBytes, MetadataRequestData> {
    let (rest, topic_count) = be_i32(s.clone())?;
    if topic_count == -1 {
        return Ok((rest, MetadataRequestData { topics: None }));
    }

    // parse_array re-reads the count and enforces the size bound, rejecting
    // any other negative value.
    let (s, names) = parse_array(parse_string)(s)?;
    let mut topics = Vec::with_capacity(names.len());
    for name in &names {
        topics.push(bytes_to_string(name)?);
    }

    Ok((
        s,
        MetadataRequestData {
            topics: Some(topics),
        },
    ))
}
