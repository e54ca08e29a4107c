//! Produce request parsing.

use nom::{
    IResult,
    bytes::complete::take,
    number::complete::{be_i16, be_i32},
};
use nombytes::NomBytes;

use crate::parser::{bytes_to_string, parse_array, parse_string};
use crate::protocol::{WireMessage, parse_message_set};

/// Produce request data.
#[derive(Debug, Clone)]
pub struct ProduceRequestData {
    pub required_acks: i16,
    pub timeout_ms: i32,
    pub topics: Vec<ProduceTopicData>,
}

#[derive(Debug, Clone)]
pub struct ProduceTopicData {
    pub name: String,
    pub partitions: Vec<ProducePartitionData>,
}

#[derive(Debug, Clone)]
pub struct ProducePartitionData {
    pub partition_index: i32,
    /// Messages decoded (and CRC-checked) out of the partition's message set.
    pub messages: Vec<WireMessage>,
}

pub fn parse_produce_request(s: NomBytes, _version: i16) -> IResult<NomBytes, ProduceRequestData> {
    let (s, required_acks) = be_i16(s)?;
    let (s, timeout_ms) = be_i32(s)?;
    let (s, topics) = parse_array(parse_produce_topic)(s)?;

    Ok((
        s,
        ProduceRequestData {
            required_acks,
            timeout_ms,
            topics,
        },
    ))
}

fn parse_produce_topic(s: NomBytes) -> IResult<NomBytes, ProduceTopicData> {
    let (s, name) = parse_string(s)?;
    let (s, partitions) = parse_array(parse_produce_partition)(s)?;

    Ok((
        s,
        ProduceTopicData {
            name: bytes_to_string(&name)?,
            partitions,
        },
    ))
}

fn parse_produce_partition(s: NomBytes) -> IResult<NomBytes, ProducePartitionData> {
    let (s, partition_index) = be_i32(s)?;
    let (s, message_set_size) = be_i32(s)?;
    if message_set_size < 0 {
        return Err(nom::Err::Failure(nom::error::Error::new(
            s,
            nom::error::ErrorKind::TooLarge,
        )));
    }
    let (s, records) = take(message_set_size as u32)(s)?;
    let messages = parse_message_set(records.into_bytes()).map_err(|_| {
        nom::Err::Failure(nom::error::Error::new(
            s.clone(),
            nom::error::ErrorKind::Verify,
        ))
    })?;

    Ok((
        s,
        ProducePartitionData {
            partition_index,
            messages,
        },
    ))
}
