//! Offset-related request parsing (Offsets, OffsetCommit, OffsetFetch).

use nom::{
    IResult,
    number::complete::{be_i32, be_i64},
};
use nombytes::NomBytes;

use crate::parser::{
    bytes_to_string, bytes_to_string_opt, parse_array, parse_nullable_string, parse_string,
};

// ============================================================================
// Offsets (ListOffsets v0)
// ============================================================================

/// Offsets request data.
#[derive(Debug, Clone)]
pub struct OffsetsRequestData {
    pub replica_id: i32,
    pub topics: Vec<OffsetsTopicData>,
}

#[derive(Debug, Clone)]
pub struct OffsetsTopicData {
    pub name: String,
    pub partitions: Vec<OffsetsPartitionData>,
}

#[derive(Debug, Clone)]
pub struct OffsetsPartitionData {
    pub partition_index: i32,
    /// Only the sentinels -1 (latest) and -2 (earliest) are supported.
    pub time: i64,
    /// Cap on how many offsets the response may carry for this partition.
    pub max_offsets: i32,
}

pub fn parse_offsets_request(s: NomBytes, _version: i16) -> IResult<NomBytes, OffsetsRequestData> {
    let (s, replica_id) = be_i32(s)?;
    let (s, topics) = parse_array(parse_offsets_topic)(s)?;

    Ok((s, OffsetsRequestData { replica_id, topics }))
}

fn parse_offsets_topic(s: NomBytes) -> IResult<NomBytes, OffsetsTopicData> {
    let (s, name) = parse_string(s)?;
    let (s, partitions) = parse_array(parse_offsets_partition)(s)?;

    Ok((
        s,
        OffsetsTopicData {
            name: bytes_to_string(&name)?,
            partitions,
        },
    ))
}

fn parse_offsets_partition(s: NomBytes) -> IResult<NomBytes, OffsetsPartitionData> {
    let (s, partition_index) = be_i32(s)?;
    let (s, time) = be_i64(s)?;
    let (s, max_offsets) = be_i32(s)?;

    Ok((
        s,
        OffsetsPartitionData {
            partition_index,
            time,
            max_offsets,
        },
    ))
}

// ============================================================================
// OffsetCommit
// ============================================================================

/// OffsetCommit request data.
#[derive(Debug, Clone)]
pub struct OffsetCommitRequestData {
    pub group_id: String,
    pub topics: Vec<OffsetCommitTopicData>,
}

#[derive(Debug, Clone)]
pub struct OffsetCommitTopicData {
    pub name: String,
    pub partitions: Vec<OffsetCommitPartitionData>,
}

#[derive(Debug, Clone)]
pub struct OffsetCommitPartitionData {
    pub partition_index: i32,
    pub committed_offset: i64,
    pub committed_metadata: Option<String>,
}

pub fn parse_offset_commit_request(
    s: NomBytes,
    _version: i16,
) -> IResult<NomBytes, OffsetCommitRequestData> {
    let (s, group_id) = parse_string(s)?;
    let (s, topics) = parse_array(parse_offset_commit_topic)(s)?;

    Ok((
        s,
        OffsetCommitRequestData {
            group_id: bytes_to_string(&group_id)?,
            topics,
        },
    ))
}

fn parse_offset_commit_topic(s: NomBytes) -> IResult<NomBytes, OffsetCommitTopicData> {
    let (s, name) = parse_string(s)?;
    let (s, partitions) = parse_array(parse_offset_commit_partition)(s)?;

    Ok((
        s,
        OffsetCommitTopicData {
            name: bytes_to_string(&name)?,
            partitions,
        },
    ))
}

fn parse_offset_commit_partition(s: NomBytes) -> IResult<NomBytes, OffsetCommitPartitionData> {
    let (s, partition_index) = be_i32(s)?;
    let (s, committed_offset) = be_i64(s)?;
    let (s, committed_metadata) = parse_nullable_string(s)?;

    Ok((
        s,
        OffsetCommitPartitionData {
            partition_index,
            committed_offset,
            committed_metadata: bytes_to_string_opt(committed_metadata)?,
        },
    ))
}

// ============================================================================
// OffsetFetch
// ============================================================================

/// OffsetFetch request data.
#[derive(Debug, Clone)]
pub struct OffsetFetchRequestData {
    pub group_id: String,
    pub topics: Vec<OffsetFetchTopicData>,
}

#[derive(Debug, Clone)]
pub struct OffsetFetchTopicData {
    pub name: String,
    pub partition_indexes: Vec<i32>,
}

pub fn parse_offset_fetch_request(
    s: NomBytes,
    _version: i16,
) -> IResult<NomBytes, OffsetFetchRequestData> {
    let (s, group_id) = parse_string(s)?;
    let (s, topics) = parse_array(parse_offset_fetch_topic)(s)?;

    Ok((
        s,
        OffsetFetchRequestData {
            group_id: bytes_to_string(&group_id)?,
            topics,
        },
    ))
}

fn parse_offset_fetch_topic(s: NomBytes) -> IResult<NomBytes, OffsetFetchTopicData> {
    let (s, name) = parse_string(s)?;
    let (s, partition_indexes) = parse_array(be_i32)(s)?;

    Ok((
        s,
        OffsetFetchTopicData {
            name: bytes_to_string(&name)?,
            partition_indexes,
        },
    ))
}
