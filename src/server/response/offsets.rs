//! Offset-related response encoding (Offsets, OffsetCommit, OffsetFetch).

use bytes::BufMut;

use crate::encode::{encode_array, ToByte};
use crate::error::{KafkaCode, Result};

use super::encode_nullable_string;

// ============================================================================
// Offsets (ListOffsets)
// ============================================================================

/// Offsets response data.
#[derive(Debug, Clone)]
pub struct OffsetsResponseData {
    pub topics: Vec<OffsetsTopicResponse>,
}

#[derive(Debug, Clone)]
pub struct OffsetsTopicResponse {
    pub name: String,
    pub partitions: Vec<OffsetsPartitionResponse>,
}

#[derive(Debug, Clone)]
pub struct OffsetsPartitionResponse {
    pub partition_index: i32,
    pub error_code: KafkaCode,
    pub offsets: Vec<i64>,
}

impl OffsetsPartitionResponse {
    /// Create an error response with an empty offset list.
    pub fn error(partition_index: i32, error_code: KafkaCode) -> Self {
        Self {
            partition_index,
            error_code,
            offsets: vec![],
        }
    }

    /// Create a success response carrying the resolved offsets.
    pub fn success(partition_index: i32, offsets: Vec<i64>) -> Self {
        Self {
            partition_index,
            error_code: KafkaCode::None,
            offsets,
        }
    }
}

impl ToByte for OffsetsResponseData {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        encode_array(buffer, &self.topics)
    }
}

impl ToByte for OffsetsTopicResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.name.encode(buffer)?;
        encode_array(buffer, &self.partitions)?;
        Ok(())
    }
}

impl ToByte for OffsetsPartitionResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.partition_index.encode(buffer)?;
        (self.error_code as i16).encode(buffer)?;
        encode_array(buffer, &self.offsets)?;
        Ok(())
    }
}

// ============================================================================
// OffsetCommit
// ============================================================================

/// OffsetCommit response data.
#[derive(Debug, Clone)]
pub struct OffsetCommitResponseData {
    pub topics: Vec<OffsetCommitTopicResponse>,
}

#[derive(Debug, Clone)]
pub struct OffsetCommitTopicResponse {
    pub name: String,
    pub partitions: Vec<OffsetCommitPartitionResponse>,
}

#[derive(Debug, Clone)]
pub struct OffsetCommitPartitionResponse {
    pub partition_index: i32,
    pub error_code: KafkaCode,
}

impl OffsetCommitPartitionResponse {
    pub fn new(partition_index: i32, error_code: KafkaCode) -> Self {
        Self {
            partition_index,
            error_code,
        }
    }

    pub fn success(partition_index: i32) -> Self {
        Self::new(partition_index, KafkaCode::None)
    }
}

impl ToByte for OffsetCommitResponseData {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        encode_array(buffer, &self.topics)
    }
}

impl ToByte for OffsetCommitTopicResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.name.encode(buffer)?;
        encode_array(buffer, &self.partitions)?;
        Ok(())
    }
}

impl ToByte for OffsetCommitPartitionResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.partition_index.encode(buffer)?;
        (self.error_code as i16).encode(buffer)?;
        Ok(())
    }
}

// ============================================================================
// OffsetFetch
// ============================================================================

/// OffsetFetch response data.
#[derive(Debug, Clone)]
pub struct OffsetFetchResponseData {
    pub topics: Vec<OffsetFetchTopicResponse>,
}

#[derive(Debug, Clone)]
pub struct OffsetFetchTopicResponse {
    pub name: String,
    pub partitions: Vec<OffsetFetchPartitionResponse>,
}

#[derive(Debug, Clone)]
pub struct OffsetFetchPartitionResponse {
    pub partition_index: i32,
    pub committed_offset: i64,
    pub metadata: Option<String>,
    pub error_code: KafkaCode,
}

impl OffsetFetchPartitionResponse {
    pub fn new(partition_index: i32, committed_offset: i64, metadata: Option<String>) -> Self {
        Self {
            partition_index,
            committed_offset,
            metadata,
            error_code: KafkaCode::None,
        }
    }
}

impl ToByte for OffsetFetchResponseData {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        encode_array(buffer, &self.topics)
    }
}

impl ToByte for OffsetFetchTopicResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.name.encode(buffer)?;
        encode_array(buffer, &self.partitions)?;
        Ok(())
    }
}

impl ToByte for OffsetFetchPartitionResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.partition_index.encode(buffer)?;
        self.committed_offset.encode(buffer)?;
        encode_nullable_string(self.metadata.as_deref(), buffer)?;
        (self.error_code as i16).encode(buffer)?;
        Ok(())
    }
}
