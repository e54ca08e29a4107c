//! Produce response encoding.

use bytes::BufMut;

use crate::encode::{encode_array, ToByte};
use crate::error::{KafkaCode, Result};

/// Produce response data.
#[derive(Debug, Clone)]
pub struct ProduceResponseData {
    pub responses: Vec<ProduceTopicResponse>,
}

#[derive(Debug, Clone)]
pub struct ProduceTopicResponse {
    pub name: String,
    pub partitions: Vec<ProducePartitionResponse>,
}

#[derive(Debug, Clone, Default)]
pub struct ProducePartitionResponse {
    pub partition_index: i32,
    pub error_code: KafkaCode,
    pub offset: i64,
}

impl ProducePartitionResponse {
    /// Create an error response for a partition.
    ///
    /// Sets the offset to -1 (invalid).
    pub fn error(partition_index: i32, error_code: KafkaCode) -> Self {
        Self {
            partition_index,
            error_code,
            offset: -1,
        }
    }

    /// Create a success response for a partition.
    pub fn success(partition_index: i32, offset: i64) -> Self {
        Self {
            partition_index,
            error_code: KafkaCode::None,
            offset,
        }
    }
}

impl ToByte for ProduceResponseData {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        encode_array(buffer, &self.responses)
    }
}

impl ToByte for ProduceTopicResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.name.encode(buffer)?;
        encode_array(buffer, &self.partitions)?;
        Ok(())
    }
}

impl ToByte for ProducePartitionResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.partition_index.encode(buffer)?;
        (self.error_code as i16).encode(buffer)?;
        self.offset.encode(buffer)?;
        Ok(())
    }
}
