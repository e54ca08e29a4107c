//! Fetch response encoding.

use bytes::{BufMut, Bytes};

use crate::encode::{encode_array, ToByte};
use crate::error::{KafkaCode, Result};

/// Fetch response data.
#[derive(Debug, Clone)]
pub struct FetchResponseData {
    pub responses: Vec<FetchTopicResponse>,
}

#[derive(Debug, Clone)]
pub struct FetchTopicResponse {
    pub name: String,
    pub partitions: Vec<FetchPartitionResponse>,
}

/// Per-partition fetch result.
///
/// `records` holds a pre-encoded message set; `None` encodes as an empty set,
/// which clients treat the same way.
#[derive(Debug, Clone, Default)]
pub struct FetchPartitionResponse {
    pub partition_index: i32,
    pub error_code: KafkaCode,
    pub high_watermark: i64,
    pub records: Option<Bytes>,
}

impl FetchPartitionResponse {
    /// Create an error response for a partition.
    pub fn error(partition_index: i32, error_code: KafkaCode) -> Self {
        Self {
            partition_index,
            error_code,
            high_watermark: -1,
            records: None,
        }
    }

    /// Create a success response carrying an encoded message set.
    pub fn success(partition_index: i32, high_watermark: i64, records: Option<Bytes>) -> Self {
        Self {
            partition_index,
            error_code: KafkaCode::None,
            high_watermark,
            records,
        }
    }
}

impl ToByte for FetchResponseData {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        encode_array(buffer, &self.responses)
    }
}

impl ToByte for FetchTopicResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.name.encode(buffer)?;
        encode_array(buffer, &self.partitions)?;
        Ok(())
    }
}

impl ToByte for FetchPartitionResponse {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.partition_index.encode(buffer)?;
        (self.error_code as i16).encode(buffer)?;
        self.high_watermark.encode(buffer)?;
        match &self.records {
            Some(records) => {
                (records.len() as i32).encode(buffer)?;
                buffer.put_slice(records);
            }
            None => 0i32.encode(buffer)?,
        }
        Ok(())
    }
}
