//! Metadata response encoding.

use bytes::BufMut;

use crate::encode::{encode_array, ToByte};
use crate::error::{KafkaCode, Result};
use crate::types::BrokerInfo;

/// Metadata response data.
#[derive(Debug, Clone)]
pub struct MetadataResponseData {
    pub brokers: Vec<BrokerData>,
    pub topics: Vec<TopicMetadata>,
}

#[derive(Debug, Clone)]
pub struct BrokerData {
    pub node_id: i32,
    pub host: String,
    pub port: i32,
}

#[derive(Debug, Clone)]
pub struct TopicMetadata {
    pub error_code: KafkaCode,
    pub name: String,
    pub partitions: Vec<PartitionMetadata>,
}

#[derive(Debug, Clone)]
pub struct PartitionMetadata {
    pub error_code: KafkaCode,
    pub partition_index: i32,
    pub leader_id: i32,
    pub replica_nodes: Vec<i32>,
    pub isr_nodes: Vec<i32>,
}

impl From<&BrokerInfo> for BrokerData {
    fn from(info: &BrokerInfo) -> Self {
        Self {
            node_id: info.node_id,
            host: info.host.clone(),
            port: info.port,
        }
    }
}

impl PartitionMetadata {
    /// Partition metadata for a single-node cluster where the given node
    /// leads and replicates everything.
    pub fn led_by(partition_index: i32, node_id: i32) -> Self {
        Self {
            error_code: KafkaCode::None,
            partition_index,
            leader_id: node_id,
            replica_nodes: vec![node_id],
            isr_nodes: vec![node_id],
        }
    }
}

impl ToByte for MetadataResponseData {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        encode_array(buffer, &self.brokers)?;
        encode_array(buffer, &self.topics)?;
        Ok(())
    }
}

impl ToByte for BrokerData {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        self.node_id.encode(buffer)?;
        self.host.encode(buffer)?;
        self.port.encode(buffer)?;
        Ok(())
    }
}

impl ToByte for TopicMetadata {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        (self.error_code as i16).encode(buffer)?;
        self.name.encode(buffer)?;
        encode_array(buffer, &self.partitions)?;
        Ok(())
    }
}

impl ToByte for PartitionMetadata {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        (self.error_code as i16).encode(buffer)?;
        self.partition_index.encode(buffer)?;
        self.leader_id.encode(buffer)?;
        encode_array(buffer, &self.replica_nodes)?;
        encode_array(buffer, &self.isr_nodes)?;
        Ok(())
    }
}
