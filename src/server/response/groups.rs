//! Group coordinator response encoding.

use bytes::BufMut;

use crate::encode::ToByte;
use crate::error::{KafkaCode, Result};
use crate::types::BrokerInfo;

/// GroupCoordinator response data.
#[derive(Debug, Clone, Default)]
pub struct GroupCoordinatorResponseData {
    pub error_code: KafkaCode,
    pub node_id: i32,
    pub host: String,
    pub port: i32,
}

impl GroupCoordinatorResponseData {
    /// Create a success response with coordinator info.
    pub fn success(node_id: i32, host: String, port: i32) -> Self {
        Self {
            error_code: KafkaCode::None,
            node_id,
            host,
            port,
        }
    }

    /// Create an error response.
    pub fn error(error_code: KafkaCode) -> Self {
        Self {
            error_code,
            node_id: -1,
            host: String::new(),
            port: 0,
        }
    }
}

impl From<&BrokerInfo> for GroupCoordinatorResponseData {
    fn from(info: &BrokerInfo) -> Self {
        Self::success(info.node_id, info.host.clone(), info.port)
    }
}

impl ToByte for GroupCoordinatorResponseData {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        (self.error_code as i16).encode(buffer)?;
        self.node_id.encode(buffer)?;
        self.host.encode(buffer)?;
        self.port.encode(buffer)?;
        Ok(())
    }
}
