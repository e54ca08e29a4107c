//! Core broker data types.

use bytes::Bytes;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A stored message.
///
/// `topic`, `partition` and `offset` are assigned by the broker when the
/// message is appended; whatever the caller put there is overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<Bytes>,
    pub value: Option<Bytes>,
}

impl Message {
    /// Create a message ready to be handed to the broker for appending.
    pub fn new(key: Option<Bytes>, value: Option<Bytes>) -> Self {
        Message {
            topic: String::new(),
            partition: 0,
            offset: 0,
            key,
            value,
        }
    }

    /// Convenience constructor for a keyless message.
    pub fn from_value(value: impl Into<Bytes>) -> Self {
        Message::new(None, Some(value.into()))
    }
}

/// The single broker node this server advertises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokerInfo {
    pub node_id: i32,
    pub host: String,
    pub port: i32,
}

impl fmt::Display for BrokerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.node_id, self.host, self.port)
    }
}

/// A message as rendered in a [`StateDump`].
///
/// Keys and values are decoded lossily as UTF-8 so the dump stays readable
/// for binary payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageDump {
    pub offset: i64,
    pub key: Option<String>,
    pub value: Option<String>,
}

/// A serializable snapshot of the whole broker state, for test debugging.
///
/// Partition ids are rendered as strings so the dump serializes to plain
/// JSON objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateDump {
    pub brokers: Vec<BrokerInfo>,
    pub topics: BTreeMap<String, BTreeMap<String, Vec<MessageDump>>>,
}
