//! In-memory broker state: message logs and committed consumer offsets.
//!
//! All mutation goes through named methods here; the request handlers never
//! touch the underlying maps. The whole [`BrokerState`] sits behind a single
//! `RwLock` owned by the server.

use std::collections::{BTreeMap, HashMap};

use crate::types::{BrokerInfo, Message, MessageDump, StateDump};

/// Identity of a committed offset: consumer group + topic + partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OffsetKey {
    pub group: String,
    pub topic: String,
    pub partition: i32,
}

impl OffsetKey {
    pub fn new(group: impl Into<String>, topic: impl Into<String>, partition: i32) -> Self {
        OffsetKey {
            group: group.into(),
            topic: topic.into(),
            partition,
        }
    }
}

/// A committed offset with its client-supplied metadata.
///
/// The default entry (offset 0, empty metadata) is what a group observes
/// for a partition it never committed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetEntry {
    pub offset: i64,
    pub metadata: String,
}

/// Result of reading a partition log from a given offset.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome<'a> {
    /// The topic or partition does not exist.
    Unknown,
    /// The requested offset lies beyond the log tip.
    OutOfRange { tip: i64 },
    /// The log suffix starting at the requested offset, plus the tip.
    Messages { messages: &'a [Message], tip: i64 },
}

/// Append-only message logs, one per topic partition.
///
/// A message's offset is its index in the partition log, so offsets are
/// contiguous from 0. Partition ids are also contiguous: creating partition
/// `k` creates the empty partitions below it as well.
#[derive(Debug, Default)]
pub struct LogStore {
    topics: HashMap<String, BTreeMap<i32, Vec<Message>>>,
}

impl LogStore {
    /// Get or create a partition log, filling in any missing lower ids.
    pub fn get_or_create(&mut self, topic: &str, partition: i32) -> &mut Vec<Message> {
        let partitions = self.topics.entry(topic.to_string()).or_default();
        for id in 0..partition {
            partitions.entry(id).or_default();
        }
        partitions.entry(partition).or_default()
    }

    /// Create a topic partition (and the ones below it) without appending.
    pub fn ensure_partition(&mut self, topic: &str, partition: i32) {
        self.get_or_create(topic, partition);
    }

    pub fn contains_topic(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }

    /// Append messages, stamping each with its topic, partition and assigned
    /// offset. Returns the offset of the last message in the log afterwards,
    /// which is -1 for an empty partition.
    pub fn append(&mut self, topic: &str, partition: i32, messages: Vec<Message>) -> i64 {
        let log = self.get_or_create(topic, partition);
        for mut message in messages {
            message.topic = topic.to_string();
            message.partition = partition;
            message.offset = log.len() as i64;
            log.push(message);
        }
        log.len() as i64 - 1
    }

    /// Read the log suffix starting at `from`. Never creates anything.
    pub fn read_from(&self, topic: &str, partition: i32, from: i64) -> ReadOutcome<'_> {
        let Some(log) = self.topics.get(topic).and_then(|p| p.get(&partition)) else {
            return ReadOutcome::Unknown;
        };
        let tip = log.len() as i64;
        if from < 0 || from > tip {
            return ReadOutcome::OutOfRange { tip };
        }
        ReadOutcome::Messages {
            messages: &log[from as usize..],
            tip,
        }
    }

    /// Number of messages in a partition; 0 for anything that doesn't exist.
    pub fn tip(&self, topic: &str, partition: i32) -> i64 {
        self.topics
            .get(topic)
            .and_then(|p| p.get(&partition))
            .map_or(0, |log| log.len() as i64)
    }

    /// All topic names, unordered.
    pub fn topic_names(&self) -> impl Iterator<Item = &String> {
        self.topics.keys()
    }

    /// The partitions of a topic, ordered by id.
    pub fn partitions(&self, topic: &str) -> Option<&BTreeMap<i32, Vec<Message>>> {
        self.topics.get(topic)
    }

    /// Drop every topic.
    pub fn reset(&mut self) {
        self.topics.clear();
    }

    /// Empty every partition log of a topic. The partitions themselves
    /// survive, so subsequent metadata still lists them.
    pub fn reset_topic(&mut self, topic: &str) {
        if let Some(partitions) = self.topics.get_mut(topic) {
            for log in partitions.values_mut() {
                log.clear();
            }
        }
    }
}

/// Committed consumer-group offsets in a single flat map.
#[derive(Debug, Default)]
pub struct OffsetStore {
    entries: HashMap<OffsetKey, OffsetEntry>,
}

impl OffsetStore {
    /// Look up an entry, creating the default (offset 0, no metadata) if the
    /// group never committed to this partition.
    pub fn get_or_create(&mut self, key: OffsetKey) -> &OffsetEntry {
        self.entries.entry(key).or_default()
    }

    /// Overwrite an entry; last write wins.
    pub fn commit(&mut self, key: OffsetKey, offset: i64, metadata: String) {
        self.entries.insert(key, OffsetEntry { offset, metadata });
    }

    /// Drop every entry.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Drop every entry committed against a topic, across all groups.
    pub fn remove_topic(&mut self, topic: &str) {
        self.entries.retain(|key, _| key.topic != topic);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// The whole mutable state of the broker.
#[derive(Debug, Default)]
pub struct BrokerState {
    pub logs: LogStore,
    pub offsets: OffsetStore,
}

impl BrokerState {
    /// Seed a partition with messages, as a test-setup shortcut that
    /// bypasses the wire protocol.
    pub fn add_messages(&mut self, topic: &str, partition: i32, messages: Vec<Message>) -> i64 {
        self.logs.append(topic, partition, messages)
    }

    /// Drop all topics and all committed offsets.
    pub fn reset(&mut self) {
        self.logs.reset();
        self.offsets.reset();
    }

    /// Empty a topic's logs and forget every offset committed against it.
    pub fn reset_topic(&mut self, topic: &str) {
        self.logs.reset_topic(topic);
        self.offsets.remove_topic(topic);
    }

    /// Render the state for debugging.
    pub fn snapshot(&self, brokers: Vec<BrokerInfo>) -> StateDump {
        let mut topics = BTreeMap::new();
        for name in self.logs.topic_names() {
            let mut partitions = BTreeMap::new();
            if let Some(logs) = self.logs.partitions(name) {
                for (id, log) in logs {
                    let messages = log
                        .iter()
                        .map(|m| MessageDump {
                            offset: m.offset,
                            key: m.key.as_ref().map(|k| String::from_utf8_lossy(k).into_owned()),
                            value: m
                                .value
                                .as_ref()
                                .map(|v| String::from_utf8_lossy(v).into_owned()),
                        })
                        .collect();
                    partitions.insert(id.to_string(), messages);
                }
            }
            topics.insert(name.clone(), partitions);
        }
        StateDump { brokers, topics }
    }
}
