//! In-memory broker logic for the supported request kinds.
//!
//! `BrokerHandler` owns the shared broker state behind an async `RwLock`.
//! Requests that only read the logs take the read half; anything that may
//! create topics, partitions or offset entries takes the write half.
//! Exactly one request is in flight per connection, so lock hold times are
//! a single request body.

use std::sync::{Arc, OnceLock};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::constants::{OFFSET_EARLIEST, OFFSET_LATEST};
use crate::error::{Error, KafkaCode, Result};
use crate::protocol::{message_set_bytes, WireMessage};
use crate::state::{BrokerState, OffsetKey, ReadOutcome};
use crate::types::Message;

use super::request::*;
use super::response::*;
use crate::types::BrokerInfo;

/// Handles parsed requests against the in-memory broker state.
#[derive(Clone)]
pub struct BrokerHandler {
    state: Arc<RwLock<BrokerState>>,
    broker: Arc<OnceLock<BrokerInfo>>,
}

impl BrokerHandler {
    pub fn new(state: Arc<RwLock<BrokerState>>, broker: Arc<OnceLock<BrokerInfo>>) -> Self {
        Self { state, broker }
    }

    fn broker_info(&self) -> Result<&BrokerInfo> {
        self.broker
            .get()
            .ok_or_else(|| Error::MissingData("broker address not bound yet".to_string()))
    }

    /// Dispatch a parsed request to its handler and wrap the response.
    ///
    /// Returns an error when the broker deliberately answers with silence:
    /// unknown API keys and Offsets requests with an unsupported time both
    /// end the connection instead of producing a response.
    pub async fn handle(&self, request: Request) -> Result<Response> {
        let correlation_id = request.header().correlation_id;
        match request {
            Request::Produce(_, data) => {
                Response::new(correlation_id, &self.handle_produce(data).await)
            }
            Request::Fetch(_, data) => {
                Response::new(correlation_id, &self.handle_fetch(data).await?)
            }
            Request::Offsets(_, data) => {
                let body = self
                    .handle_offsets(data)
                    .await
                    .ok_or(Error::NoResponse("offsets request with unsupported time"))?;
                Response::new(correlation_id, &body)
            }
            Request::Metadata(_, data) => {
                Response::new(correlation_id, &self.handle_metadata(data).await?)
            }
            Request::OffsetCommit(_, data) => {
                Response::new(correlation_id, &self.handle_offset_commit(data).await)
            }
            Request::OffsetFetch(_, data) => {
                Response::new(correlation_id, &self.handle_offset_fetch(data).await)
            }
            Request::GroupCoordinator(_, data) => {
                Response::new(correlation_id, &self.handle_group_coordinator(data)?)
            }
            Request::Unknown(header, _) => {
                warn!(
                    api_key = i16::from(header.api_key),
                    correlation_id, "request for unsupported api key"
                );
                Err(Error::NoResponse("unsupported api key"))
            }
        }
    }

    /// Append the produced message sets, creating topics and partitions as
    /// needed. The reported offset is the offset assigned to the last message
    /// of each set.
    pub async fn handle_produce(&self, request: ProduceRequestData) -> ProduceResponseData {
        let mut state = self.state.write().await;
        let responses = request
            .topics
            .into_iter()
            .map(|topic| {
                let partitions = topic
                    .partitions
                    .into_iter()
                    .map(|p| {
                        let messages = p
                            .messages
                            .into_iter()
                            .map(|m| Message::new(m.key, m.value))
                            .collect();
                        let offset = state.logs.append(&topic.name, p.partition_index, messages);
                        ProducePartitionResponse::success(p.partition_index, offset)
                    })
                    .collect();
                ProduceTopicResponse {
                    name: topic.name,
                    partitions,
                }
            })
            .collect();
        ProduceResponseData { responses }
    }

    /// Serve stored messages from the requested offset to the log tip.
    pub async fn handle_fetch(&self, request: FetchRequestData) -> Result<FetchResponseData> {
        let state = self.state.read().await;
        let mut responses = Vec::with_capacity(request.topics.len());
        for topic in request.topics {
            let mut partitions = Vec::with_capacity(topic.partitions.len());
            for p in topic.partitions {
                let partition = match state.logs.read_from(&topic.name, p.partition_index, p.fetch_offset) {
                    ReadOutcome::Unknown => {
                        // Client libraries poll their own bookkeeping topics
                        // hard; stay quiet about those.
                        if !topic.name.starts_with("__") {
                            debug!(
                                topic = %topic.name,
                                partition = p.partition_index,
                                "fetch from unknown topic or partition"
                            );
                        }
                        FetchPartitionResponse::error(
                            p.partition_index,
                            KafkaCode::UnknownTopicOrPartition,
                        )
                    }
                    ReadOutcome::OutOfRange { tip } => FetchPartitionResponse {
                        partition_index: p.partition_index,
                        error_code: KafkaCode::OffsetOutOfRange,
                        high_watermark: tip,
                        records: None,
                    },
                    ReadOutcome::Messages { messages, tip } => {
                        let wire: Vec<WireMessage> = messages
                            .iter()
                            .map(|m| WireMessage::new(m.offset, m.key.clone(), m.value.clone()))
                            .collect();
                        FetchPartitionResponse::success(
                            p.partition_index,
                            tip,
                            Some(message_set_bytes(&wire)?),
                        )
                    }
                };
                partitions.push(partition);
            }
            responses.push(FetchTopicResponse {
                name: topic.name,
                partitions,
            });
        }
        Ok(FetchResponseData { responses })
    }

    /// Resolve offset queries for the latest (-1) and earliest (-2) sentinel
    /// times. Any other time yields no response at all, which callers turn
    /// into a closed connection.
    pub async fn handle_offsets(&self, request: OffsetsRequestData) -> Option<OffsetsResponseData> {
        let state = self.state.read().await;
        let mut topics = Vec::with_capacity(request.topics.len());
        for topic in request.topics {
            let mut partitions = Vec::with_capacity(topic.partitions.len());
            for p in topic.partitions {
                let tip = state.logs.tip(&topic.name, p.partition_index);
                let mut offsets = match p.time {
                    OFFSET_LATEST => vec![tip, 0],
                    OFFSET_EARLIEST => vec![0, 0],
                    time => {
                        warn!(
                            topic = %topic.name,
                            partition = p.partition_index,
                            time,
                            "offsets request with unsupported time"
                        );
                        return None;
                    }
                };
                offsets.truncate(p.max_offsets.max(0) as usize);
                partitions.push(OffsetsPartitionResponse::success(p.partition_index, offsets));
            }
            topics.push(OffsetsTopicResponse {
                name: topic.name,
                partitions,
            });
        }
        Some(OffsetsResponseData { topics })
    }

    /// Describe the cluster. Asking for a topic that does not exist creates
    /// it with a single partition, which is how most client libraries expect
    /// auto-creation to behave.
    pub async fn handle_metadata(
        &self,
        request: MetadataRequestData,
    ) -> Result<MetadataResponseData> {
        let broker = self.broker_info()?.clone();
        let mut state = self.state.write().await;

        let names: Vec<String> = match request.topics {
            Some(names) if !names.is_empty() => {
                for name in &names {
                    if !state.logs.contains_topic(name) {
                        debug!(topic = %name, "creating topic on metadata request");
                        state.logs.ensure_partition(name, 0);
                    }
                }
                names
            }
            _ => {
                let mut all: Vec<String> = state.logs.topic_names().cloned().collect();
                all.sort();
                all
            }
        };

        let topics = names
            .into_iter()
            .map(|name| {
                let partitions = state
                    .logs
                    .partitions(&name)
                    .map(|partitions| {
                        partitions
                            .keys()
                            .map(|&id| PartitionMetadata::led_by(id, broker.node_id))
                            .collect()
                    })
                    .unwrap_or_default();
                TopicMetadata {
                    error_code: KafkaCode::None,
                    name,
                    partitions,
                }
            })
            .collect();

        Ok(MetadataResponseData {
            brokers: vec![BrokerData::from(&broker)],
            topics,
        })
    }

    /// Record committed offsets. Only the offset entries are created; the
    /// logs are left alone.
    pub async fn handle_offset_commit(
        &self,
        request: OffsetCommitRequestData,
    ) -> OffsetCommitResponseData {
        let mut state = self.state.write().await;
        let topics = request
            .topics
            .into_iter()
            .map(|topic| {
                let partitions = topic
                    .partitions
                    .into_iter()
                    .map(|p| {
                        state.offsets.commit(
                            OffsetKey::new(&request.group_id, &topic.name, p.partition_index),
                            p.committed_offset,
                            p.committed_metadata.unwrap_or_default(),
                        );
                        OffsetCommitPartitionResponse::success(p.partition_index)
                    })
                    .collect();
                OffsetCommitTopicResponse {
                    name: topic.name,
                    partitions,
                }
            })
            .collect();
        OffsetCommitResponseData { topics }
    }

    /// Report committed offsets for a group. Partitions the group never
    /// committed to come back as offset 0 with empty metadata, and the
    /// lookup itself creates the offset entry. The logs are left alone.
    pub async fn handle_offset_fetch(
        &self,
        request: OffsetFetchRequestData,
    ) -> OffsetFetchResponseData {
        let mut state = self.state.write().await;
        let topics = request
            .topics
            .into_iter()
            .map(|topic| {
                let partitions = topic
                    .partition_indexes
                    .into_iter()
                    .map(|index| {
                        let entry = state
                            .offsets
                            .get_or_create(OffsetKey::new(&request.group_id, &topic.name, index));
                        OffsetFetchPartitionResponse::new(
                            index,
                            entry.offset,
                            Some(entry.metadata.clone()),
                        )
                    })
                    .collect();
                OffsetFetchTopicResponse {
                    name: topic.name,
                    partitions,
                }
            })
            .collect();
        OffsetFetchResponseData { topics }
    }

    /// Every group is coordinated by the only broker there is. Reads the
    /// bound address directly, without touching broker state.
    pub fn handle_group_coordinator(
        &self,
        request: GroupCoordinatorRequestData,
    ) -> Result<GroupCoordinatorResponseData> {
        debug!(group = %request.group_id, "resolving group coordinator");
        Ok(GroupCoordinatorResponseData::from(self.broker_info()?))
    }
}
