//! Shared plumbing for integration tests: a tiny Kafka client that speaks
//! just enough of the classic (v0) protocol to poke the broker over TCP.

#![allow(dead_code)]

use std::net::SocketAddr;

use bytes::{Buf, BufMut, Bytes};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use mockafka::protocol::{message_set_bytes, WireMessage};

pub const API_PRODUCE: i16 = 0;
pub const API_FETCH: i16 = 1;
pub const API_OFFSETS: i16 = 2;
pub const API_METADATA: i16 = 3;
pub const API_OFFSET_COMMIT: i16 = 8;
pub const API_OFFSET_FETCH: i16 = 9;
pub const API_GROUP_COORDINATOR: i16 = 10;

/// A raw-socket Kafka client for driving the broker in tests.
pub struct TestClient {
    stream: TcpStream,
}

impl TestClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect to broker");
        Self { stream }
    }

    /// Write one size-prefixed frame.
    pub async fn send_frame(&mut self, body: &[u8]) {
        let mut frame = Vec::with_capacity(4 + body.len());
        frame.put_i32(body.len() as i32);
        frame.extend_from_slice(body);
        self.stream.write_all(&frame).await.expect("write frame");
    }

    /// Read one size-prefixed frame. Errors signal a closed connection.
    pub async fn read_frame(&mut self) -> std::io::Result<Bytes> {
        let mut size_buf = [0u8; 4];
        self.stream.read_exact(&mut size_buf).await?;
        let size = i32::from_be_bytes(size_buf);
        assert!(size >= 0, "negative frame size {size}");

        let mut data = vec![0u8; size as usize];
        self.stream.read_exact(&mut data).await?;
        Ok(Bytes::from(data))
    }

    /// Send a request and read its response, panicking if the broker
    /// hangs up instead.
    pub async fn roundtrip(&mut self, body: &[u8]) -> Bytes {
        self.send_frame(body).await;
        self.read_frame().await.expect("read response")
    }

    /// Send a request and assert the broker closes without answering.
    pub async fn expect_closed(&mut self, body: &[u8]) {
        self.send_frame(body).await;
        assert!(
            self.read_frame().await.is_err(),
            "expected connection close, got a response"
        );
    }
}

// ---------------------------------------------------------------------------
// Request encoding
// ---------------------------------------------------------------------------

fn put_string(buf: &mut Vec<u8>, s: &str) {
    buf.put_i16(s.len() as i16);
    buf.extend_from_slice(s.as_bytes());
}

fn put_nullable_string(buf: &mut Vec<u8>, s: Option<&str>) {
    match s {
        Some(s) => put_string(buf, s),
        None => buf.put_i16(-1),
    }
}

/// Classic request header: api key, version 0, correlation id, client id.
pub fn request_header(api_key: i16, correlation_id: i32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.put_i16(api_key);
    buf.put_i16(0);
    buf.put_i32(correlation_id);
    put_string(&mut buf, "tester");
    buf
}

pub fn produce_request(
    correlation_id: i32,
    topic: &str,
    partition: i32,
    values: &[&str],
) -> Vec<u8> {
    let messages: Vec<WireMessage> = values
        .iter()
        .map(|v| WireMessage::new(0, None, Some(Bytes::from(v.to_string()))))
        .collect();
    let set = message_set_bytes(&messages).expect("encode message set");

    let mut buf = request_header(API_PRODUCE, correlation_id);
    buf.put_i16(1); // required_acks
    buf.put_i32(1000); // timeout_ms
    buf.put_i32(1); // one topic
    put_string(&mut buf, topic);
    buf.put_i32(1); // one partition
    buf.put_i32(partition);
    buf.put_i32(set.len() as i32);
    buf.extend_from_slice(&set);
    buf
}

pub fn fetch_request(correlation_id: i32, topic: &str, partition: i32, offset: i64) -> Vec<u8> {
    let mut buf = request_header(API_FETCH, correlation_id);
    buf.put_i32(-1); // replica_id
    buf.put_i32(100); // max_wait_ms
    buf.put_i32(1); // min_bytes
    buf.put_i32(1);
    put_string(&mut buf, topic);
    buf.put_i32(1);
    buf.put_i32(partition);
    buf.put_i64(offset);
    buf.put_i32(1 << 20); // partition_max_bytes
    buf
}

pub fn offsets_request(
    correlation_id: i32,
    topic: &str,
    partition: i32,
    time: i64,
    max_offsets: i32,
) -> Vec<u8> {
    let mut buf = request_header(API_OFFSETS, correlation_id);
    buf.put_i32(-1); // replica_id
    buf.put_i32(1);
    put_string(&mut buf, topic);
    buf.put_i32(1);
    buf.put_i32(partition);
    buf.put_i64(time);
    buf.put_i32(max_offsets);
    buf
}

pub fn metadata_request(correlation_id: i32, topics: &[&str]) -> Vec<u8> {
    let mut buf = request_header(API_METADATA, correlation_id);
    buf.put_i32(topics.len() as i32);
    for topic in topics {
        put_string(&mut buf, topic);
    }
    buf
}

pub fn offset_commit_request(
    correlation_id: i32,
    group: &str,
    topic: &str,
    partition: i32,
    offset: i64,
    metadata: Option<&str>,
) -> Vec<u8> {
    let mut buf = request_header(API_OFFSET_COMMIT, correlation_id);
    put_string(&mut buf, group);
    buf.put_i32(1);
    put_string(&mut buf, topic);
    buf.put_i32(1);
    buf.put_i32(partition);
    buf.put_i64(offset);
    put_nullable_string(&mut buf, metadata);
    buf
}

pub fn offset_fetch_request(
    correlation_id: i32,
    group: &str,
    topic: &str,
    partitions: &[i32],
) -> Vec<u8> {
    let mut buf = request_header(API_OFFSET_FETCH, correlation_id);
    put_string(&mut buf, group);
    buf.put_i32(1);
    put_string(&mut buf, topic);
    buf.put_i32(partitions.len() as i32);
    for partition in partitions {
        buf.put_i32(*partition);
    }
    buf
}

pub fn group_coordinator_request(correlation_id: i32, group: &str) -> Vec<u8> {
    let mut buf = request_header(API_GROUP_COORDINATOR, correlation_id);
    put_string(&mut buf, group);
    buf
}

// ---------------------------------------------------------------------------
// Response decoding
// ---------------------------------------------------------------------------

pub fn get_string(buf: &mut Bytes) -> String {
    let len = buf.get_i16();
    assert!(len >= 0, "unexpected null string");
    let bytes = buf.split_to(len as usize);
    String::from_utf8(bytes.to_vec()).expect("utf8 string")
}

pub fn get_nullable_string(buf: &mut Bytes) -> Option<String> {
    let len = buf.get_i16();
    if len < 0 {
        return None;
    }
    let bytes = buf.split_to(len as usize);
    Some(String::from_utf8(bytes.to_vec()).expect("utf8 string"))
}

/// Pop the correlation id off the front of a response frame.
pub fn read_correlation_id(buf: &mut Bytes) -> i32 {
    buf.get_i32()
}

#[derive(Debug)]
pub struct ProducePartition {
    pub partition: i32,
    pub error_code: i16,
    pub offset: i64,
}

/// Decode a single-topic produce response.
pub fn decode_produce_response(mut buf: Bytes, correlation_id: i32) -> ProducePartition {
    assert_eq!(read_correlation_id(&mut buf), correlation_id);
    assert_eq!(buf.get_i32(), 1, "topic count");
    let _topic = get_string(&mut buf);
    assert_eq!(buf.get_i32(), 1, "partition count");
    ProducePartition {
        partition: buf.get_i32(),
        error_code: buf.get_i16(),
        offset: buf.get_i64(),
    }
}

#[derive(Debug)]
pub struct FetchPartition {
    pub partition: i32,
    pub error_code: i16,
    pub high_watermark: i64,
    pub records: Bytes,
}

/// Decode a single-topic fetch response.
pub fn decode_fetch_response(mut buf: Bytes, correlation_id: i32) -> FetchPartition {
    assert_eq!(read_correlation_id(&mut buf), correlation_id);
    assert_eq!(buf.get_i32(), 1, "topic count");
    let _topic = get_string(&mut buf);
    assert_eq!(buf.get_i32(), 1, "partition count");
    let partition = buf.get_i32();
    let error_code = buf.get_i16();
    let high_watermark = buf.get_i64();
    let set_size = buf.get_i32();
    assert!(set_size >= 0, "negative message set size");
    let records = buf.split_to(set_size as usize);
    FetchPartition {
        partition,
        error_code,
        high_watermark,
        records,
    }
}

#[derive(Debug)]
pub struct OffsetsPartition {
    pub partition: i32,
    pub error_code: i16,
    pub offsets: Vec<i64>,
}

/// Decode a single-topic offsets response.
pub fn decode_offsets_response(mut buf: Bytes, correlation_id: i32) -> OffsetsPartition {
    assert_eq!(read_correlation_id(&mut buf), correlation_id);
    assert_eq!(buf.get_i32(), 1, "topic count");
    let _topic = get_string(&mut buf);
    assert_eq!(buf.get_i32(), 1, "partition count");
    let partition = buf.get_i32();
    let error_code = buf.get_i16();
    let count = buf.get_i32();
    let offsets = (0..count).map(|_| buf.get_i64()).collect();
    OffsetsPartition {
        partition,
        error_code,
        offsets,
    }
}

#[derive(Debug)]
pub struct MetadataBroker {
    pub node_id: i32,
    pub host: String,
    pub port: i32,
}

#[derive(Debug)]
pub struct MetadataTopic {
    pub error_code: i16,
    pub name: String,
    pub partitions: Vec<MetadataPartition>,
}

#[derive(Debug)]
pub struct MetadataPartition {
    pub error_code: i16,
    pub partition: i32,
    pub leader: i32,
    pub replicas: Vec<i32>,
    pub isr: Vec<i32>,
}

/// Decode a metadata response.
pub fn decode_metadata_response(
    mut buf: Bytes,
    correlation_id: i32,
) -> (Vec<MetadataBroker>, Vec<MetadataTopic>) {
    assert_eq!(read_correlation_id(&mut buf), correlation_id);

    let broker_count = buf.get_i32();
    let brokers = (0..broker_count)
        .map(|_| MetadataBroker {
            node_id: buf.get_i32(),
            host: get_string(&mut buf),
            port: buf.get_i32(),
        })
        .collect();

    let topic_count = buf.get_i32();
    let topics = (0..topic_count)
        .map(|_| {
            let error_code = buf.get_i16();
            let name = get_string(&mut buf);
            let partition_count = buf.get_i32();
            let partitions = (0..partition_count)
                .map(|_| {
                    let error_code = buf.get_i16();
                    let partition = buf.get_i32();
                    let leader = buf.get_i32();
                    let replica_count = buf.get_i32();
                    let replicas = (0..replica_count).map(|_| buf.get_i32()).collect();
                    let isr_count = buf.get_i32();
                    let isr = (0..isr_count).map(|_| buf.get_i32()).collect();
                    MetadataPartition {
                        error_code,
                        partition,
                        leader,
                        replicas,
                        isr,
                    }
                })
                .collect();
            MetadataTopic {
                error_code,
                name,
                partitions,
            }
        })
        .collect();

    (brokers, topics)
}

/// Decode a single-topic, single-partition offset commit response.
pub fn decode_offset_commit_response(mut buf: Bytes, correlation_id: i32) -> (i32, i16) {
    assert_eq!(read_correlation_id(&mut buf), correlation_id);
    assert_eq!(buf.get_i32(), 1, "topic count");
    let _topic = get_string(&mut buf);
    assert_eq!(buf.get_i32(), 1, "partition count");
    (buf.get_i32(), buf.get_i16())
}

#[derive(Debug)]
pub struct OffsetFetchPartition {
    pub partition: i32,
    pub offset: i64,
    pub metadata: Option<String>,
    pub error_code: i16,
}

/// Decode a single-topic offset fetch response.
pub fn decode_offset_fetch_response(
    mut buf: Bytes,
    correlation_id: i32,
) -> Vec<OffsetFetchPartition> {
    assert_eq!(read_correlation_id(&mut buf), correlation_id);
    assert_eq!(buf.get_i32(), 1, "topic count");
    let _topic = get_string(&mut buf);
    let partition_count = buf.get_i32();
    (0..partition_count)
        .map(|_| OffsetFetchPartition {
            partition: buf.get_i32(),
            offset: buf.get_i64(),
            metadata: get_nullable_string(&mut buf),
            error_code: buf.get_i16(),
        })
        .collect()
}

#[derive(Debug)]
pub struct Coordinator {
    pub error_code: i16,
    pub node_id: i32,
    pub host: String,
    pub port: i32,
}

/// Decode a group coordinator response.
pub fn decode_coordinator_response(mut buf: Bytes, correlation_id: i32) -> Coordinator {
    assert_eq!(read_correlation_id(&mut buf), correlation_id);
    Coordinator {
        error_code: buf.get_i16(),
        node_id: buf.get_i32(),
        host: get_string(&mut buf),
        port: buf.get_i32(),
    }
}
