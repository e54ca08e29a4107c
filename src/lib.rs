//! # Mockafka
//! An in-memory, single-node Kafka broker for testing Kafka clients.
//!
//! This crate binds a real TCP port and speaks the classic (v0) Kafka wire
//! protocol, so any client library can be pointed at it without knowing it
//! is talking to a mock. State lives entirely in memory and is reachable
//! from the test through a direct setup surface: seed messages, reset
//! topics, snapshot everything as JSON.
//!
//! # Goals
//! - Exercise real client code over a real socket, not a stubbed transport
//! - Leverage best in class libraries such as [Tokio](https://tokio.rs/), [Nom](https://docs.rs/nom/latest/nom/)
//! - Deterministic, inspectable broker state for assertions
//!
//! ### Running a mock broker
//! ```rust,no_run
//! use mockafka::prelude::*;
//! use mockafka::types::Message;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let server = MockServer::spawn().await?;
//!
//!     server
//!         .add_messages("greetings", 0, vec![Message::from_value("hello")])
//!         .await;
//!
//!     // Configure a Kafka client with server.addr() as its bootstrap
//!     // broker, run the code under test, then inspect the result:
//!     println!("{}", server.dump_json().await?);
//!
//!     server.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! Requests the broker cannot parse, requests for unsupported API keys and
//! offset queries for arbitrary times all close the connection instead of
//! answering, mirroring how a misconfigured real broker looks to a client.
//!
//! ## Resources
//! - [Kafka Protocol Spec](https://kafka.apache.org/protocol.html)
//! - [Confluence Docs](https://cwiki.apache.org/confluence/display/KAFKA/A+Guide+To+The+Kafka+Protocol)

#![forbid(unsafe_code)]

mod encode;
pub mod error;
mod parser;
pub mod protocol;
pub mod server;
pub mod state;
pub mod types;

pub mod constants;
pub mod telemetry;

pub mod prelude {
    //! The types most tests need: the server, its middleware hook, and the
    //! crate's error handling.
    pub use crate::error::{Error, KafkaCode, Result};
    pub use crate::server::{Middleware, MockServer, Response};
    pub use crate::types::{BrokerInfo, Message, StateDump};

    pub use bytes;
}
