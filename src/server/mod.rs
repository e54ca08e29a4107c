//! A single-node in-memory broker speaking the classic Kafka wire protocol.
//!
//! The server exists to exercise Kafka client libraries: it accepts real TCP
//! connections, answers the seven classic (v0) request kinds against state
//! held entirely in memory, and exposes a test-setup surface for seeding
//! and inspecting that state.
//!
//! # Example
//! ```rust,no_run
//! use mockafka::server::MockServer;
//! use mockafka::types::Message;
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = MockServer::new();
//!     server.start("127.0.0.1:0").await.unwrap();
//!
//!     server
//!         .add_messages("greetings", 0, vec![Message::from_value("hello")])
//!         .await;
//!
//!     // Point any Kafka client at server.addr(), then:
//!     server.shutdown();
//! }
//! ```

mod connection;
mod handler;
pub mod middleware;
pub mod request;
pub mod response;

pub use handler::BrokerHandler;
pub use middleware::Middleware;
pub use response::Response;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, OnceLock};

use tokio::net::TcpListener;
use tokio::sync::{broadcast, RwLock};

use crate::constants::NODE_ID;
use crate::error::{Error, Result};
use crate::state::BrokerState;
use crate::types::{BrokerInfo, Message, StateDump};

use connection::ClientConnection;

/// Where the server is in its one-way Created -> Started -> Stopped life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Started(SocketAddr),
    Stopped,
}

/// A mock Kafka broker bound to a real TCP port.
///
/// The server moves through three states exactly once: created, started,
/// stopped. Stopping only ends the accept loop; connections that are mid
/// conversation keep their sockets until the client hangs up.
pub struct MockServer {
    state: Arc<RwLock<BrokerState>>,
    broker: Arc<OnceLock<BrokerInfo>>,
    middlewares: Arc<Vec<Box<dyn Middleware>>>,
    lifecycle: Mutex<Lifecycle>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockServer {
    /// Create a server with no middlewares. Nothing is bound until `start`.
    pub fn new() -> Self {
        Self::with_middlewares(vec![])
    }

    /// Create a server whose middlewares get first refusal on every request.
    pub fn with_middlewares(middlewares: Vec<Box<dyn Middleware>>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            state: Arc::new(RwLock::new(BrokerState::default())),
            broker: Arc::new(OnceLock::new()),
            middlewares: Arc::new(middlewares),
            lifecycle: Mutex::new(Lifecycle::Created),
            shutdown_tx,
        }
    }

    /// Bind the listener and start accepting connections in the background.
    ///
    /// Use `"127.0.0.1:0"` for an ephemeral port; the real address is
    /// available from `addr` afterwards. Starting twice, or after a
    /// shutdown, is an error.
    pub async fn start(&self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::IoError(e.kind()))?;
        let local_addr = listener.local_addr().map_err(|e| Error::IoError(e.kind()))?;

        {
            let mut lifecycle = self.lifecycle.lock().expect("lifecycle lock poisoned");
            match *lifecycle {
                Lifecycle::Created => *lifecycle = Lifecycle::Started(local_addr),
                Lifecycle::Started(_) => {
                    return Err(Error::Config("server already started".to_string()));
                }
                Lifecycle::Stopped => {
                    return Err(Error::Config(
                        "server already stopped and cannot be restarted".to_string(),
                    ));
                }
            }
        }

        let info = BrokerInfo {
            node_id: NODE_ID,
            host: local_addr.ip().to_string(),
            port: local_addr.port() as i32,
        };
        self.broker
            .set(info)
            .map_err(|_| Error::Config("broker info already set".to_string()))?;

        tracing::info!(addr = %local_addr, node_id = NODE_ID, "mock broker listening");

        let handler = Arc::new(BrokerHandler::new(self.state.clone(), self.broker.clone()));
        let middlewares = self.middlewares.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        tracing::info!("mock broker no longer accepting connections");
                        return;
                    }
                    accept_result = listener.accept() => {
                        let (stream, addr) = match accept_result {
                            Ok(accepted) => accepted,
                            Err(e) => {
                                tracing::error!(error = ?e, "accept failed, stopping listener");
                                return;
                            }
                        };
                        tracing::debug!(client = %addr, "accepted connection");

                        let handler = handler.clone();
                        let middlewares = middlewares.clone();
                        tokio::spawn(async move {
                            let mut conn = ClientConnection::new(stream, addr);
                            if let Err(e) =
                                conn.handle_requests(handler, middlewares, NODE_ID).await
                            {
                                tracing::debug!(client = %addr, error = ?e, "connection closed");
                            }
                        });
                    }
                }
            }
        });

        Ok(())
    }

    /// Start on an ephemeral localhost port.
    pub async fn spawn() -> Result<Self> {
        let server = Self::new();
        server.start("127.0.0.1:0").await?;
        Ok(server)
    }

    /// The bound address.
    ///
    /// # Panics
    /// Panics if the server was never started or has been shut down;
    /// there is no address to hand out in either state.
    pub fn addr(&self) -> SocketAddr {
        match *self.lifecycle.lock().expect("lifecycle lock poisoned") {
            Lifecycle::Started(addr) => addr,
            Lifecycle::Created => panic!("server not started"),
            Lifecycle::Stopped => panic!("server already stopped"),
        }
    }

    /// True while the accept loop is running.
    pub fn is_running(&self) -> bool {
        matches!(
            *self.lifecycle.lock().expect("lifecycle lock poisoned"),
            Lifecycle::Started(_)
        )
    }

    /// Stop accepting connections. Safe to call repeatedly; live
    /// connections are left alone.
    pub fn shutdown(&self) {
        let mut lifecycle = self.lifecycle.lock().expect("lifecycle lock poisoned");
        if matches!(*lifecycle, Lifecycle::Stopped) {
            return;
        }
        *lifecycle = Lifecycle::Stopped;
        let _ = self.shutdown_tx.send(());
        tracing::info!("mock broker shut down");
    }

    // ------------------------------------------------------------------
    // Test-setup surface
    // ------------------------------------------------------------------

    /// Seed messages directly into a partition, creating the topic and any
    /// lower-numbered partitions. Returns the offset of the last message
    /// in the partition afterwards.
    pub async fn add_messages(
        &self,
        topic: &str,
        partition: i32,
        messages: Vec<Message>,
    ) -> i64 {
        self.state
            .write()
            .await
            .add_messages(topic, partition, messages)
    }

    /// Drop all topics and committed offsets.
    pub async fn reset(&self) {
        self.state.write().await.reset();
    }

    /// Empty one topic's logs and drop its committed offsets across all
    /// groups. The topic and its partitions stay listed in metadata.
    pub async fn reset_topic(&self, topic: &str) {
        self.state.write().await.reset_topic(topic);
    }

    /// A point-in-time copy of everything the broker knows.
    pub async fn snapshot(&self) -> StateDump {
        let brokers = self.broker.get().cloned().into_iter().collect();
        self.state.read().await.snapshot(brokers)
    }

    /// The snapshot as pretty-printed JSON, for debugging failing tests.
    pub async fn dump_json(&self) -> Result<String> {
        let dump = self.snapshot().await;
        Ok(serde_json::to_string_pretty(&dump)?)
    }
}
