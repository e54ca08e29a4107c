//! Client connection handling.
//!
//! Each connection serves one request at a time: read a frame, run it
//! through the middleware chain, dispatch to the broker, write the
//! response. A clean disconnect between frames ends the loop quietly;
//! anything the broker refuses to answer ends it with an error, which
//! drops the socket.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Buf, Bytes};
use tokio::net::TcpStream;

use crate::constants::MAX_MESSAGE_SIZE;
use crate::error::{Error, Result};

use super::handler::BrokerHandler;
use super::middleware::{run_chain, Middleware};
use super::request::{ApiKey, Request};

/// A client connection to the broker.
pub(crate) struct ClientConnection {
    stream: TcpStream,
    addr: SocketAddr,
}

impl ClientConnection {
    pub fn new(stream: TcpStream, addr: SocketAddr) -> Self {
        Self { stream, addr }
    }

    /// Handle requests from this connection until closed.
    pub async fn handle_requests(
        &mut self,
        handler: Arc<BrokerHandler>,
        middlewares: Arc<Vec<Box<dyn Middleware>>>,
        node_id: i32,
    ) -> Result<()> {
        loop {
            let data = match self.read_request().await {
                Ok(data) => data,
                Err(Error::MissingData(_)) => {
                    tracing::debug!(client = %self.addr, "client disconnected");
                    return Ok(());
                }
                Err(e) => {
                    tracing::error!(client = %self.addr, error = ?e, "error reading request");
                    return Err(e);
                }
            };

            let response = self
                .dispatch_request(&handler, &middlewares, node_id, data)
                .await?;
            self.write_response(&response).await?;
        }
    }

    /// Read a single size-prefixed request frame.
    async fn read_request(&mut self) -> Result<Bytes> {
        let mut size_buf = [0u8; 4];
        let mut bytes_read = 0;

        loop {
            self.stream
                .readable()
                .await
                .map_err(|e| Error::IoError(e.kind()))?;

            match self.stream.try_read(&mut size_buf[bytes_read..]) {
                Ok(0) => {
                    return Err(Error::MissingData("connection closed".to_owned()));
                }
                Ok(n) => {
                    bytes_read += n;
                    if bytes_read == 4 {
                        break;
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    continue;
                }
                Err(e) => {
                    return Err(Error::IoError(e.kind()));
                }
            }
        }

        let size = (&size_buf[..]).get_i32();
        if size < 0 {
            return Err(Error::MissingData(format!(
                "invalid negative message size: {size}"
            )));
        }
        let size = size as usize;
        if size > MAX_MESSAGE_SIZE {
            return Err(Error::MissingData(format!(
                "message size {size} exceeds maximum allowed size {MAX_MESSAGE_SIZE}"
            )));
        }

        tracing::trace!("reading {} bytes from {}", size, self.addr);

        let mut data = vec![0u8; size];
        let mut bytes_read = 0;

        while bytes_read < size {
            self.stream
                .readable()
                .await
                .map_err(|e| Error::IoError(e.kind()))?;

            match self.stream.try_read(&mut data[bytes_read..]) {
                Ok(0) => {
                    return Err(Error::MissingData(
                        "connection closed mid-message".to_owned(),
                    ));
                }
                Ok(n) => {
                    bytes_read += n;
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    continue;
                }
                Err(e) => {
                    return Err(Error::IoError(e.kind()));
                }
            }
        }

        Ok(Bytes::from(data))
    }

    /// Offer the raw frame to the middlewares, parse and dispatch what they
    /// decline, and encode whatever answered.
    ///
    /// Middlewares run before any body decoding so they can answer shapes
    /// the broker itself does not parse. Only the api key is peeked off the
    /// frame to tell them what kind of request it is.
    async fn dispatch_request(
        &self,
        handler: &Arc<BrokerHandler>,
        middlewares: &Arc<Vec<Box<dyn Middleware>>>,
        node_id: i32,
        data: Bytes,
    ) -> Result<Vec<u8>> {
        if data.len() < 2 {
            return Err(Error::ParsingError(data));
        }
        let api_key = ApiKey::from((&data[..2]).get_i16());

        let response = match run_chain(middlewares, node_id, api_key, &data) {
            Some(response) => response,
            None => {
                let request = match Request::parse(data.clone()) {
                    Ok(request) => request,
                    Err(e) => {
                        tracing::error!(
                            client = %self.addr,
                            error = ?e,
                            data_len = data.len(),
                            first_bytes = ?&data[..data.len().min(32)],
                            "failed to parse request"
                        );
                        return Err(e);
                    }
                };

                let header = request.header();
                tracing::debug!(
                    client = %self.addr,
                    api_key = header.api_key.as_str(),
                    correlation_id = header.correlation_id,
                    "handling request"
                );

                handler.handle(request).await?
            }
        };

        response.encode_with_size().map_err(|e| {
            tracing::error!(client = %self.addr, error = ?e, "failed to serialize response");
            e
        })
    }

    /// Write a response to the connection.
    async fn write_response(&mut self, response: &[u8]) -> Result<()> {
        let mut bytes_written = 0;

        while bytes_written < response.len() {
            self.stream
                .writable()
                .await
                .map_err(|e| Error::IoError(e.kind()))?;

            match self.stream.try_write(&response[bytes_written..]) {
                Ok(n) => {
                    bytes_written += n;
                    tracing::trace!("wrote {} bytes to {}", n, self.addr);
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    continue;
                }
                Err(e) => {
                    return Err(Error::IoError(e.kind()));
                }
            }
        }

        Ok(())
    }
}
