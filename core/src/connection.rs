//! Blocking TCP transport: one fresh connection per request.
//!
//! # Design
//! `Connection` owns the socket, so releasing it is tied to ownership:
//! `close` consumes the value and an unclosed `Connection` is released on
//! drop. `Transport` strings the stages together (open, send, receive,
//! close, parse), each finishing before the next starts. Nothing is retried:
//! the first failure is returned to the caller.

use std::io::Write;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::parser::parse_response;
use crate::reader::read_response;

/// An open TCP connection to the API server.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Connection {
    /// Resolve `host:port` and connect to the first address that accepts.
    ///
    /// With a `timeout`, every connect attempt is bounded by it and the socket
    /// gets the same read and write timeouts.
    pub fn open(host: &str, port: u16, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let addr = format!("{host}:{port}");
        let candidates = (host, port)
            .to_socket_addrs()
            .map_err(|source| TransportError::Connection {
                addr: addr.clone(),
                source,
            })?;

        let mut last_err = None;
        for candidate in candidates {
            let attempt = match timeout {
                Some(limit) => TcpStream::connect_timeout(&candidate, limit),
                None => TcpStream::connect(candidate),
            };
            match attempt {
                Ok(stream) => {
                    tracing::debug!(%candidate, "connected");
                    if timeout.is_some() {
                        stream
                            .set_read_timeout(timeout)
                            .and_then(|_| stream.set_write_timeout(timeout))
                            .map_err(|source| TransportError::Connection {
                                addr: addr.clone(),
                                source,
                            })?;
                    }
                    return Ok(Self {
                        stream,
                        peer: candidate,
                    });
                }
                Err(e) => {
                    tracing::debug!(%candidate, error = %e, "connect attempt failed");
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(e) if TransportError::is_timeout(&e) => Err(TransportError::Timeout("connecting")),
            Some(source) => Err(TransportError::Connection { addr, source }),
            None => Err(TransportError::Connection {
                addr,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "host resolved to no addresses"),
            }),
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Write the whole buffer, continuing after partial writes.
    pub fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.stream.write_all(bytes).map_err(TransportError::from_write)?;
        self.stream.flush().map_err(TransportError::from_write)?;
        tracing::debug!(peer = %self.peer, bytes = bytes.len(), "request sent");
        Ok(())
    }

    /// Read one complete response. See [`read_response`] for framing rules.
    pub fn receive_all(&mut self) -> Result<Vec<u8>, TransportError> {
        let raw = read_response(&mut self.stream)?;
        tracing::debug!(peer = %self.peer, bytes = raw.len(), "response received");
        Ok(raw)
    }

    /// Shut the socket down in both directions and release it.
    pub fn close(self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            // The peer may already have torn the connection down.
            tracing::debug!(peer = %self.peer, error = %e, "shutdown failed");
        }
    }
}

/// Executes `HttpRequest`s against the configured server.
#[derive(Debug, Clone)]
pub struct Transport {
    config: ClientConfig,
}

impl Transport {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Send `request` on a new connection and parse the reply.
    ///
    /// Any status code, 4xx and 5xx included, comes back as `Ok`.
    pub fn round_trip(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        tracing::debug!(method = %request.method, target = %request.target(), "round trip");
        let mut connection = Connection::open(&self.config.host, self.config.port, self.config.timeout)?;
        let raw = connection
            .send(&request.to_bytes())
            .and_then(|_| connection.receive_all());
        connection.close();

        let response = parse_response(&raw?)?;
        tracing::debug!(status = response.status, "response parsed");
        Ok(response)
    }
}
