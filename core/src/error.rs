//! Error types for the library API client.
//!
//! # Design
//! Two layers. `TransportError` means "could not talk to the server or could
//! not make sense of what came back": connect, write, read, timeout, framing
//! and parsing failures. `ApiError` is what the endpoint-level `parse_*`
//! methods return; it wraps transport failures and adds the outcomes a
//! command cares about. A 4xx/5xx answer is never a `TransportError`: it is a
//! well-formed `HttpResponse` that only becomes `NotFound` or `HttpError`
//! once an endpoint decides what status it expected.

use std::io;

use thiserror::Error;

/// Failures of a single request/response exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Name resolution or `connect` failed.
    #[error("failed to connect to {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Writing the request to the socket failed.
    #[error("failed to send request: {0}")]
    Send(#[source] io::Error),

    /// Reading the response from the socket failed.
    #[error("failed to receive response: {0}")]
    Receive(#[source] io::Error),

    /// A configured connect, read or write timeout elapsed.
    #[error("timed out while {0}")]
    Timeout(&'static str),

    /// The byte stream does not frame a complete HTTP response.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The response is framed correctly but its contents cannot be interpreted.
    #[error("could not parse response: {0}")]
    Parse(String),
}

impl TransportError {
    pub(crate) fn is_timeout(err: &io::Error) -> bool {
        matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
    }

    pub(crate) fn from_read(err: io::Error) -> Self {
        if Self::is_timeout(&err) {
            TransportError::Timeout("reading the response")
        } else {
            TransportError::Receive(err)
        }
    }

    pub(crate) fn from_write(err: io::Error) -> Self {
        if Self::is_timeout(&err) {
            TransportError::Timeout("sending the request")
        } else {
            TransportError::Send(err)
        }
    }
}

/// Errors returned by `LibraryClient` parse methods and `Session` guards.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server returned 404 for a book id.
    #[error("resource not found")]
    NotFound,

    /// The server returned a status the endpoint does not treat as success.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// A successful login response carried no `Set-Cookie` header.
    #[error("login response did not set a session cookie")]
    MissingCookie,

    #[error("user not logged in")]
    NotLoggedIn,

    #[error("user does not have library access")]
    NoLibraryAccess,
}

impl ApiError {
    /// Status code of an unexpected server answer, if this error is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
