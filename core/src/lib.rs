//! Client core for the library-management HTTP API.
//!
//! # Overview
//! Speaks HTTP/1.1 directly over a TCP socket: requests are serialized by
//! hand, responses are framed by `Content-Length` and parsed by header name.
//! On top of that transport sits a stateless endpoint client that turns
//! register/login/library/book operations into requests and interprets the
//! answers.
//!
//! # Design
//! - `LibraryClient` is stateless and I/O free: `build_*` produces an
//!   `HttpRequest`, `parse_*` consumes an `HttpResponse`.
//! - `Transport` performs one round-trip per call on a fresh connection.
//! - `Session` holds the cookie and token explicitly on the caller's side.
//! - Transport and parse failures (`TransportError`) are kept apart from the
//!   server saying no (`ApiError::NotFound`, `ApiError::HttpError`).

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod parser;
pub mod reader;
pub mod session;
pub mod types;

pub use client::LibraryClient;
pub use config::ClientConfig;
pub use connection::{Connection, Transport};
pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestBuilder};
pub use parser::parse_response;
pub use reader::read_response;
pub use session::Session;
pub use types::{AccessGrant, Book, Credentials};
