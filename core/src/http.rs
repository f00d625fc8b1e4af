//! HTTP/1.1 message types and the request serializer.
//!
//! # Design
//! Requests and responses are plain owned data. `RequestBuilder` is the only
//! way the crate assembles an `HttpRequest`, so header order is fixed in one
//! place: `Host`, then `Content-Type` and `Content-Length` when a body is
//! present, then `Cookie`, then `Authorization`. `Content-Length` is always
//! derived from the body bytes and can never be supplied by hand, so framing
//! cannot drift from the payload. Deterministic output lets tests pin the
//! exact bytes that go on the wire.

use std::fmt;

pub const CRLF: &str = "\r\n";
pub const HTTP_VERSION: &str = "HTTP/1.1";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by `RequestBuilder` (usually through `LibraryClient::build_*`) and
/// serialized once with [`HttpRequest::to_bytes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub host: String,
    pub path: String,
    pub query: Option<String>,
    /// Wire order is insertion order.
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Request target as it appears on the request line.
    pub fn target(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    /// First header value with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Serialize into the exact HTTP/1.1 byte sequence sent on the socket.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("{} {} {HTTP_VERSION}{CRLF}", self.method, self.target());
        for (name, value) in &self.headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str(CRLF);
        }
        head.push_str(CRLF);

        let body = self.body.as_deref().unwrap_or_default();
        let mut out = Vec::with_capacity(head.len() + body.len());
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(body);
        out
    }
}

/// Assembles an `HttpRequest` with headers in the crate's fixed order.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: HttpMethod,
    host: String,
    path: String,
    query: Option<String>,
    cookie: Option<String>,
    bearer: Option<String>,
    body: Option<(String, Vec<u8>)>,
}

impl RequestBuilder {
    pub fn new(method: HttpMethod, host: &str, path: &str) -> Self {
        Self {
            method,
            host: host.to_string(),
            path: path.to_string(),
            query: None,
            cookie: None,
            bearer: None,
            body: None,
        }
    }

    pub fn get(host: &str, path: &str) -> Self {
        Self::new(HttpMethod::Get, host, path)
    }

    pub fn post(host: &str, path: &str) -> Self {
        Self::new(HttpMethod::Post, host, path)
    }

    pub fn delete(host: &str, path: &str) -> Self {
        Self::new(HttpMethod::Delete, host, path)
    }

    /// Query string without the leading `?`.
    pub fn query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    /// Full `name=value` cookie pair to send back.
    pub fn cookie(mut self, cookie: &str) -> Self {
        self.cookie = Some(cookie.to_string());
        self
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    pub fn body(mut self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some((content_type.to_string(), body.into()));
        self
    }

    pub fn build(self) -> HttpRequest {
        let mut headers = vec![("Host".to_string(), self.host.clone())];

        let body = match self.body {
            Some((content_type, bytes)) => {
                headers.push(("Content-Type".to_string(), content_type));
                headers.push(("Content-Length".to_string(), bytes.len().to_string()));
                Some(bytes)
            }
            None => {
                if self.method == HttpMethod::Post {
                    headers.push(("Content-Length".to_string(), "0".to_string()));
                }
                None
            }
        };

        if let Some(cookie) = self.cookie {
            headers.push(("Cookie".to_string(), cookie));
        }
        if let Some(token) = self.bearer {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        HttpRequest {
            method: self.method,
            host: self.host,
            path: self.path,
            query: self.query,
            headers,
            body,
        }
    }
}

/// An HTTP response described as plain data.
///
/// Produced by [`crate::parser::parse_response`] from one raw response and
/// then handed to `LibraryClient::parse_*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Headers as received, in order.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Every value of a repeatable header such as `Set-Cookie`, in order.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `name=value` pair of the first `Set-Cookie` header, attributes
    /// such as `Path` and `HttpOnly` dropped.
    pub fn session_cookie(&self) -> Option<&str> {
        let value = self.header("Set-Cookie")?;
        let pair = value.split(';').next().unwrap_or_default().trim();
        if pair.is_empty() {
            None
        } else {
            Some(pair)
        }
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
