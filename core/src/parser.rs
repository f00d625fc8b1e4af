//! Raw response text to `HttpResponse`.
//!
//! Headers are found by name and the body by the first blank line, never by
//! line position, so servers may add, drop or reorder headers freely.

use crate::error::TransportError;
use crate::http::HttpResponse;

pub(crate) const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    StatusLine,
    Headers,
    Body,
    Done,
}

/// Parse one complete raw response, as returned by
/// [`crate::reader::read_response`].
pub fn parse_response(raw: &[u8]) -> Result<HttpResponse, TransportError> {
    let boundary = find_subsequence(raw, HEADER_TERMINATOR).ok_or_else(|| {
        TransportError::MalformedResponse("no blank line after the header section".to_string())
    })?;
    let head = std::str::from_utf8(&raw[..boundary])
        .map_err(|_| TransportError::Parse("header section is not valid UTF-8".to_string()))?;
    let body_bytes = &raw[boundary + HEADER_TERMINATOR.len()..];

    let mut lines = head.split("\r\n");
    let mut state = ParseState::StatusLine;
    let mut status = 0;
    let mut headers: Vec<(String, String)> = Vec::new();
    let mut body = String::new();

    while state != ParseState::Done {
        match state {
            ParseState::StatusLine => {
                status = parse_status_line(lines.next().unwrap_or_default())?;
                state = ParseState::Headers;
            }
            ParseState::Headers => match lines.next() {
                Some(line) if line.starts_with(|c: char| c == ' ' || c == '\t') => {
                    // Obsolete line folding continues the previous value.
                    let (_, value) = headers.last_mut().ok_or_else(|| {
                        TransportError::Parse("continuation line before any header".to_string())
                    })?;
                    value.push(' ');
                    value.push_str(line.trim());
                }
                Some(line) => headers.push(parse_header_line(line)?),
                None => state = ParseState::Body,
            },
            ParseState::Body => {
                body = String::from_utf8(body_bytes.to_vec())
                    .map_err(|_| TransportError::Parse("body is not valid UTF-8".to_string()))?;
                state = ParseState::Done;
            }
            ParseState::Done => {}
        }
    }

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

/// `HTTP/1.1 200 OK` -> 200. The reason phrase is optional.
pub(crate) fn parse_status_line(line: &str) -> Result<u16, TransportError> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some(version) if version.starts_with("HTTP/") => {}
        _ => {
            return Err(TransportError::Parse(format!(
                "status line does not start with an HTTP version: {line:?}"
            )))
        }
    }
    let code = parts
        .next()
        .ok_or_else(|| TransportError::Parse(format!("status line has no status code: {line:?}")))?;
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TransportError::Parse(format!("status code is not three digits: {code:?}")));
    }
    code.parse()
        .map_err(|_| TransportError::Parse(format!("status code is not numeric: {code:?}")))
}

fn parse_header_line(line: &str) -> Result<(String, String), TransportError> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| TransportError::Parse(format!("header line without a colon: {line:?}")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(TransportError::Parse(format!("header line without a name: {line:?}")));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

pub(crate) fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_without_body() {
        let response = parse_response(b"HTTP/1.1 404 Not Found\r\nHost: x\r\n\r\n").unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.header("Host"), Some("x"));
        assert!(response.body.is_empty());
    }

    #[test]
    fn extracts_cookie_by_name_wherever_it_sits() {
        let raw = "HTTP/1.1 200 OK\r\n\
                   X-Powered-By: Express\r\n\
                   Access-Control-Allow-Origin: *\r\n\
                   Set-Cookie: connect.sid=s%3Aabc123.xyz; Path=/; HttpOnly\r\n\
                   Date: Sat, 18 Oct 2026 10:00:00 GMT\r\n\
                   Connection: keep-alive\r\n\
                   \r\n";
        let response = parse_response(raw.as_bytes()).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.headers.len(), 5);
        assert_eq!(response.session_cookie(), Some("connect.sid=s%3Aabc123.xyz"));
    }

    #[test]
    fn body_is_kept_verbatim_including_newlines() {
        let body = "{\n    \"token\": \"abc\"\n}\r\n";
        let raw = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        let response = parse_response(raw.as_bytes()).unwrap();
        assert_eq!(response.body, body);
        assert_eq!(response.header("content-type"), Some("application/json"));
    }

    #[test]
    fn status_line_without_headers() {
        let response = parse_response(b"HTTP/1.0 204 No Content\r\n\r\n").unwrap();
        assert_eq!(response.status, 204);
        assert!(response.headers.is_empty());
    }

    #[test]
    fn status_without_reason_phrase() {
        assert_eq!(parse_status_line("HTTP/1.1 500").unwrap(), 500);
    }

    #[test]
    fn header_value_may_contain_colons() {
        let response =
            parse_response(b"HTTP/1.1 200 OK\r\nDate: Sat, 18 Oct 2026 10:00:00 GMT\r\n\r\n")
                .unwrap();
        assert_eq!(response.header("date"), Some("Sat, 18 Oct 2026 10:00:00 GMT"));
    }

    #[test]
    fn folded_header_is_joined() {
        let response =
            parse_response(b"HTTP/1.1 200 OK\r\nX-Long: first\r\n  second\r\nA: b\r\n\r\n")
                .unwrap();
        assert_eq!(response.header("X-Long"), Some("first second"));
        assert_eq!(response.header("A"), Some("b"));
    }

    #[test]
    fn non_numeric_status_is_a_parse_error() {
        let err = parse_response(b"HTTP/1.1 OK 200\r\n\r\n").unwrap_err();
        assert!(matches!(err, TransportError::Parse(_)));
    }

    #[test]
    fn missing_status_code_is_a_parse_error() {
        let err = parse_response(b"HTTP/1.1\r\n\r\n").unwrap_err();
        assert!(matches!(err, TransportError::Parse(_)));
    }

    #[test]
    fn garbage_first_line_is_a_parse_error() {
        let err = parse_response(b"hello world\r\n\r\n").unwrap_err();
        assert!(matches!(err, TransportError::Parse(_)));
    }

    #[test]
    fn header_without_colon_is_a_parse_error() {
        let err = parse_response(b"HTTP/1.1 200 OK\r\nbroken header\r\n\r\n").unwrap_err();
        assert!(matches!(err, TransportError::Parse(_)));
    }

    #[test]
    fn missing_delimiter_is_malformed() {
        let err = parse_response(b"HTTP/1.1 200 OK\r\nHost: x\r\n").unwrap_err();
        assert!(matches!(err, TransportError::MalformedResponse(_)));
    }
}
