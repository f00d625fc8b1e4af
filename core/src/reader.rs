//! Reads exactly one HTTP response off a byte stream.
//!
//! The reader buffers until the header section is complete, then uses
//! `Content-Length` to know how many body bytes follow. Without a length the
//! peer closing the stream ends the message. Anything short of a complete
//! message is reported as malformed instead of being returned truncated.

use std::io::{ErrorKind, Read};

use crate::error::TransportError;
use crate::parser::{find_subsequence, parse_status_line, HEADER_TERMINATOR};

const READ_CHUNK: usize = 4096;

/// Read from `reader` until one full response has arrived and return its raw
/// bytes (header section and body).
pub fn read_response<R: Read>(reader: &mut R) -> Result<Vec<u8>, TransportError> {
    let mut buf: Vec<u8> = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];
    let mut header_end: Option<usize> = None;
    let mut expected_total: Option<usize> = None;

    loop {
        if let Some(total) = expected_total {
            if buf.len() >= total {
                if buf.len() > total {
                    tracing::warn!(extra = buf.len() - total, "discarding bytes past the declared body length");
                    buf.truncate(total);
                }
                return Ok(buf);
            }
        }

        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(TransportError::from_read(e)),
        };
        buf.extend_from_slice(&chunk[..n]);
        tracing::trace!(read = n, buffered = buf.len(), "read response bytes");

        if header_end.is_none() {
            if let Some(pos) = find_subsequence(&buf, HEADER_TERMINATOR) {
                let end = pos + HEADER_TERMINATOR.len();
                header_end = Some(end);
                expected_total = body_length(&buf[..pos])?.map(|len| end + len);
                tracing::debug!(header_len = end, total = ?expected_total, "response header section complete");
            }
        }
    }

    match (header_end, expected_total) {
        (None, _) => Err(TransportError::MalformedResponse(format!(
            "connection closed after {} bytes without a complete header section",
            buf.len()
        ))),
        (Some(_), Some(total)) if buf.len() < total => Err(TransportError::MalformedResponse(format!(
            "connection closed after {} of {total} bytes",
            buf.len()
        ))),
        _ => Ok(buf),
    }
}

/// Body length implied by a header section (without the trailing blank
/// line). `None` means "read until the peer closes".
fn body_length(head: &[u8]) -> Result<Option<usize>, TransportError> {
    let head = String::from_utf8_lossy(head);
    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap_or_default();

    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            let len = value.trim().parse::<usize>().map_err(|_| {
                TransportError::MalformedResponse(format!("invalid Content-Length: {:?}", value.trim()))
            })?;
            return Ok(Some(len));
        }
    }

    // These statuses never carry a body, so a keep-alive server will not
    // close the connection after them.
    match parse_status_line(status_line) {
        Ok(status) if (100..200).contains(&status) || status == 204 || status == 304 => Ok(Some(0)),
        _ => Ok(None),
    }
}
