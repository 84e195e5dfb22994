//! Start line and header block parsing shared by requests and responses

use std::borrow::Cow;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue};
use httparse::Status;

use crate::{RecorderError, Result};

/// A captured message split into its three parts
#[derive(Debug)]
pub(super) struct RawMessage<'a> {
    /// Whitespace separated start line tokens (2 or 3 of them)
    pub tokens: Vec<&'a str>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Split a captured message into start line tokens, headers and body
///
/// `raw` is kept alive by the returned tokens so the body can be sliced
/// out of it without copying.
pub(super) fn parse_message<'a>(
    raw: &'a Bytes,
    kind: &'static str,
    max_headers: usize,
) -> Result<RawMessage<'a>> {
    let (line, rest_start) = match raw.iter().position(|&b| b == b'\n') {
        Some(pos) => (&raw[..pos], pos + 1),
        None => (&raw[..], raw.len()),
    };

    let malformed = || RecorderError::MalformedStartLine {
        kind,
        line: String::from_utf8_lossy(line).trim_end().to_string(),
    };

    let line = std::str::from_utf8(line).map_err(|_| malformed())?;
    let tokens = split_start_line(line);
    if tokens.len() < 2 {
        return Err(malformed());
    }

    let (headers, header_len) = parse_header_block(&raw[rest_start..], max_headers)?;
    let body = raw.slice(rest_start + header_len..);

    Ok(RawMessage {
        tokens,
        headers,
        body,
    })
}

/// Split a start line on whitespace into at most three tokens
///
/// The third token is the trimmed remainder of the line, so a status
/// message like `Moved Permanently` stays whole.
pub(super) fn split_start_line(line: &str) -> Vec<&str> {
    let mut tokens = Vec::with_capacity(3);
    let mut rest = line.trim_start();

    while !rest.is_empty() {
        if tokens.len() == 2 {
            tokens.push(rest.trim_end());
            break;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        tokens.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }

    tokens
}

/// Parse header lines up to and including the blank line
///
/// Returns the headers and the number of bytes consumed. A block that runs
/// to the end of input without a blank line consumes everything.
fn parse_header_block(src: &[u8], max_headers: usize) -> Result<(HeaderMap, usize)> {
    if let Some((unfolded, consumed)) = unfold_header_block(src) {
        let mut slots = vec![httparse::EMPTY_HEADER; max_headers];
        return match httparse::parse_headers(&unfolded, &mut slots) {
            Ok(Status::Complete((_, parsed))) => Ok((to_header_map(parsed)?, consumed)),
            Ok(Status::Partial) => Err(RecorderError::MalformedHeader(
                "unterminated header block".to_string(),
            )),
            Err(e) => Err(header_error(e, max_headers)),
        };
    }

    let mut slots = vec![httparse::EMPTY_HEADER; max_headers];
    match httparse::parse_headers(src, &mut slots) {
        Ok(Status::Complete((consumed, parsed))) => Ok((to_header_map(parsed)?, consumed)),
        Ok(Status::Partial) => {
            let mut terminated = src.to_vec();
            if !terminated.ends_with(b"\n") {
                terminated.extend_from_slice(b"\r\n");
            }
            terminated.extend_from_slice(b"\r\n");

            let mut slots = vec![httparse::EMPTY_HEADER; max_headers];
            match httparse::parse_headers(&terminated, &mut slots) {
                Ok(Status::Complete((_, parsed))) => Ok((to_header_map(parsed)?, src.len())),
                Ok(Status::Partial) => Err(RecorderError::MalformedHeader(
                    "unterminated header block".to_string(),
                )),
                Err(e) => Err(header_error(e, max_headers)),
            }
        }
        Err(e) => Err(header_error(e, max_headers)),
    }
}

/// Join RFC 822 continuation lines onto the header line they continue
///
/// Returns `None` when no line is folded. Otherwise returns the unfolded
/// block, terminated by a blank line, and the number of source bytes it
/// covers including the source's own blank line if present.
fn unfold_header_block(src: &[u8]) -> Option<(Vec<u8>, usize)> {
    let mut unfolded = Vec::with_capacity(src.len() + 4);
    let mut folded = false;
    let mut pos = 0;

    while pos < src.len() {
        let end = src[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(src.len(), |i| pos + i + 1);
        let line = trim_line_end(&src[pos..end]);
        let first = pos == 0;
        pos = end;

        if line.is_empty() {
            break;
        }
        if !first && matches!(line[0], b' ' | b'\t') {
            let indent = line.iter().take_while(|&&b| b == b' ' || b == b'\t').count();
            unfolded.push(b' ');
            unfolded.extend_from_slice(&line[indent..]);
            folded = true;
        } else {
            if !first {
                unfolded.extend_from_slice(b"\r\n");
            }
            unfolded.extend_from_slice(line);
        }
    }

    if !folded {
        return None;
    }
    unfolded.extend_from_slice(b"\r\n\r\n");
    Some((unfolded, pos))
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn to_header_map(parsed: &[httparse::Header<'_>]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(parsed.len());
    for header in parsed {
        let name = HeaderName::from_bytes(header.name.as_bytes())
            .map_err(|e| RecorderError::MalformedHeader(format!("{}: {e}", header.name)))?;
        let value = HeaderValue::from_bytes(header.value)
            .map_err(|e| RecorderError::MalformedHeader(format!("{}: {e}", header.name)))?;
        // Last occurrence wins
        headers.insert(name, value);
    }
    Ok(headers)
}

fn header_error(error: httparse::Error, max_headers: usize) -> RecorderError {
    match error {
        httparse::Error::TooManyHeaders => RecorderError::TooManyHeaders { limit: max_headers },
        other => RecorderError::MalformedHeader(other.to_string()),
    }
}

/// Look up a header value, decoding it lossily
pub(super) fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
}
