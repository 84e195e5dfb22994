//! `multipart/form-data` decoding

use bytes::Bytes;
use httparse::Status;
use tracing::debug;

use super::FormField;
use crate::{RecorderError, Result};

const MAX_PART_HEADERS: usize = 16;

/// Split a multipart body into fields, in body order
///
/// A missing closing delimiter is tolerated when the body simply ends after
/// the last part.
pub(super) fn parse(body: &Bytes, boundary: &str) -> Result<Vec<FormField>> {
    let delimiter = format!("--{boundary}").into_bytes();
    let mut fields = Vec::new();

    let mut pos = find(body, &delimiter, 0)
        .ok_or_else(|| RecorderError::MalformedBody("missing opening boundary".to_string()))?
        + delimiter.len();

    loop {
        let rest = &body[pos..];
        if rest.starts_with(b"--") || rest.iter().all(u8::is_ascii_whitespace) {
            break;
        }

        let part_start = find(body, b"\n", pos)
            .ok_or_else(|| RecorderError::MalformedBody("truncated boundary line".to_string()))?
            + 1;
        let next = find_next_delimiter(body, &delimiter, part_start).ok_or_else(|| {
            RecorderError::MalformedBody(format!("unterminated part at offset {part_start}"))
        })?;

        let mut part_end = next;
        if body[..part_end].ends_with(b"\n") {
            part_end -= 1;
        }
        if body[..part_end].ends_with(b"\r") {
            part_end -= 1;
        }

        if let Some(field) = parse_part(body.slice(part_start..part_end.max(part_start)))? {
            fields.push(field);
        }
        pos = next + delimiter.len();
    }

    Ok(fields)
}

/// Start of the next delimiter that begins a line, at or after `from`
fn find_next_delimiter(body: &[u8], delimiter: &[u8], from: usize) -> Option<usize> {
    let mut search = from;
    loop {
        let at = find(body, delimiter, search)?;
        if at == from || body[at - 1] == b'\n' {
            return Some(at);
        }
        search = at + 1;
    }
}

fn parse_part(part: Bytes) -> Result<Option<FormField>> {
    let mut slots = [httparse::EMPTY_HEADER; MAX_PART_HEADERS];
    let (offset, headers) = match httparse::parse_headers(&part, &mut slots) {
        Ok(Status::Complete(parsed)) => parsed,
        Ok(Status::Partial) => {
            return Err(RecorderError::MalformedBody(
                "part headers not terminated".to_string(),
            ))
        }
        Err(e) => return Err(RecorderError::MalformedBody(format!("part header: {e}"))),
    };

    let disposition = headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case("content-disposition"))
        .map(|h| String::from_utf8_lossy(h.value).into_owned())
        .unwrap_or_default();
    let params = disposition_params(&disposition);
    let lookup = |key: &str| {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    let Some(name) = lookup("name") else {
        debug!("Skipping multipart part without a name: {:?}", disposition);
        return Ok(None);
    };

    Ok(Some(FormField {
        name,
        filename: lookup("filename"),
        value: part.slice(offset..),
    }))
}

/// Parameters of a `Content-Disposition` value, keys lowercased
fn disposition_params(value: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let Some(start) = value.find(';') else {
        return params;
    };
    let mut rest = &value[start + 1..];

    loop {
        rest = rest.trim_start();
        let Some(eq) = rest.find('=') else {
            break;
        };
        let key = rest[..eq].trim().to_ascii_lowercase();
        rest = rest[eq + 1..].trim_start();

        let param_value = if let Some(quoted) = rest.strip_prefix('"') {
            let (unquoted, consumed) = unquote(quoted);
            rest = &quoted[consumed..];
            rest = match rest.find(';') {
                Some(i) => &rest[i + 1..],
                None => "",
            };
            unquoted
        } else {
            let end = rest.find(';').unwrap_or(rest.len());
            let token = rest[..end].trim().to_string();
            rest = rest.get(end + 1..).unwrap_or("");
            token
        };

        params.push((key, param_value));
    }

    params
}

/// Read a quoted string body up to the closing quote
///
/// Only `\\` and `\"` are treated as escapes so unescaped Windows paths
/// survive intact. Returns the value and the bytes consumed.
fn unquote(quoted: &str) -> (String, usize) {
    let mut out = String::new();
    let mut chars = quoted.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return (out, i + 1),
            '\\' => match chars.peek() {
                Some(&(_, next @ ('\\' | '"'))) => {
                    out.push(next);
                    chars.next();
                }
                _ => out.push('\\'),
            },
            _ => out.push(c),
        }
    }

    (out, quoted.len())
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| from + i)
}
