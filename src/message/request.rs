//! Captured HTTP request

use std::borrow::Cow;
use std::path::Path;

use bytes::Bytes;
use http::HeaderMap;

use super::parse::{header_value, parse_message};
use crate::config::LimitsConfig;
use crate::Result;

/// A request as recorded by the capturing proxy
///
/// Proxies see absolute-form request targets, so the URL normally carries
/// the scheme and host which are split off into [`origin`](Self::origin).
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    method: String,
    url: String,
    origin_len: usize,
    path_len: usize,
    version: String,
    headers: HeaderMap,
    body: Bytes,
}

impl CapturedRequest {
    /// Parse a raw captured request
    ///
    /// # Errors
    ///
    /// Returns error if the request line has fewer than two tokens or the
    /// header block is malformed
    pub fn parse(raw: impl Into<Bytes>, max_headers: usize) -> Result<Self> {
        let raw = raw.into();
        let message = parse_message(&raw, "request", max_headers)?;

        let method = message.tokens[0].to_string();
        let url = message.tokens[1].to_string();
        let version = message.tokens.get(2).copied().unwrap_or_default().to_string();
        let origin_len = origin_len(&url);
        let path_len = origin_len + path_len(&url[origin_len..]);

        Ok(Self {
            method,
            url,
            origin_len,
            path_len,
            version,
            headers: message.headers,
            body: message.body,
        })
    }

    /// Read and parse a request capture file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: &Path, limits: &LimitsConfig) -> Result<Self> {
        let raw = super::read_capture(path, limits)?;
        Self::parse(raw, limits.max_headers).map_err(|e| e.in_capture(path))
    }

    /// HTTP method as recorded
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Full request URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Scheme and authority, e.g. `http://example.com:8080`
    ///
    /// Empty when the URL carries no scheme.
    pub fn origin(&self) -> &str {
        &self.url[..self.origin_len]
    }

    /// URL with the origin removed, query and fragment included
    pub fn relative_url(&self) -> &str {
        &self.url[self.origin_len..]
    }

    /// Path component of the URL, without query or fragment
    pub fn path(&self) -> &str {
        &self.url[self.origin_len..self.path_len]
    }

    /// Protocol version, empty if the request line omitted it
    pub fn version(&self) -> &str {
        &self.version
    }

    /// All request headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Look up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        header_value(&self.headers, name)
    }

    /// Raw request body
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Length of the `scheme://authority` prefix of a URL
fn origin_len(url: &str) -> usize {
    let Some(sep) = url.find("://") else {
        return 0;
    };

    let scheme = &url[..sep];
    let valid_scheme = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid_scheme {
        return 0;
    }

    let authority_start = sep + 3;
    url[authority_start..]
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .map_or(url.len(), |end| authority_start + end)
}

/// Length of the path part of an origin-relative URL
fn path_len(relative: &str) -> usize {
    relative.find(|c: char| c == '?' || c == '#').unwrap_or(relative.len())
}
