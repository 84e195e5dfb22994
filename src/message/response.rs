//! Captured HTTP response

use std::borrow::Cow;
use std::path::Path;

use bytes::Bytes;
use http::HeaderMap;

use super::parse::{header_value, parse_message};
use crate::config::LimitsConfig;
use crate::Result;

/// A response as recorded by the capturing proxy
#[derive(Debug, Clone)]
pub struct CapturedResponse {
    version: String,
    status_code: String,
    status_message: String,
    headers: HeaderMap,
    body: Bytes,
}

impl CapturedResponse {
    /// Parse a raw captured response
    ///
    /// # Errors
    ///
    /// Returns error if the status line has fewer than two tokens or the
    /// header block is malformed
    pub fn parse(raw: impl Into<Bytes>, max_headers: usize) -> Result<Self> {
        let raw = raw.into();
        let message = parse_message(&raw, "response", max_headers)?;

        Ok(Self {
            version: message.tokens[0].to_string(),
            status_code: message.tokens[1].to_string(),
            status_message: message.tokens.get(2).copied().unwrap_or_default().to_string(),
            headers: message.headers,
            body: message.body,
        })
    }

    /// Read and parse a response capture file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: &Path, limits: &LimitsConfig) -> Result<Self> {
        let raw = super::read_capture(path, limits)?;
        Self::parse(raw, limits.max_headers).map_err(|e| e.in_capture(path))
    }

    /// Protocol version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Status code exactly as recorded, e.g. `"302"`
    pub fn status_code(&self) -> &str {
        &self.status_code
    }

    /// Reason phrase, empty if the status line had none
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// All response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Look up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        header_value(&self.headers, name)
    }

    /// `Content-Type` header, empty when absent
    pub fn content_type(&self) -> Cow<'_, str> {
        self.header("content-type").unwrap_or_default()
    }

    /// Raw response body
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}
