//! Error types for Tcpload

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for Tcpload operations
pub type Result<T> = std::result::Result<T, RecorderError>;

/// Errors that can occur while converting a capture
#[derive(Debug, Error)]
pub enum RecorderError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Capture file name does not follow the `<prefix><id>.<ext>` convention
    #[error("Bad extension {extension:?} for capture file: {file}")]
    UnexpectedExtension {
        /// Offending file name
        file: String,
        /// Extension found after the identifier
        extension: String,
    },

    /// First line of a captured message could not be split into tokens
    #[error("Malformed {kind} line: {line:?}")]
    MalformedStartLine {
        /// "request" or "response"
        kind: &'static str,
        /// The offending line, lossily decoded
        line: String,
    },

    /// Header block could not be parsed
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// Header block exceeded the configured limit
    #[error("Too many headers: more than {limit}")]
    TooManyHeaders {
        /// Configured maximum
        limit: usize,
    },

    /// A header required to decode the body is absent
    #[error("Missing {header} header for {url}")]
    MissingHeader {
        /// Header name
        header: &'static str,
        /// Request URL
        url: String,
    },

    /// Form body could not be decoded
    #[error("Malformed form body: {0}")]
    MalformedBody(String),

    /// Capture file too large
    #[error("Data too large: {size} bytes exceeds limit of {limit} bytes")]
    DataTooLarge {
        /// Actual size
        size: u64,
        /// Size limit
        limit: u64,
    },

    /// A capture file failed to parse
    #[error("Invalid capture file {}: {source}", path.display())]
    InvalidCapture {
        /// Capture file path
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: Box<RecorderError>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid test name
    #[error("Invalid test name: {0}")]
    InvalidTestName(String),
}

impl RecorderError {
    /// Attach the capture file path to a parse error
    #[must_use]
    pub fn in_capture(self, path: impl Into<PathBuf>) -> Self {
        Self::InvalidCapture {
            path: path.into(),
            source: Box::new(self),
        }
    }
}
