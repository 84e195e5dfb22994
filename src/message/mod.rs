//! Parsing of raw captured HTTP messages
//!
//! A capture file holds one HTTP message exactly as it crossed the proxy:
//! a start line, an RFC 822 style header block, a blank line, and the body.

mod parse;
mod request;
mod response;

pub use request::CapturedRequest;
pub use response::CapturedResponse;

use std::fs;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::{RecorderError, Result};

/// Read a capture file, enforcing the configured size limit
///
/// # Errors
///
/// Returns error if the file cannot be read or exceeds the limit
pub fn read_capture(path: &Path, limits: &LimitsConfig) -> Result<Vec<u8>> {
    let size = fs::metadata(path)?.len();
    if size > limits.max_capture_size {
        return Err(RecorderError::DataTooLarge {
            size,
            limit: limits.max_capture_size,
        }
        .in_capture(path));
    }

    Ok(fs::read(path)?)
}
