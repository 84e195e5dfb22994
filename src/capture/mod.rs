//! Discovery of recorded exchanges in a capture directory
//!
//! The recording proxy writes one file per message, named
//! `<prefix><id>.request`, `<prefix><id>.response` or `<prefix><id>.errors`.

mod store;

pub use store::{CapturePair, CaptureStore};

use std::path::Path;

use crate::config::LimitsConfig;
use crate::message::{CapturedRequest, CapturedResponse};
use crate::Result;

/// Extension of captured request files
pub const REQUEST_EXT: &str = "request";

/// Extension of captured response files
pub const RESPONSE_EXT: &str = "response";

/// Extension marking an exchange that failed at the transport level
pub const ERRORS_EXT: &str = "errors";

/// One recorded request/response pair
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Sequence identifier shared by both files
    pub id: String,
    /// Recorded request
    pub request: CapturedRequest,
    /// Recorded response
    pub response: CapturedResponse,
}

impl Exchange {
    /// Load and parse both files of a capture pair
    ///
    /// # Errors
    ///
    /// Returns error if either file cannot be read or parsed
    pub fn load(pair: &CapturePair, limits: &LimitsConfig) -> Result<Self> {
        Ok(Self {
            id: pair.id.clone(),
            request: CapturedRequest::from_file(&pair.request, limits)?,
            response: CapturedResponse::from_file(&pair.response, limits)?,
        })
    }

    /// Parse an exchange from in-memory captures
    ///
    /// # Errors
    ///
    /// Returns error if either message cannot be parsed
    pub fn from_bytes(
        id: impl Into<String>,
        request: &[u8],
        response: &[u8],
        limits: &LimitsConfig,
    ) -> Result<Self> {
        Ok(Self {
            id: id.into(),
            request: CapturedRequest::parse(request.to_vec(), limits.max_headers)?,
            response: CapturedResponse::parse(response.to_vec(), limits.max_headers)?,
        })
    }
}

/// Load every pair of a capture directory, in recording order
///
/// # Errors
///
/// Returns error on any capture integrity violation
pub fn load_exchanges(dir: &Path, prefix: &str, limits: &LimitsConfig) -> Result<Vec<Exchange>> {
    CaptureStore::new(dir, prefix)
        .pairs()?
        .iter()
        .map(|pair| Exchange::load(pair, limits))
        .collect()
}
