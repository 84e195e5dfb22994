//! Capture directory scanning

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use super::{ERRORS_EXT, REQUEST_EXT, RESPONSE_EXT};
use crate::{RecorderError, Result};

/// Paths of the two files recording one exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturePair {
    /// Sequence identifier
    pub id: String,
    /// Request capture file
    pub request: PathBuf,
    /// Response capture file
    pub response: PathBuf,
}

#[derive(Debug, Default)]
struct Slot {
    request: Option<PathBuf>,
    response: Option<PathBuf>,
    errored: bool,
}

/// Capture directory following the `<prefix><id>.<ext>` convention
#[derive(Debug, Clone)]
pub struct CaptureStore {
    dir: PathBuf,
    prefix: String,
}

impl CaptureStore {
    /// Create a store over a capture directory
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// List complete request/response pairs in recording order
    ///
    /// Identifiers flagged with an errors file, or missing one of the two
    /// files, are skipped.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be read or a capture file has
    /// an unknown extension
    pub fn pairs(&self) -> Result<Vec<CapturePair>> {
        let mut slots: BTreeMap<String, Slot> = BTreeMap::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            let Some(rest) = file_name.strip_prefix(self.prefix.as_str()) else {
                continue;
            };
            if !entry.file_type()?.is_file() {
                debug!("Skipping non-file capture entry: {}", file_name);
                continue;
            }

            let (id, ext) = rest.rsplit_once('.').unwrap_or((rest, ""));
            let slot = slots.entry(id.to_string()).or_default();
            match ext {
                REQUEST_EXT => slot.request = Some(entry.path()),
                RESPONSE_EXT => slot.response = Some(entry.path()),
                ERRORS_EXT => slot.errored = true,
                _ => {
                    return Err(RecorderError::UnexpectedExtension {
                        file: file_name.to_string(),
                        extension: ext.to_string(),
                    })
                }
            }
        }

        let total = slots.len();
        let pairs: Vec<CapturePair> = slots
            .into_iter()
            .filter_map(|(id, slot)| {
                if slot.errored {
                    warn!("Error in response {}, skipping exchange", id);
                    return None;
                }
                match (slot.request, slot.response) {
                    (Some(request), Some(response)) => Some(CapturePair {
                        id,
                        request,
                        response,
                    }),
                    _ => {
                        debug!("Incomplete exchange {}, skipping", id);
                        None
                    }
                }
            })
            .collect();

        info!(
            "Found {} complete exchanges out of {} in {}",
            pairs.len(),
            total,
            self.dir.display()
        );

        Ok(pairs)
    }
}
