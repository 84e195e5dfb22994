//! Materialization of uploaded files

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::Result;

/// Name used for uploads whose part carried an empty filename
pub const FALLBACK_UPLOAD_NAME: &str = "empty.txt";

/// Directory receiving the content of recorded file uploads
///
/// Existing files are never overwritten: the first recorded content wins
/// and later runs keep whatever is already on disk.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create a store writing into `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Save uploaded content unless a file of that name already exists
    ///
    /// Returns the name the upload is referenced by.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or written
    pub fn save(&self, filename: &str, content: &[u8]) -> Result<String> {
        let name = upload_name(filename);
        let path = self.dir.join(&name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                info!("Saving uploaded file: {}", path.display());
                write_or_discard(&path, file, content)?;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                warn!("Uploaded file {} already exists, keeping it", path.display());
            }
            Err(e) => return Err(e.into()),
        }

        Ok(name)
    }
}

/// Write a freshly created upload, removing it again if the write fails
///
/// A partial file left behind would be kept as-is by every later run.
fn write_or_discard(path: &Path, mut file: impl Write, content: &[u8]) -> io::Result<()> {
    let written = file.write_all(content).and_then(|()| file.flush());
    drop(file);

    if let Err(e) = written {
        if let Err(remove) = fs::remove_file(path) {
            warn!("Could not remove partial upload {}: {}", path.display(), remove);
        }
        return Err(e);
    }
    Ok(())
}

/// Final path component of a client supplied filename
///
/// Browsers may send a full client path (`C:\Users\me\cv.pdf`); only the
/// last component is kept so uploads stay inside the upload directory.
fn upload_name(filename: &str) -> String {
    let name = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        FALLBACK_UPLOAD_NAME.to_string()
    } else {
        name.to_string()
    }
}
