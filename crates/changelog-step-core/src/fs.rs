//! File access used by the step

use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{FileError, Result};

/// Minimal file operations the step needs
pub trait FileStore: Send + Sync {
    /// Whether `path` exists
    fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Read `path` as UTF-8
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Create or truncate `path` and write `content`
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;
}

/// The local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl LocalFileStore {
    /// Create a new local file store
    pub fn new() -> Self {
        Self
    }
}

impl FileStore for LocalFileStore {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        path.try_exists()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }
}

/// Write `content` to `path` unless a file is already there.
///
/// Existing files are left untouched whatever they contain. Returns whether
/// the file was written.
pub fn write_if_absent(files: &dyn FileStore, path: &Path, content: &str) -> Result<bool> {
    let exists = files
        .exists(path)
        .map_err(|source| FileError::ExistenceCheck {
            path: path.to_path_buf(),
            source,
        })?;

    if exists {
        debug!(path = %path.display(), "file exists, leaving it as is");
        return Ok(false);
    }

    files
        .write(path, content)
        .map_err(|source| FileError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), bytes = content.len(), "file written");
    Ok(true)
}

/// Read `path`, mapping failures to a `FileError`
pub fn read_file(files: &dyn FileStore, path: &Path) -> Result<String> {
    files.read_to_string(path).map_err(|source| {
        FileError::Read {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}
