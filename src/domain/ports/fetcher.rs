//! Fetcher port - abstraction over byte transport
//!
//! A fetcher moves a source (local path, URL, S3 object, archive) to a
//! destination. Implementations:
//! - `DefaultFetcher` - local copy, HTTP and S3 download, archive extraction
//! - recording doubles in tests

use std::path::{Path, PathBuf};

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// What the destination of a fetch is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Destination is a single file
    File,
    /// Destination is a directory (recursive copy or archive extraction)
    Directory,
}

/// A single fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub source: String,
    pub dest: String,
    pub mode: FetchMode,
    /// Directory relative sources and destinations are resolved against
    pub working_dir: PathBuf,
}

impl FetchRequest {
    pub fn new(
        source: impl Into<String>,
        dest: impl Into<String>,
        mode: FetchMode,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            mode,
            working_dir: working_dir.into(),
        }
    }

    /// Destination resolved against the working directory
    pub fn dest_path(&self) -> PathBuf {
        resolve(&self.working_dir, &self.dest)
    }
}

/// Resolve `path` against `base` unless it is already absolute
pub fn resolve(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Fetch operation errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Source does not exist
    #[error("source not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Source scheme or shape cannot be handled in the requested mode
    #[error("unsupported source: {0}")]
    Unsupported(String),
    /// Remote transfer failed
    #[error("transfer failed: {0}")]
    Transfer(String),
    /// Archive could not be decompressed or unpacked
    #[error("archive extraction failed: {0}")]
    Archive(String),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Moves bytes from a source to a destination
pub trait Fetcher {
    /// Fetch `request.source` into `request.dest`
    fn fetch(&self, request: &FetchRequest) -> FetchResult<()>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, request: &FetchRequest) -> FetchResult<()> {
        (**self).fetch(request)
    }
}
