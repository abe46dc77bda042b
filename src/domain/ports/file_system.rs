//! FileSystem port - the local writes a resolution run performs
//!
//! Implementations:
//! - `LocalFs` - standard file I/O
//! - failing or recording doubles in tests

use std::io;
use std::path::Path;

/// Local file operations used by the orchestrator
pub trait FileSystem {
    /// Copy `src` into `dst` recursively, preserving structure and modes
    fn copy_dir_all(&self, src: &Path, dst: &Path) -> io::Result<()>;

    /// Overwrite the content of the existing file at `path`
    fn replace_content(&self, path: &Path, content: &[u8]) -> io::Result<()>;

    /// Copy the permission bits of `src` onto `dst`
    fn copy_permissions(&self, src: &Path, dst: &Path) -> io::Result<()>;
}
