//! Resolve Result

use std::fmt;

/// Counters for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    /// Directory pairs copied or extracted
    pub directories: usize,
    /// File pairs fetched (in-place pairs excluded)
    pub fetched_files: usize,
    /// Destinations rendered
    pub rendered_files: usize,
}

impl fmt::Display for ResolveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}, {} fetched, {} rendered",
            self.directories,
            if self.directories == 1 {
                "directory"
            } else {
                "directories"
            },
            self.fetched_files,
            self.rendered_files
        )
    }
}
