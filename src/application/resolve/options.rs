//! Resolve Request
//!
//! The raw, not-yet-rendered declarations for one run.

/// Declarations selected for a run, in the order they were given
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveRequest {
    /// Manifest references
    pub manifests: Vec<String>,
    /// Directory/archive pair declarations
    pub dirs: Vec<String>,
    /// Glob patterns rendered in place
    pub globs: Vec<String>,
    /// File pair declarations
    pub files: Vec<String>,
}

impl ResolveRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifests<I, S>(mut self, manifests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manifests.extend(manifests.into_iter().map(Into::into));
        self
    }

    pub fn with_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    pub fn with_globs<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.globs.extend(globs.into_iter().map(Into::into));
        self
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Whether nothing at all was selected
    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
            && self.dirs.is_empty()
            && self.globs.is_empty()
            && self.files.is_empty()
    }
}
