//! Pair model
//!
//! A pair is a `(source, dest)` tuple written as `source[,dest]`. A
//! declaration with a single path is an in-place pair: nothing is fetched,
//! the file is only rendered.

use std::fmt;

use crate::error::{Error, EtResult};

/// A resolved `(source, dest)` tuple
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair {
    pub source: String,
    pub dest: String,
}

impl Pair {
    /// Build an in-place pair (`source == dest`).
    pub fn in_place(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            source: path.clone(),
            dest: path,
        }
    }

    /// Whether this pair renders in place and skips the fetch stage.
    pub fn is_in_place(&self) -> bool {
        self.source == self.dest
    }

    /// Parse a declaration, rendering template markers with `render`.
    ///
    /// The whole declaration is rendered first, then split, then each half
    /// is rendered again on its own.
    pub fn parse<R>(declaration: &str, mut render: R) -> EtResult<Self>
    where
        R: FnMut(&str) -> EtResult<String>,
    {
        let rendered = render(declaration)?;
        let (source, dest) = split_declaration(&rendered)?;

        let source = render(&source)?.trim().to_string();
        let dest = render(&dest)?.trim().to_string();
        validate(declaration, &source, &dest)?;

        Ok(Self { source, dest })
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_in_place() {
            write!(f, "{}", self.source)
        } else {
            write!(f, "{} -> {}", self.source, self.dest)
        }
    }
}

/// Split a declaration on its first comma into trimmed `(source, dest)`.
///
/// Without a comma both halves are the whole (trimmed) declaration.
pub fn split_declaration(declaration: &str) -> EtResult<(String, String)> {
    let (source, dest) = match declaration.split_once(',') {
        Some((source, dest)) => (source.trim(), dest.trim()),
        None => {
            let path = declaration.trim();
            (path, path)
        }
    };
    validate(declaration, source, dest)?;
    Ok((source.to_string(), dest.to_string()))
}

fn validate(declaration: &str, source: &str, dest: &str) -> EtResult<()> {
    if source.is_empty() && dest.is_empty() {
        return Err(Error::parse(declaration, "declaration is empty"));
    }
    if source.is_empty() {
        return Err(Error::parse(declaration, "source path is empty"));
    }
    if dest.is_empty() {
        return Err(Error::parse(declaration, "destination path is empty"));
    }
    Ok(())
}

/// Pairs accumulated over a run, split by fetch kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPairs {
    /// Recursive copies and archive extractions
    pub dirs: Vec<Pair>,
    /// Individual fetches and in-place renders
    pub files: Vec<Pair>,
}
