//! Error types for ecs-template
//!
//! Library code returns [`Error`]; the binary wraps it in `anyhow` at the
//! process boundary.

use std::fmt;
use std::path::PathBuf;

use crate::domain::ports::FetchError;
use crate::secrets::SecretError;

/// Result type alias for ecs-template operations
pub type EtResult<T> = Result<T, Error>;

/// Pipeline stage an error occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Manifest,
    DirectoryDeclaration,
    Glob,
    FileDeclaration,
    DirectoryFetch,
    FileFetch,
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Manifest => "manifest",
            Stage::DirectoryDeclaration => "directory declaration",
            Stage::Glob => "glob",
            Stage::FileDeclaration => "file declaration",
            Stage::DirectoryFetch => "directory fetch",
            Stage::FileFetch => "file fetch",
            Stage::Render => "render",
        };
        f.write_str(name)
    }
}

/// Main error type for ecs-template operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Malformed pair declaration or glob pattern
    #[error("invalid declaration '{input}': {message}")]
    Parse { input: String, message: String },

    /// Manifest content does not match the manifest schema
    #[error("invalid manifest '{manifest}': {message}")]
    ManifestFormat { manifest: String, message: String },

    /// Transport, copy or extraction failure
    #[error("could not fetch '{from}' to '{to}': {cause}")]
    Fetch {
        from: String,
        to: String,
        #[source]
        cause: FetchError,
    },

    /// Template parse or execution failure
    #[error("could not render {name}: {message}")]
    Render {
        name: String,
        message: String,
        /// Set when the render failed because a secret lookup failed
        #[source]
        secret: Option<SecretError>,
    },

    /// Configuration file could not be loaded
    #[error("invalid configuration in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An error annotated with the pipeline stage and the item being processed
    #[error("{stage} failed for '{subject}': {inner}")]
    Stage {
        stage: Stage,
        subject: String,
        #[source]
        inner: Box<Error>,
    },
}

impl Error {
    pub(crate) fn parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Wrap this error with stage context.
    pub fn in_stage(self, stage: Stage, subject: impl Into<String>) -> Self {
        Error::Stage {
            stage,
            subject: subject.into(),
            inner: Box::new(self),
        }
    }

    /// The innermost error, skipping any stage annotations.
    pub fn root(&self) -> &Error {
        match self {
            Error::Stage { inner, .. } => inner.root(),
            other => other,
        }
    }

    /// The outermost stage annotation, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_parse() {
        let err = Error::parse(" , /bar", "source path is empty");
        assert_eq!(
            err.to_string(),
            "invalid declaration ' , /bar': source path is empty"
        );
    }

    #[test]
    fn test_stage_display_names_stage_and_subject() {
        let err = Error::parse("", "declaration is empty").in_stage(Stage::FileDeclaration, "");
        assert!(err
            .to_string()
            .starts_with("file declaration failed for '':"));
    }

    #[test]
    fn test_root_skips_nested_stages() {
        let err = Error::parse("x", "bad")
            .in_stage(Stage::Glob, "x")
            .in_stage(Stage::Manifest, "m.yaml");
        assert_eq!(err.stage(), Some(Stage::Manifest));
        assert!(matches!(err.root(), Error::Parse { .. }));
    }
}
