//! Manifest schema
//!
//! A manifest is a YAML document with three optional lists:
//!
//! ```yaml
//! dirs:
//!   - ./archive.tar.gz, /srv/app
//! globs:
//!   - /srv/app/**/*.tmpl
//! files:
//!   - https://example.com/app.conf, /etc/app.conf
//! ```
//!
//! Unknown top-level keys are rejected.

use serde::Deserialize;

use crate::error::{Error, EtResult};

/// A batch of directory, glob and file declarations
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    /// Directory/archive pair declarations
    pub dirs: Vec<String>,
    /// Glob patterns whose matches render in place
    pub globs: Vec<String>,
    /// File pair declarations
    pub files: Vec<String>,
}

impl Manifest {
    /// Deserialize a manifest; `name` is used in error messages.
    pub fn from_yaml(name: &str, content: &[u8]) -> EtResult<Self> {
        // An empty document deserializes to unit, not to a mapping
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_yaml_ng::from_slice(content).map_err(|e| Error::ManifestFormat {
            manifest: name.to_string(),
            message: e.to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.globs.is_empty() && self.files.is_empty()
    }
}
