//! Manifest Resolver
//!
//! Fetches a manifest, fetches its `dirs` straight away, then expands its
//! `globs` and parses its `files`. Globs may point into directories the
//! same manifest just fetched.

use std::path::Path;

use crate::domain::ports::{FetchMode, FetchRequest, Fetcher, FileSystem};
use crate::domain::{Manifest, Pair};
use crate::error::{Error, EtResult, Stage};
use crate::infrastructure::{expand_glob, LocalFs};
use crate::template::TemplateEngine;

use super::transfer;

/// Resolves manifest references into file pairs
pub struct ManifestResolver<'a, F: Fetcher> {
    fetcher: &'a F,
    engine: &'a TemplateEngine,
    fs: &'a dyn FileSystem,
    working_dir: &'a Path,
}

impl<'a, F: Fetcher> ManifestResolver<'a, F> {
    pub fn new(fetcher: &'a F, engine: &'a TemplateEngine, working_dir: &'a Path) -> Self {
        Self {
            fetcher,
            engine,
            fs: &LocalFs,
            working_dir,
        }
    }

    /// Use `fs` for directory copies instead of the local file system.
    pub fn with_fs(mut self, fs: &'a dyn FileSystem) -> Self {
        self.fs = fs;
        self
    }

    /// Resolve every reference in order, concatenating the file pairs.
    pub fn resolve_all(&self, references: &[String]) -> EtResult<Vec<Pair>> {
        let mut files = Vec::new();
        for reference in references {
            files.extend(
                self.resolve(reference)
                    .map_err(|e| e.in_stage(Stage::Manifest, reference))?,
            );
        }
        Ok(files)
    }

    /// Resolve one manifest reference into its file pairs.
    ///
    /// Directory entries are fetched as a side effect before globs expand.
    pub fn resolve(&self, reference: &str) -> EtResult<Vec<Pair>> {
        let location = self.engine.render(reference, reference)?.trim().to_string();
        tracing::info!("parsing manifest {location}");

        let manifest = self.load(&location)?;
        if manifest.is_empty() {
            tracing::debug!(manifest = %location, "manifest declares nothing");
        }

        for declaration in &manifest.dirs {
            let pair = self
                .parse_pair(declaration)
                .map_err(|e| e.in_stage(Stage::DirectoryDeclaration, declaration))?;
            transfer::fetch_directory(self.fetcher, self.fs, self.working_dir, &pair)
                .map_err(|e| e.in_stage(Stage::DirectoryFetch, pair.to_string()))?;
        }

        let mut files = expand_globs(self.engine, self.working_dir, &manifest.globs)?;
        files.extend(parse_pairs(self.engine, &manifest.files, Stage::FileDeclaration)?);
        Ok(files)
    }

    fn load(&self, location: &str) -> EtResult<Manifest> {
        let scratch = tempfile::NamedTempFile::new()?;
        let request = FetchRequest::new(
            location,
            scratch.path().display().to_string(),
            FetchMode::File,
            self.working_dir,
        );
        self.fetcher.fetch(&request).map_err(|cause| Error::Fetch {
            from: location.to_string(),
            to: scratch.path().display().to_string(),
            cause,
        })?;

        let content = std::fs::read(scratch.path())?;
        Manifest::from_yaml(location, &content)
    }

    fn parse_pair(&self, declaration: &str) -> EtResult<Pair> {
        parse_pair(self.engine, declaration)
    }
}

/// Parse a declaration, rendering it through `engine`.
pub(crate) fn parse_pair(engine: &TemplateEngine, declaration: &str) -> EtResult<Pair> {
    Pair::parse(declaration, |text| engine.render(declaration, text))
}

/// Parse each declaration, tagging failures with `stage`.
pub(crate) fn parse_pairs(
    engine: &TemplateEngine,
    declarations: &[String],
    stage: Stage,
) -> EtResult<Vec<Pair>> {
    declarations
        .iter()
        .map(|d| parse_pair(engine, d).map_err(|e| e.in_stage(stage, d)))
        .collect()
}

/// Expand each pattern in order; every match becomes an in-place pair.
pub(crate) fn expand_globs(
    engine: &TemplateEngine,
    working_dir: &Path,
    patterns: &[String],
) -> EtResult<Vec<Pair>> {
    let mut pairs = Vec::new();
    for pattern in patterns {
        let matches =
            expand_glob(pattern, working_dir).map_err(|e| e.in_stage(Stage::Glob, pattern))?;
        if matches.is_empty() {
            tracing::debug!(pattern = %pattern, "glob matched nothing");
        }
        for matched in matches {
            tracing::info!("glob {pattern} matched file {matched}");
            pairs.push(
                parse_pair(engine, &matched).map_err(|e| e.in_stage(Stage::Glob, pattern))?,
            );
        }
    }
    Ok(pairs)
}
