//! Resolver
//!
//! Resolution runs strictly in order, each step fatal on the first error:
//!
//! 1. manifests (their `dirs` are fetched as they are read)
//! 2. explicit directory declarations
//! 3. explicit globs
//! 4. explicit file declarations
//! 5. directory fetches
//! 6. file fetches (in-place pairs skipped)
//! 7. in-place render of every file destination
//!
//! Nothing is rolled back when a later step fails.

use std::path::{Path, PathBuf};

use super::{ResolveRequest, ResolveSummary};
use crate::application::manifest::{expand_globs, parse_pairs, ManifestResolver};
use crate::application::transfer;
use crate::domain::ports::fetcher::resolve;
use crate::domain::ports::{Fetcher, FileSystem};
use crate::domain::{Pair, ResolvedPairs};
use crate::error::{EtResult, Stage};
use crate::infrastructure::LocalFs;
use crate::template::TemplateEngine;

/// Orchestrates a full resolution run
pub struct Resolver<F: Fetcher, S: FileSystem = LocalFs> {
    fetcher: F,
    engine: TemplateEngine,
    fs: S,
    working_dir: PathBuf,
}

impl<F: Fetcher> Resolver<F> {
    /// Relative sources and destinations resolve against `working_dir`.
    pub fn new(fetcher: F, engine: TemplateEngine, working_dir: impl Into<PathBuf>) -> Self {
        Self::with_fs(fetcher, engine, LocalFs::new(), working_dir)
    }
}

impl<F: Fetcher, S: FileSystem> Resolver<F, S> {
    pub fn with_fs(
        fetcher: F,
        engine: TemplateEngine,
        fs: S,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            engine,
            fs,
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Execute every step of the run.
    pub fn run(&self, request: &ResolveRequest) -> EtResult<ResolveSummary> {
        let pairs = self.plan(request)?;
        tracing::debug!(
            dirs = pairs.dirs.len(),
            files = pairs.files.len(),
            "resolved declarations"
        );

        Ok(ResolveSummary {
            directories: self.fetch_directories(&pairs.dirs)?,
            fetched_files: self.fetch_files(&pairs.files)?,
            rendered_files: self.render_destinations(&pairs.files)?,
        })
    }

    /// Resolve all declarations into pairs.
    ///
    /// Manifest directory entries are fetched here, since later globs may
    /// refer to them.
    pub fn plan(&self, request: &ResolveRequest) -> EtResult<ResolvedPairs> {
        let manifests = ManifestResolver::new(&self.fetcher, &self.engine, &self.working_dir)
            .with_fs(&self.fs);
        let mut files = manifests.resolve_all(&request.manifests)?;

        let dirs = parse_pairs(&self.engine, &request.dirs, Stage::DirectoryDeclaration)?;

        files.extend(expand_globs(&self.engine, &self.working_dir, &request.globs)?);
        files.extend(parse_pairs(&self.engine, &request.files, Stage::FileDeclaration)?);

        Ok(ResolvedPairs { dirs, files })
    }

    /// Copy or fetch every directory pair, returning how many were handled.
    pub fn fetch_directories(&self, dirs: &[Pair]) -> EtResult<usize> {
        for pair in dirs {
            transfer::fetch_directory(&self.fetcher, &self.fs, &self.working_dir, pair)
                .map_err(|e| e.in_stage(Stage::DirectoryFetch, pair.to_string()))?;
        }
        Ok(dirs.len())
    }

    /// Fetch every file pair that is not in place, returning the fetch count.
    pub fn fetch_files(&self, files: &[Pair]) -> EtResult<usize> {
        let mut fetched = 0;
        for pair in files {
            if transfer::fetch_file(&self.fetcher, &self.working_dir, pair)
                .map_err(|e| e.in_stage(Stage::FileFetch, pair.to_string()))?
            {
                fetched += 1;
            }
        }
        Ok(fetched)
    }

    /// Render every destination in place, returning how many were rendered.
    pub fn render_destinations(&self, files: &[Pair]) -> EtResult<usize> {
        for pair in files {
            self.render_destination(pair)
                .map_err(|e| e.in_stage(Stage::Render, &pair.dest))?;
        }
        Ok(files.len())
    }

    fn render_destination(&self, pair: &Pair) -> EtResult<()> {
        let source = resolve(&self.working_dir, &pair.source);
        let dest = resolve(&self.working_dir, &pair.dest);

        tracing::info!("rendering template file {}", pair.dest);
        let rendered = self.engine.render_file(&dest)?;
        self.fs.replace_content(&dest, rendered.as_bytes())?;

        if source != dest && source.exists() {
            if let Err(err) = self.fs.copy_permissions(&source, &dest) {
                tracing::warn!(
                    source = %source.display(),
                    dest = %dest.display(),
                    error = %err,
                    "could not copy permissions"
                );
            }
        }
        Ok(())
    }
}
