//! Pair transfer helpers shared by the manifest resolver and the orchestrator

use std::path::Path;

use crate::domain::ports::fetcher::resolve;
use crate::domain::ports::{FetchError, FetchMode, FetchRequest, Fetcher, FileSystem};
use crate::domain::Pair;
use crate::error::{Error, EtResult};

/// Fetch a directory pair.
///
/// A source that is a local directory is copied recursively; anything else
/// (archive, URL) goes through the fetcher in directory mode.
pub(crate) fn fetch_directory<F: Fetcher, S: FileSystem + ?Sized>(
    fetcher: &F,
    fs: &S,
    working_dir: &Path,
    pair: &Pair,
) -> EtResult<()> {
    let source = resolve(working_dir, &pair.source);
    if source.is_dir() {
        tracing::info!("copying directory {} to destination {}", pair.source, pair.dest);
        return fs
            .copy_dir_all(&source, &resolve(working_dir, &pair.dest))
            .map_err(|e| fetch_error(pair, e.into()));
    }

    tracing::info!("fetching source {} to destination {}", pair.source, pair.dest);
    let request = FetchRequest::new(&pair.source, &pair.dest, FetchMode::Directory, working_dir);
    fetcher.fetch(&request).map_err(|e| fetch_error(pair, e))
}

/// Fetch a file pair. In-place pairs are left untouched.
pub(crate) fn fetch_file<F: Fetcher>(
    fetcher: &F,
    working_dir: &Path,
    pair: &Pair,
) -> EtResult<bool> {
    if pair.is_in_place() {
        return Ok(false);
    }

    tracing::info!("fetching file {} to destination {}", pair.source, pair.dest);
    let request = FetchRequest::new(&pair.source, &pair.dest, FetchMode::File, working_dir);
    fetcher.fetch(&request).map_err(|e| fetch_error(pair, e))?;
    Ok(true)
}

fn fetch_error(pair: &Pair, cause: FetchError) -> Error {
    Error::Fetch {
        from: pair.source.clone(),
        to: pair.dest.clone(),
        cause,
    }
}
