//! Tar archive extraction
//!
//! Plain, gzip and zstd compressed tarballs, picked by file suffix.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;

use crate::domain::ports::{FetchError, FetchResult};

/// Compression wrapped around a tar stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
}

const SUFFIXES: &[(&str, Compression)] = &[
    (".tar", Compression::None),
    (".tar.gz", Compression::Gzip),
    (".tgz", Compression::Gzip),
    (".tar.zst", Compression::Zstd),
    (".tzst", Compression::Zstd),
];

impl Compression {
    /// Detect from a path or URL path; `None` when it is not a tarball
    pub fn detect(name: &str) -> Option<Self> {
        let name = name.split(['?', '#']).next().unwrap_or(name).to_lowercase();
        SUFFIXES
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix))
            .map(|(_, compression)| *compression)
    }
}

/// Whether `name` (a path or URL path) looks like a tar archive
pub fn is_archive(name: &str) -> bool {
    Compression::detect(name).is_some()
}

/// Extract `archive` into `dest`, creating `dest` if needed.
///
/// Entries that would land outside `dest` are skipped.
pub fn extract(archive: &Path, dest: &Path) -> FetchResult<()> {
    let compression = Compression::detect(&archive.to_string_lossy()).ok_or_else(|| {
        FetchError::Unsupported(format!("'{}' is not a tar archive", archive.display()))
    })?;
    extract_as(archive, dest, compression)
}

/// Extract `archive` with an explicit compression, ignoring its name
pub fn extract_as(archive: &Path, dest: &Path, compression: Compression) -> FetchResult<()> {
    let reader = BufReader::new(File::open(archive)?);
    fs::create_dir_all(dest)?;

    tracing::debug!(
        archive = %archive.display(),
        dest = %dest.display(),
        ?compression,
        "extracting archive"
    );
    match compression {
        Compression::None => unpack(Archive::new(reader), archive, dest),
        Compression::Gzip => unpack(Archive::new(GzDecoder::new(reader)), archive, dest),
        Compression::Zstd => {
            let decoder = zstd::stream::read::Decoder::with_buffer(reader)
                .map_err(|e| archive_error(archive, &e))?;
            unpack(Archive::new(decoder), archive, dest)
        }
    }
}

fn unpack<R: Read>(mut tarball: Archive<R>, archive: &Path, dest: &Path) -> FetchResult<()> {
    tarball.set_preserve_permissions(true);
    tarball.set_overwrite(true);
    tarball
        .unpack(dest)
        .map_err(|e| archive_error(archive, &e))
}

fn archive_error(archive: &Path, err: &std::io::Error) -> FetchError {
    FetchError::Archive(format!("{}: {}", archive.display(), err))
}
