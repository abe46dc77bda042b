//! Default Fetcher
//!
//! Handles the sources ecs-template supports out of the box:
//!
//! | Source | File mode | Directory mode |
//! |---|---|---|
//! | local file / `file://` | copy | extract if archive |
//! | local directory | error | recursive copy |
//! | `http(s)://` | download | download + extract if archive |
//! | S3 object or prefix | download | extract if archive, else every key under the prefix |

mod archive;
mod http;
mod s3;

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub use archive::{extract, is_archive, Compression};
pub use http::HttpDownloader;
pub use s3::{ObjectStore, S3Location, S3Settings, S3Store};

use crate::config::{AwsConfig, FetchConfig};
use crate::domain::ports::fetcher::resolve;
use crate::domain::ports::{
    FetchError, FetchMode, FetchRequest, FetchResult, Fetcher, FileSystem,
};
use crate::infrastructure::fs::LocalFs;

/// Where a source string points
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Local(PathBuf),
    Http(String),
    S3(S3Location),
}

impl Source {
    fn classify(source: &str, working_dir: &Path) -> FetchResult<Self> {
        if let Some(location) = S3Location::parse(source)? {
            return Ok(Source::S3(location));
        }
        if source.starts_with("http://") || source.starts_with("https://") {
            return Ok(Source::Http(source.to_string()));
        }
        if let Some(path) = source.strip_prefix("file://") {
            return Ok(Source::Local(resolve(working_dir, path)));
        }
        if let Some((scheme, _)) = source.split_once("://") {
            return Err(FetchError::Unsupported(format!(
                "scheme '{scheme}' in '{source}'"
            )));
        }
        Ok(Source::Local(resolve(working_dir, source)))
    }
}

/// Fetcher for local paths, HTTP(S) URLs, S3 objects and tar archives
#[derive(Clone)]
pub struct DefaultFetcher {
    fs: LocalFs,
    http: HttpDownloader,
    s3: Arc<dyn ObjectStore>,
}

impl DefaultFetcher {
    pub fn new(config: &FetchConfig) -> FetchResult<Self> {
        Self::with_aws(config, &AwsConfig::default())
    }

    /// S3 clients take their region and profile from `aws`.
    pub fn with_aws(fetch: &FetchConfig, aws: &AwsConfig) -> FetchResult<Self> {
        Ok(Self {
            fs: LocalFs::new(),
            http: HttpDownloader::new(Duration::from_secs(fetch.http_timeout_secs))?,
            s3: Arc::new(S3Store::new(S3Settings::new(fetch, aws))),
        })
    }

    /// Replace the store S3 sources are read from
    pub fn with_object_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.s3 = store;
        self
    }

    fn fetch_local(&self, path: &Path, dest: &Path, mode: FetchMode) -> FetchResult<()> {
        if !path.exists() {
            return Err(FetchError::NotFound(path.to_path_buf()));
        }

        match mode {
            FetchMode::File if path.is_file() => Ok(self.fs.copy_file(path, dest)?),
            FetchMode::File => Err(FetchError::Unsupported(format!(
                "'{}' is a directory; declare it as a directory pair",
                path.display()
            ))),
            FetchMode::Directory if path.is_dir() => Ok(self.fs.copy_dir_all(path, dest)?),
            FetchMode::Directory if is_archive(&path.to_string_lossy()) => extract(path, dest),
            FetchMode::Directory => Err(FetchError::Unsupported(format!(
                "'{}' is neither a directory nor a tar archive",
                path.display()
            ))),
        }
    }

    fn fetch_http(&self, url: &str, dest: &Path, mode: FetchMode) -> FetchResult<()> {
        match mode {
            FetchMode::File => self.http.download(url, dest),
            FetchMode::Directory if is_archive(url) => {
                let scratch = tempfile::tempdir()?;
                let archive = scratch.path().join(archive_name(url));
                self.http.download(url, &archive)?;
                extract(&archive, dest)
            }
            FetchMode::Directory => Err(FetchError::Unsupported(format!(
                "'{url}' is not a tar archive and cannot be fetched as a directory"
            ))),
        }
    }

    fn fetch_s3(&self, location: &S3Location, dest: &Path, mode: FetchMode) -> FetchResult<()> {
        match mode {
            FetchMode::File => self.download_object(location, dest),
            FetchMode::Directory if is_archive(&location.key) => {
                let scratch = tempfile::tempdir()?;
                let archive = scratch.path().join(archive_name(&location.key));
                self.download_object(location, &archive)?;
                extract(&archive, dest)
            }
            FetchMode::Directory => self.download_prefix(location, dest),
        }
    }

    fn download_object(&self, location: &S3Location, dest: &Path) -> FetchResult<()> {
        if location.key.is_empty() || location.key.ends_with('/') {
            return Err(FetchError::Unsupported(format!(
                "'{location}' names no object"
            )));
        }

        let content = self.s3.get(location)?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, content)?;
        Ok(())
    }

    /// Download every object under the key prefix, keeping the key layout.
    fn download_prefix(&self, location: &S3Location, dest: &Path) -> FetchResult<()> {
        let prefix = match location.key.as_str() {
            "" => String::new(),
            key if key.ends_with('/') => key.to_string(),
            key => format!("{key}/"),
        };
        let keys = self.s3.list(&location.with_key(prefix.as_str()))?;
        if keys.is_empty() {
            return Err(FetchError::NotFound(PathBuf::from(location.to_string())));
        }

        fs::create_dir_all(dest)?;
        for key in keys {
            let Some(relative) = key.strip_prefix(prefix.as_str()) else {
                continue;
            };
            // Folder placeholders
            if relative.is_empty() || relative.ends_with('/') {
                continue;
            }
            let relative = Path::new(relative);
            if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
                return Err(FetchError::Unsupported(format!(
                    "object key '{key}' points outside the destination"
                )));
            }
            self.download_object(&location.with_key(key.as_str()), &dest.join(relative))?;
        }
        Ok(())
    }
}

/// Last path segment of a URL or key, without query or fragment
fn archive_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("archive.tar")
        .to_string()
}

impl Fetcher for DefaultFetcher {
    fn fetch(&self, request: &FetchRequest) -> FetchResult<()> {
        let dest = request.dest_path();
        match Source::classify(&request.source, &request.working_dir)? {
            Source::Local(path) => self.fetch_local(&path, &dest, request.mode),
            Source::Http(url) => self.fetch_http(&url, &dest, request.mode),
            Source::S3(location) => self.fetch_s3(&location, &dest, request.mode),
        }
    }
}
