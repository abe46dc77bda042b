//! HTTP(S) downloads

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::domain::ports::{FetchError, FetchResult};

/// Blocking HTTP downloader
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ecs-template/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transfer(e.to_string()))?;
        Ok(Self { client })
    }

    /// Download `url` into the file at `dest`, creating parent directories
    pub fn download(&self, url: &str, dest: &Path) -> FetchResult<()> {
        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::Transfer(e.to_string()))?;

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(dest)?;
        response
            .copy_to(&mut file)
            .map_err(|e| FetchError::Transfer(e.to_string()))?;
        Ok(())
    }
}
