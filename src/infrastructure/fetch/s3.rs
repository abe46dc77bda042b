//! S3 objects
//!
//! Accepted source forms:
//!
//! - `s3://bucket/key`
//! - `s3::https://s3.amazonaws.com/bucket/key`, also with `s3-<region>` or
//!   `s3.<region>` hosts
//! - `s3::http://host:port/bucket/key` for S3 compatible endpoints
//! - `bucket.s3.amazonaws.com/key` and its regional host forms
//!
//! A `region=` query parameter overrides the region for that source.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use tokio::runtime::Runtime;

use crate::config::{AwsConfig, FetchConfig};
use crate::domain::ports::{FetchError, FetchResult};

const AWS_DOMAIN: &str = ".amazonaws.com";

/// Bucket and key of an S3 source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    /// Object key, or key prefix for directory fetches
    pub key: String,
    pub region: Option<String>,
    /// Custom endpoint for S3 compatible services
    pub endpoint: Option<String>,
}

impl S3Location {
    /// Parse an S3 source, returning `None` when `source` is not one
    pub fn parse(source: &str) -> FetchResult<Option<Self>> {
        let (rest, query) = match source.split_once('?') {
            Some((rest, query)) => (rest, Some(query)),
            None => (source, None),
        };

        let location = if let Some(path) = rest.strip_prefix("s3://") {
            let (bucket, key) = split_bucket(path, source)?;
            Self {
                bucket,
                key,
                region: None,
                endpoint: None,
            }
        } else if let Some(url) = rest.strip_prefix("s3::") {
            Self::from_url(url, source)?
        } else if let Some(location) = Self::from_virtual_host(rest) {
            location
        } else {
            return Ok(None);
        };

        let region = query
            .and_then(|q| q.split('&').find_map(|pair| pair.strip_prefix("region=")))
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        Ok(Some(Self {
            region: region.or(location.region.clone()),
            ..location
        }))
    }

    /// `s3::` forced form: path style URL on AWS or a custom endpoint
    fn from_url(url: &str, source: &str) -> FetchResult<Self> {
        let (scheme, rest) = url
            .split_once("://")
            .filter(|(scheme, _)| matches!(*scheme, "http" | "https"))
            .ok_or_else(|| {
                FetchError::Unsupported(format!("S3 source '{source}' needs an http(s) URL"))
            })?;
        let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
        let (bucket, key) = split_bucket(path, source)?;

        Ok(match aws_region(host) {
            Some(region) => Self {
                bucket,
                key,
                region,
                endpoint: None,
            },
            None => Self {
                bucket,
                key,
                region: None,
                endpoint: Some(format!("{scheme}://{host}")),
            },
        })
    }

    /// `bucket.s3[-.region].amazonaws.com/key`
    fn from_virtual_host(rest: &str) -> Option<Self> {
        let (host, key) = rest.split_once('/')?;
        let name = host.strip_suffix(AWS_DOMAIN)?;
        let split = name.rfind(".s3")?;
        let (bucket, service) = (&name[..split], &name[split + 1..]);
        if bucket.is_empty() {
            return None;
        }
        let region = aws_region(&format!("{service}{AWS_DOMAIN}"))?;
        Some(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            region,
            endpoint: None,
        })
    }

    /// Same bucket and endpoint, different key
    pub fn with_key(&self, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..self.clone()
        }
    }
}

impl fmt::Display for S3Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

fn split_bucket(path: &str, source: &str) -> FetchResult<(String, String)> {
    let (bucket, key) = path.split_once('/').unwrap_or((path, ""));
    if bucket.is_empty() {
        return Err(FetchError::Unsupported(format!(
            "S3 source '{source}' names no bucket"
        )));
    }
    Ok((bucket.to_string(), key.to_string()))
}

/// Region encoded in an AWS S3 host; `Some(None)` for the global endpoint,
/// `None` when the host is not an AWS S3 endpoint.
fn aws_region(host: &str) -> Option<Option<String>> {
    let service = host.strip_suffix(AWS_DOMAIN)?;
    if service == "s3" {
        return Some(None);
    }
    service
        .strip_prefix("s3-")
        .or_else(|| service.strip_prefix("s3."))
        .filter(|region| !region.is_empty() && !region.contains('.'))
        .map(|region| Some(region.to_string()))
}

/// Reads objects from S3
pub trait ObjectStore: Send + Sync {
    /// Full content of the object at `location`
    fn get(&self, location: &S3Location) -> FetchResult<Vec<u8>>;

    /// Every key starting with `location.key`
    fn list(&self, location: &S3Location) -> FetchResult<Vec<String>>;
}

/// Client settings shared by every S3 source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

impl S3Settings {
    pub fn new(fetch: &FetchConfig, aws: &AwsConfig) -> Self {
        Self {
            region: aws.region.clone(),
            profile: aws.profile.clone(),
            endpoint: fetch.s3_endpoint.clone(),
            timeout: Duration::from_secs(fetch.http_timeout_secs),
        }
    }
}

type ClientKey = (Option<String>, Option<String>);

/// `ObjectStore` backed by the AWS SDK.
///
/// The runtime and clients are built on first use, one client per region
/// and endpoint.
pub struct S3Store {
    settings: S3Settings,
    runtime: Mutex<Option<Arc<Runtime>>>,
    clients: Mutex<HashMap<ClientKey, Client>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl S3Store {
    pub fn new(settings: S3Settings) -> Self {
        Self {
            settings,
            runtime: Mutex::new(None),
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn runtime(&self) -> FetchResult<Arc<Runtime>> {
        let mut slot = lock(&self.runtime);
        if let Some(runtime) = slot.as_ref() {
            return Ok(Arc::clone(runtime));
        }
        let runtime = Arc::new(
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?,
        );
        *slot = Some(Arc::clone(&runtime));
        Ok(runtime)
    }

    fn client(&self, runtime: &Runtime, location: &S3Location) -> Client {
        let region = location.region.clone().or_else(|| self.settings.region.clone());
        let endpoint = location
            .endpoint
            .clone()
            .or_else(|| self.settings.endpoint.clone());
        let key = (region.clone(), endpoint.clone());

        let mut clients = lock(&self.clients);
        if let Some(client) = clients.get(&key) {
            return client.clone();
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        if let Some(profile) = &self.settings.profile {
            loader = loader.profile_name(profile);
        }
        let sdk_config = runtime.block_on(loader.load());

        let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = endpoint {
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }
        let client = Client::from_conf(s3_config.build());
        clients.insert(key, client.clone());
        client
    }

    fn timed_out(&self, location: &S3Location) -> FetchError {
        FetchError::Transfer(format!(
            "{location}: timed out after {}s",
            self.settings.timeout.as_secs()
        ))
    }
}

fn s3_error(location: &S3Location, action: &str, err: impl std::error::Error) -> FetchError {
    FetchError::Transfer(format!("{location}: {action}: {}", DisplayErrorContext(err)))
}

impl ObjectStore for S3Store {
    fn get(&self, location: &S3Location) -> FetchResult<Vec<u8>> {
        let runtime = self.runtime()?;
        let client = self.client(&runtime, location);
        tracing::debug!(bucket = %location.bucket, key = %location.key, "getting S3 object");

        runtime.block_on(async {
            let download = async {
                let output = client
                    .get_object()
                    .bucket(&location.bucket)
                    .key(&location.key)
                    .send()
                    .await
                    .map_err(|e| s3_error(location, "get_object", e))?;
                let body = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| s3_error(location, "read body", e))?;
                Ok::<_, FetchError>(body.into_bytes().to_vec())
            };
            tokio::time::timeout(self.settings.timeout, download)
                .await
                .map_err(|_| self.timed_out(location))?
        })
    }

    fn list(&self, location: &S3Location) -> FetchResult<Vec<String>> {
        let runtime = self.runtime()?;
        let client = self.client(&runtime, location);
        tracing::debug!(bucket = %location.bucket, prefix = %location.key, "listing S3 objects");

        runtime.block_on(async {
            let listing = async {
                let mut keys = Vec::new();
                let mut token = None;
                loop {
                    let page = client
                        .list_objects_v2()
                        .bucket(&location.bucket)
                        .prefix(&location.key)
                        .set_continuation_token(token)
                        .send()
                        .await
                        .map_err(|e| s3_error(location, "list_objects_v2", e))?;
                    keys.extend(
                        page.contents()
                            .iter()
                            .filter_map(|object| object.key().map(str::to_string)),
                    );
                    match page.next_continuation_token() {
                        Some(next) => token = Some(next.to_string()),
                        None => break,
                    }
                }
                Ok::<_, FetchError>(keys)
            };
            tokio::time::timeout(self.settings.timeout, listing)
                .await
                .map_err(|_| self.timed_out(location))?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(source: &str) -> S3Location {
        S3Location::parse(source).unwrap().unwrap()
    }

    #[test]
    fn s3_scheme() {
        let location = parsed("s3://configs/app/nginx.conf.tmpl");
        assert_eq!(location.bucket, "configs");
        assert_eq!(location.key, "app/nginx.conf.tmpl");
        assert_eq!(location.region, None);
        assert_eq!(location.to_string(), "s3://configs/app/nginx.conf.tmpl");
    }

    #[test]
    fn forced_path_style_urls() {
        let global = parsed("s3::https://s3.amazonaws.com/bucket/app.tgz");
        assert_eq!(global.bucket, "bucket");
        assert_eq!(global.key, "app.tgz");
        assert_eq!(global.region, None);
        assert_eq!(global.endpoint, None);

        let dashed = parsed("s3::https://s3-eu-west-1.amazonaws.com/bucket/a/b");
        assert_eq!(dashed.region.as_deref(), Some("eu-west-1"));
        assert_eq!(dashed.key, "a/b");

        let dotted = parsed("s3::https://s3.us-west-2.amazonaws.com/bucket/k");
        assert_eq!(dotted.region.as_deref(), Some("us-west-2"));
    }

    #[test]
    fn custom_endpoint() {
        let location = parsed("s3::http://127.0.0.1:9000/local/conf.tmpl");
        assert_eq!(location.endpoint.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(location.bucket, "local");
        assert_eq!(location.key, "conf.tmpl");
    }

    #[test]
    fn virtual_hosted_forms() {
        let location = parsed("my.bucket.s3.amazonaws.com/dir/file");
        assert_eq!(location.bucket, "my.bucket");
        assert_eq!(location.key, "dir/file");
        assert_eq!(location.region, None);

        let regional = parsed("bucket.s3-ap-south-1.amazonaws.com/file");
        assert_eq!(regional.region.as_deref(), Some("ap-south-1"));
    }

    #[test]
    fn region_query_overrides_host() {
        let location =
            parsed("s3::https://s3-eu-west-1.amazonaws.com/bucket/k?region=us-east-2");
        assert_eq!(location.region.as_deref(), Some("us-east-2"));
        assert_eq!(location.key, "k");
    }

    #[test]
    fn other_sources_are_not_s3() {
        assert_eq!(S3Location::parse("conf/app.tmpl").unwrap(), None);
        assert_eq!(S3Location::parse("https://example.com/a.tgz").unwrap(), None);
        assert_eq!(S3Location::parse("example.amazonaws.com/x").unwrap(), None);
    }

    #[test]
    fn malformed_sources_are_unsupported() {
        assert!(matches!(
            S3Location::parse("s3:///key"),
            Err(FetchError::Unsupported(_))
        ));
        assert!(matches!(
            S3Location::parse("s3::ftp://host/bucket/key"),
            Err(FetchError::Unsupported(_))
        ));
    }

    #[test]
    fn settings_follow_config() {
        let fetch = FetchConfig {
            s3_endpoint: Some("http://localhost:4566".to_string()),
            ..FetchConfig::default()
        };
        let aws = AwsConfig {
            region: Some("eu-central-1".to_string()),
            ..AwsConfig::default()
        };
        let settings = S3Settings::new(&fetch, &aws);
        assert_eq!(settings.region.as_deref(), Some("eu-central-1"));
        assert_eq!(settings.endpoint.as_deref(), Some("http://localhost:4566"));
        assert_eq!(settings.timeout, Duration::from_secs(60));
    }
}
