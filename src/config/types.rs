//! Configuration type definitions

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EtResult;

use super::loader::{self, ConfigWarning};

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Suppress progress output
    #[serde(default)]
    pub quiet: bool,
}

/// Settings for the AWS CLI secret backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsConfig {
    /// `aws` executable name or path
    #[serde(default = "default_aws_binary")]
    pub binary: String,

    /// Region; discovered from the CLI profile or instance metadata if unset
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub profile: Option<String>,

    /// Parameters requested per page for path lookups
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            binary: default_aws_binary(),
            region: None,
            profile: None,
            page_size: default_page_size(),
        }
    }
}

fn default_aws_binary() -> String {
    "aws".to_string()
}

fn default_page_size() -> u32 {
    10
}

/// Settings for the default fetcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Timeout for HTTP downloads and S3 requests
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Endpoint for S3 compatible services, used with path style addressing
    #[serde(default)]
    pub s3_endpoint: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            s3_endpoint: None,
        }
    }
}

fn default_http_timeout() -> u64 {
    60
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub aws: AwsConfig,

    #[serde(default)]
    pub fetch: FetchConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> EtResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> EtResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load from an explicit file, `ECS_TEMPLATE_CONFIG`, the user config or
    /// defaults, then apply environment overrides.
    pub fn discover(explicit: Option<&Path>) -> EtResult<(Self, Vec<ConfigWarning>)> {
        loader::discover(explicit)
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self, |key| std::env::var(key).ok())
    }
}
