//! Resolver Factory
//!
//! Creates the resolver with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::Resolver;
use crate::config::{AwsConfig, Config};
use crate::domain::ports::{FetchResult, SecretBackend};
use crate::infrastructure::{AwsCliBackend, DefaultFetcher};
use crate::secrets::SecretCache;
use crate::template::TemplateEngine;

/// Type alias for the resolver used by the binary
pub type ConcreteResolver = Resolver<DefaultFetcher>;

/// A secret cache whose AWS CLI backend is connected on first lookup
pub fn create_secret_cache(aws: &AwsConfig) -> SecretCache {
    let aws = aws.clone();
    SecretCache::new(move || {
        let backend = AwsCliBackend::connect(&aws)?;
        Ok(Arc::new(backend) as Arc<dyn SecretBackend>)
    })
}

/// Create a resolver with all dependencies wired up
pub fn create_resolver(
    config: &Config,
    working_dir: impl Into<PathBuf>,
) -> FetchResult<ConcreteResolver> {
    let fetcher = DefaultFetcher::with_aws(&config.fetch, &config.aws)?;
    let engine = TemplateEngine::new(Arc::new(create_secret_cache(&config.aws)));

    Ok(Resolver::new(fetcher, engine, working_dir))
}
