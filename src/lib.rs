//! ecs-template - SSM/KMS aware file templating
//!
//! Fetches files, directories and archives to their destinations, then
//! renders every file destination in place as a template whose functions
//! can read from SSM Parameter Store and decrypt with KMS. Lookups are
//! memoized for the whole run.
//!
//! ## Layers
//!
//! - `domain` - pairs, manifests and the fetcher/secret-store ports
//! - `secrets` - memoized secret resolution
//! - `template` - the Tera engine and its secret functions
//! - `application` - manifest resolution and the run orchestrator
//! - `infrastructure` - default fetcher, globbing, filesystem, AWS CLI backend
//! - `presentation` - CLI flags and dependency wiring

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod presentation;
pub mod secrets;
pub mod template;

// Re-exports for convenience
pub use application::{ManifestResolver, ResolveRequest, ResolveSummary, Resolver};
pub use config::Config;
pub use domain::{Manifest, Pair, ResolvedPairs};
pub use error::{Error, EtResult, Stage};
pub use secrets::{SecretCache, SecretError};
pub use template::TemplateEngine;
