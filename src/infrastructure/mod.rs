//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - Local file system helpers (recursive copy, in-place writes)
//! - `fetch/` - Default fetcher (local copy, HTTP, S3, archive extraction)
//! - `glob` - Filesystem glob expansion
//! - `aws_cli` - SSM/KMS secret backend driven through the `aws` CLI

pub mod aws_cli;
pub mod fetch;
pub mod fs;
pub mod glob;

// Re-export for convenience
pub use aws_cli::AwsCliBackend;
pub use fetch::DefaultFetcher;
pub use fs::LocalFs;
pub use glob::expand_glob;
