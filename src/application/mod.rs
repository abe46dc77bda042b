//! Application Layer
//!
//! Use cases that orchestrate a resolution run.
//! This layer:
//! - Depends on the Domain layer (pairs, manifests, ports)
//! - Coordinates fetching, glob expansion and rendering
//!
//! ## Use Cases
//!
//! - `Resolver` - Orchestrates the whole run (plan, fetch, render)
//! - `ManifestResolver` - Turns manifest references into file pairs

pub mod manifest;
pub mod resolve;
mod transfer;

pub use manifest::ManifestResolver;
pub use resolve::{ResolveRequest, ResolveSummary, Resolver};
