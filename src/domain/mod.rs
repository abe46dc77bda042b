//! Domain Layer
//!
//! Pure data model of ecs-template, without I/O dependencies.
//!
//! ## Structure
//!
//! - `pair` - The `(source, dest)` tuple and its declaration syntax
//! - `manifest` - The manifest document schema
//! - `ports/` - Interface definitions for infrastructure (fetcher, secret store)
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system or network directly
//! 2. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod manifest;
pub mod pair;
pub mod ports;

pub use manifest::Manifest;
pub use pair::{split_declaration, Pair, ResolvedPairs};
