//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod fetcher;
pub mod file_system;
pub mod secret_backend;

pub use fetcher::{FetchError, FetchMode, FetchRequest, FetchResult, Fetcher};
pub use file_system::FileSystem;
pub use secret_backend::{Parameter, ParameterPage, SecretBackend};
