//! Secret resolution
//!
//! Memoized lookups against an external parameter store and decryption
//! service, consumed by the template function set.

mod cache;
mod error;

pub use cache::{BackendFactory, SecretCache};
pub use error::{LookupReason, SecretError};

#[cfg(test)]
pub(crate) use cache::tests::MockBackend;
