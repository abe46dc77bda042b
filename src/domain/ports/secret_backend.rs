//! SecretBackend port - abstraction over a parameter store and a key service
//!
//! The secret cache only ever talks to this trait, so rendering can be
//! tested without cloud credentials.

use crate::secrets::SecretError;

/// A named parameter returned from a path lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

/// One page of a path lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterPage {
    pub parameters: Vec<Parameter>,
    /// Token for the next page, `None` on the last page
    pub next_token: Option<String>,
}

/// External parameter store and decryption service
pub trait SecretBackend: Send + Sync {
    /// Fetch a single parameter value.
    fn get_parameter(&self, key: &str, decrypt: bool) -> Result<String, SecretError>;

    /// Fetch one page of parameters whose names start with `path`.
    fn get_parameters_by_path(
        &self,
        path: &str,
        decrypt: bool,
        recursive: bool,
        next_token: Option<&str>,
    ) -> Result<ParameterPage, SecretError>;

    /// Decrypt a raw ciphertext blob.
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, SecretError>;
}
