//! Secret Resolution Cache
//!
//! A pure memoization layer: once a lookup succeeds its result is kept for
//! the lifetime of the cache and never refreshed. Failures are not cached.
//!
//! The backend is constructed lazily on the first cache miss, so a render
//! that never calls a secret function needs no credentials or network.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Value};

use super::error::SecretError;
use crate::domain::ports::SecretBackend;

/// Builds the backend on first use
pub type BackendFactory =
    Box<dyn Fn() -> Result<Arc<dyn SecretBackend>, SecretError> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ValueKey {
    key: String,
    decrypt: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PathKey {
    path: String,
    decrypt: bool,
    recursive: bool,
}

/// Memoized access to a [`SecretBackend`]
pub struct SecretCache {
    factory: BackendFactory,
    backend: Mutex<Option<Arc<dyn SecretBackend>>>,
    values: Mutex<HashMap<ValueKey, String>>,
    paths: Mutex<HashMap<PathKey, BTreeMap<String, String>>>,
    plaintexts: Mutex<HashMap<String, String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SecretCache {
    /// Create a cache whose backend is built by `factory` on first use.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn SecretBackend>, SecretError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            backend: Mutex::new(None),
            values: Mutex::new(HashMap::new()),
            paths: Mutex::new(HashMap::new()),
            plaintexts: Mutex::new(HashMap::new()),
        }
    }

    /// Create a cache around an already constructed backend.
    pub fn with_backend(backend: Arc<dyn SecretBackend>) -> Self {
        let cache = Self::new(|| {
            Err(SecretError::ServiceInit(
                "backend factory called on a preinitialized cache".to_string(),
            ))
        });
        *lock(&cache.backend) = Some(backend);
        cache
    }

    /// Whether the backend has been constructed yet.
    pub fn is_initialized(&self) -> bool {
        lock(&self.backend).is_some()
    }

    fn backend(&self) -> Result<Arc<dyn SecretBackend>, SecretError> {
        let mut slot = lock(&self.backend);
        if let Some(backend) = slot.as_ref() {
            return Ok(Arc::clone(backend));
        }

        tracing::debug!("initializing secret backend");
        let backend = (self.factory)()?;
        *slot = Some(Arc::clone(&backend));
        Ok(backend)
    }

    /// Look up a single value.
    pub fn resolve_value(&self, key: &str, decrypt: bool) -> Result<String, SecretError> {
        let cache_key = ValueKey {
            key: key.to_string(),
            decrypt,
        };
        if let Some(value) = lock(&self.values).get(&cache_key) {
            tracing::debug!(key, decrypt, "secret value cache hit");
            return Ok(value.clone());
        }

        let value = self.backend()?.get_parameter(key, decrypt)?;
        tracing::debug!(key, decrypt, "secret value resolved");
        Ok(lock(&self.values).entry(cache_key).or_insert(value).clone())
    }

    /// Look up a single value and parse it as a JSON object.
    pub fn resolve_json(
        &self,
        key: &str,
        decrypt: bool,
    ) -> Result<Map<String, Value>, SecretError> {
        let raw = self.resolve_value(key, decrypt)?;
        serde_json::from_str(&raw).map_err(|e| SecretError::Format {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Look up every parameter under `path`, following all pages.
    ///
    /// Results are keyed by the full `(path, decrypt, recursive)` tuple.
    pub fn resolve_path(
        &self,
        path: &str,
        decrypt: bool,
        recursive: bool,
    ) -> Result<BTreeMap<String, String>, SecretError> {
        let cache_key = PathKey {
            path: path.to_string(),
            decrypt,
            recursive,
        };
        if let Some(values) = lock(&self.paths).get(&cache_key) {
            tracing::debug!(path, decrypt, recursive, "secret path cache hit");
            return Ok(values.clone());
        }

        let backend = self.backend()?;
        let mut values = BTreeMap::new();
        let mut next_token: Option<String> = None;
        loop {
            let page =
                backend.get_parameters_by_path(path, decrypt, recursive, next_token.as_deref())?;
            for parameter in page.parameters {
                values.insert(parameter.name, parameter.value);
            }
            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }
        tracing::debug!(path, count = values.len(), "secret path resolved");

        Ok(lock(&self.paths).entry(cache_key).or_insert(values).clone())
    }

    /// Decrypt a base64 ciphertext.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, SecretError> {
        if let Some(plaintext) = lock(&self.plaintexts).get(ciphertext) {
            tracing::debug!("decrypt cache hit");
            return Ok(plaintext.clone());
        }

        let blob = STANDARD
            .decode(ciphertext.trim())
            .map_err(|e| SecretError::Decode(e.to_string()))?;
        let plaintext = self.backend()?.decrypt(&blob)?;
        let plaintext = String::from_utf8(plaintext)
            .map_err(|_| SecretError::Decrypt("plaintext is not valid UTF-8".to_string()))?;

        Ok(lock(&self.plaintexts)
            .entry(ciphertext.to_string())
            .or_insert(plaintext)
            .clone())
    }
}

impl fmt::Debug for SecretCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretCache")
            .field("initialized", &self.is_initialized())
            .field("values", &lock(&self.values).len())
            .field("paths", &lock(&self.paths).len())
            .field("plaintexts", &lock(&self.plaintexts).len())
            .finish()
    }
}
