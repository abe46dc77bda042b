//! Secret lookup functions exposed to templates

use std::collections::HashMap;
use std::sync::Arc;

use tera::{Function, Tera, Value};

use crate::secrets::{SecretCache, SecretError};

/// Register the secret function set (and its aliases) on `tera`.
pub fn register_secret_functions(tera: &mut Tera, secrets: &Arc<SecretCache>) {
    for name in ["secret_value", "ssm"] {
        tera.register_function(name, SecretValue(Arc::clone(secrets)));
    }
    for name in ["secret_json", "ssm_json"] {
        tera.register_function(name, SecretJson(Arc::clone(secrets)));
    }
    for name in ["secret_path", "ssm_path"] {
        tera.register_function(name, SecretPath(Arc::clone(secrets)));
    }
    for name in ["decrypt_ciphertext", "kms"] {
        tera.register_function(name, DecryptCiphertext(Arc::clone(secrets)));
    }
}

fn string_arg<'a>(
    function: &str,
    args: &'a HashMap<String, Value>,
    name: &str,
) -> tera::Result<&'a str> {
    match args.get(name) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(tera::Error::msg(format!(
            "`{function}`: argument `{name}` must be a string, got {other}"
        ))),
        None => Err(tera::Error::msg(format!(
            "`{function}`: missing required argument `{name}`"
        ))),
    }
}

fn bool_arg(function: &str, args: &HashMap<String, Value>, name: &str) -> tera::Result<bool> {
    match args.get(name) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(tera::Error::msg(format!(
            "`{function}`: argument `{name}` must be a boolean, got {other}"
        ))),
        None => Ok(false),
    }
}

fn lookup_failed(function: &str, err: SecretError) -> tera::Error {
    tera::Error::chain(format!("`{function}` failed"), err)
}

struct SecretValue(Arc<SecretCache>);

impl Function for SecretValue {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let key = string_arg("secret_value", args, "key")?;
        let decrypt = bool_arg("secret_value", args, "decrypt")?;
        self.0
            .resolve_value(key, decrypt)
            .map(Value::String)
            .map_err(|e| lookup_failed("secret_value", e))
    }
}

struct SecretJson(Arc<SecretCache>);

impl Function for SecretJson {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let key = string_arg("secret_json", args, "key")?;
        let decrypt = bool_arg("secret_json", args, "decrypt")?;
        self.0
            .resolve_json(key, decrypt)
            .map(Value::Object)
            .map_err(|e| lookup_failed("secret_json", e))
    }
}

struct SecretPath(Arc<SecretCache>);

impl Function for SecretPath {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let path = string_arg("secret_path", args, "path")?;
        let decrypt = bool_arg("secret_path", args, "decrypt")?;
        let recursive = bool_arg("secret_path", args, "recursive")?;
        let values = self
            .0
            .resolve_path(path, decrypt, recursive)
            .map_err(|e| lookup_failed("secret_path", e))?;
        Ok(Value::Object(
            values
                .into_iter()
                .map(|(name, value)| (name, Value::String(value)))
                .collect(),
        ))
    }
}

struct DecryptCiphertext(Arc<SecretCache>);

impl Function for DecryptCiphertext {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let ciphertext = string_arg("decrypt_ciphertext", args, "ciphertext")?;
        self.0
            .decrypt(ciphertext)
            .map(Value::String)
            .map_err(|e| lookup_failed("decrypt_ciphertext", e))
    }
}
