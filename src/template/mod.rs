//! Template rendering
//!
//! Documents are rendered with [Tera](https://keats.github.io/tera/) against
//! an empty context: only function calls produce dynamic content. On top of
//! Tera's built-in functions and filters, documents can call:
//!
//! - `secret_value(key, decrypt=false)` - a single parameter value
//! - `secret_json(key, decrypt=false)` - a parameter parsed as a JSON object
//! - `secret_path(path, decrypt=false, recursive=false)` - all parameters under a path
//! - `decrypt_ciphertext(ciphertext)` - plaintext of a base64 ciphertext
//!
//! `ssm`, `ssm_json`, `ssm_path` and `kms` are accepted as aliases.

mod engine;
mod functions;

pub use engine::TemplateEngine;
pub use functions::register_secret_functions;
