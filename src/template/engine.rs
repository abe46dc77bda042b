//! Template Engine
//!
//! Renders a whole document atomically: either every function call succeeds
//! and the full output is returned, or nothing is.

use std::error::Error as StdError;
use std::path::Path;
use std::sync::Arc;

use tera::{Context, Tera};

use super::functions::register_secret_functions;
use crate::error::{Error, EtResult};
use crate::secrets::{SecretCache, SecretError};

/// Renders strings and files with the secret function set
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    secrets: Arc<SecretCache>,
}

impl TemplateEngine {
    pub fn new(secrets: Arc<SecretCache>) -> Self {
        Self { secrets }
    }

    /// The cache backing the secret functions
    pub fn secrets(&self) -> &Arc<SecretCache> {
        &self.secrets
    }

    fn tera(&self) -> Tera {
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        register_secret_functions(&mut tera, &self.secrets);
        tera
    }

    /// Render `body`; `name` identifies it in error messages.
    pub fn render(&self, name: &str, body: &str) -> EtResult<String> {
        let mut tera = self.tera();
        tera.add_raw_template(name, body)
            .map_err(|e| render_error(name, &e))?;
        tera.render(name, &Context::new())
            .map_err(|e| render_error(name, &e))
    }

    /// Read and render the file at `path`, returning the rendered text.
    pub fn render_file(&self, path: &Path) -> EtResult<String> {
        let name = path.display().to_string();
        let body = std::fs::read(path)?;
        let body = String::from_utf8(body).map_err(|_| Error::Render {
            name: name.clone(),
            message: "file is not valid UTF-8".to_string(),
            secret: None,
        })?;
        self.render(&name, &body)
    }
}

/// Flatten a Tera error chain, keeping a typed secret failure if there is one.
fn render_error(name: &str, err: &tera::Error) -> Error {
    let mut messages = vec![err.to_string()];
    let mut secret = None;

    let mut cause = err.source();
    while let Some(current) = cause {
        if secret.is_none() {
            secret = current.downcast_ref::<SecretError>().cloned();
        }
        messages.push(current.to_string());
        cause = current.source();
    }

    Error::Render {
        name: name.to_string(),
        message: single_line(&messages.join(": ")),
        secret,
    }
}

/// Fold a multi-line parser diagnostic onto one line.
fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != "|")
        .collect::<Vec<_>>()
        .join(" ")
}
