//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! ## Design Notes
//!
//! - Every selection flag is repeatable; `--glob` and `--manifest` also
//!   accept comma separated lists
//! - `--file` and `--dir` take `source[,dest]` declarations, so commas in
//!   them are never used as list separators

use std::path::PathBuf;

use clap::Parser;

use crate::application::ResolveRequest;

/// ecs-template - fetch sources and render destinations as templates
#[derive(Parser, Debug)]
#[command(name = "ecs-template")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Templates may call secret_value, secret_json, secret_path and \
decrypt_ciphertext to read from SSM Parameter Store and KMS.")]
pub struct Cli {
    /// File to fetch and render: source[,dest]; a single path renders in place
    #[arg(short = 'f', long = "file", value_name = "PAIR")]
    pub files: Vec<String>,

    /// Directory or archive to fetch: source[,dest]
    #[arg(short = 'd', long = "dir", value_name = "PAIR")]
    pub dirs: Vec<String>,

    /// Glob of files to render in place
    #[arg(short = 'g', long = "glob", value_name = "PATTERN", value_delimiter = ',')]
    pub globs: Vec<String>,

    /// Manifest listing dirs, globs and files
    #[arg(short = 'm', long = "manifest", value_name = "REF", value_delimiter = ',')]
    pub manifests: Vec<String>,

    /// Only print warnings and errors
    #[arg(long)]
    pub quiet: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Whether any selection flag was given
    pub fn has_selection(&self) -> bool {
        !self.request().is_empty()
    }

    /// The run described by the selection flags
    pub fn request(&self) -> ResolveRequest {
        ResolveRequest::new()
            .with_manifests(self.manifests.iter().cloned())
            .with_dirs(self.dirs.iter().cloned())
            .with_globs(self.globs.iter().cloned())
            .with_files(self.files.iter().cloned())
    }
}
