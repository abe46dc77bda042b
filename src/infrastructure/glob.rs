//! Filesystem glob expansion
//!
//! Supports `*`, `?`, `[...]`, `{a,b}` within a path component and `**`
//! across components. Matches are regular files, returned in a depth-first
//! walk sorted by file name, and keep the pattern's own prefix
//! (`../data/**/*.tmpl` yields `../data/x/a.tmpl`).

use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use ignore::WalkBuilder;

use crate::error::{Error, EtResult};

const META_CHARS: &[char] = &['*', '?', '[', '{'];

/// Expand `pattern`, resolving relative patterns against `working_dir`.
///
/// A base directory that does not exist yields no matches.
pub fn expand_glob(pattern: &str, working_dir: &Path) -> EtResult<Vec<String>> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| Error::parse(pattern, e.to_string()))?
        .compile_matcher();

    let (base, rest) = split_base(pattern);
    let root = resolve(working_dir, &base);

    if rest.is_empty() {
        // No metacharacters: the pattern names a single path
        return Ok(if root.is_file() {
            vec![pattern.to_string()]
        } else {
            Vec::new()
        });
    }
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let max_depth = if rest.iter().any(|c| c.contains("**")) {
        None
    } else {
        Some(rest.len())
    };

    let walker = WalkBuilder::new(&root)
        .standard_filters(false)
        .follow_links(true)
        .max_depth(max_depth)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut matches = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(pattern, error = %err, "skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(&root) else {
            continue;
        };
        let candidate = display_path(&base, rel);
        if matcher.is_match(&candidate) {
            matches.push(candidate);
        }
    }

    Ok(matches)
}

/// Split a pattern into its literal leading directory and the remaining
/// components (starting at the first component with a metacharacter).
fn split_base(pattern: &str) -> (String, Vec<&str>) {
    let components: Vec<&str> = pattern.split('/').collect();
    let first_meta = components
        .iter()
        .position(|c| c.contains(META_CHARS))
        .unwrap_or(components.len());

    let literal = &components[..first_meta];
    let base = match literal {
        [] => String::new(),
        // "/" for absolute patterns like "/*.conf"
        [""] => "/".to_string(),
        _ => literal.join("/"),
    };
    (base, components[first_meta..].to_vec())
}

fn resolve(working_dir: &Path, base: &str) -> PathBuf {
    if base.is_empty() {
        working_dir.to_path_buf()
    } else {
        crate::domain::ports::fetcher::resolve(working_dir, base)
    }
}

fn display_path(base: &str, rel: &Path) -> String {
    let rel = rel.to_string_lossy();
    match base {
        "" => rel.into_owned(),
        "/" => format!("/{rel}"),
        _ if base.ends_with('/') => format!("{base}{rel}"),
        _ => format!("{base}/{rel}"),
    }
}
