//! Configuration loading

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, EtResult};

use super::types::Config;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "ECS_TEMPLATE_CONFIG";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> EtResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| Error::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| Error::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Resolve the config file to use and load it with env overrides applied.
///
/// An explicitly named file must exist; the user config is optional.
pub fn discover(explicit: Option<&Path>) -> EtResult<(Config, Vec<ConfigWarning>)> {
    let explicit = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    let (config, warnings) = match explicit {
        Some(path) => load_with_warnings(&path)?,
        None => match user_config_path().filter(|p| p.exists()) {
            Some(path) => load_with_warnings(&path)?,
            None => (Config::default(), Vec::new()),
        },
    };

    Ok((config.with_env_overrides(), warnings))
}

/// Apply environment variable overrides, reading variables through `lookup`
pub fn with_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    // ECS_TEMPLATE_QUIET
    if let Some(val) = lookup("ECS_TEMPLATE_QUIET") {
        config.output.quiet = is_truthy(&val);
    }

    // ECS_TEMPLATE_AWS_BIN
    if let Some(bin) = lookup("ECS_TEMPLATE_AWS_BIN").filter(|v| !v.is_empty()) {
        config.aws.binary = bin;
    }

    // AWS_REGION takes precedence over AWS_DEFAULT_REGION, as in the AWS CLI
    if let Some(region) = lookup("AWS_REGION")
        .or_else(|| lookup("AWS_DEFAULT_REGION"))
        .filter(|v| !v.is_empty())
    {
        config.aws.region = Some(region);
    }

    if let Some(profile) = lookup("AWS_PROFILE").filter(|v| !v.is_empty()) {
        config.aws.profile = Some(profile);
    }

    // ECS_TEMPLATE_HTTP_TIMEOUT (seconds)
    if let Some(timeout) = lookup("ECS_TEMPLATE_HTTP_TIMEOUT").and_then(|v| v.parse().ok()) {
        config.fetch.http_timeout_secs = timeout;
    }

    if let Some(endpoint) = lookup("ECS_TEMPLATE_S3_ENDPOINT").filter(|v| !v.is_empty()) {
        config.fetch.s3_endpoint = Some(endpoint);
    }

    config
}

fn is_truthy(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// `~/.config/ecs-template/config.toml` (platform config dir)
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ecs-template").join("config.toml"))
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "output",
        "quiet",
        "aws",
        "binary",
        "region",
        "profile",
        "page_size",
        "fetch",
        "http_timeout_secs",
        "s3_endpoint",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_key_finds_close_match() {
        assert_eq!(suggest_key("regoin"), Some("region".to_string()));
        assert_eq!(suggest_key("completely_unrelated"), None);
    }

    #[test]
    fn warning_display_includes_line_and_suggestion() {
        let warning = ConfigWarning {
            key: "regoin".to_string(),
            file: PathBuf::from("config.toml"),
            line: Some(3),
            suggestion: Some("region".to_string()),
        };
        assert_eq!(
            warning.to_string(),
            "unknown config key 'regoin' in config.toml:3 (did you mean 'region'?)"
        );
    }
}
