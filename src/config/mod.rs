//! Configuration module for ecs-template
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (`ECS_TEMPLATE_*`, `AWS_REGION`, `AWS_PROFILE`)
//! 3. Explicit config file (`--config` or `ECS_TEMPLATE_CONFIG`)
//! 4. User config (`~/.config/ecs-template/config.toml`)
//! 5. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::ConfigWarning;
pub use types::{AwsConfig, Config, FetchConfig, OutputConfig};
