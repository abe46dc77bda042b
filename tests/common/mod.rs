//! Common test utilities for ecs-template CLI tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated working directory and config home
//! - Fixtures: Reusable template and manifest content

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
