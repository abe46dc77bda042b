//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Creating the resolver with infrastructure dependencies
//!
//! ## Structure
//!
//! - `cli` - Flag definitions
//! - `factory` - Creates the resolver with proper dependencies (dependency injection)

pub mod cli;
pub mod factory;

pub use cli::Cli;
pub use factory::create_resolver;
