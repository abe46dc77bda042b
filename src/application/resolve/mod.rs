//! Resolve Module
//!
//! Sequences a whole run: manifests, explicit directories, globs and files
//! are resolved into pairs, then directories are fetched, then files, then
//! every file destination is rendered in place.
//!
//! ## Structure
//!
//! - `options` - The run request (`ResolveRequest`)
//! - `result` - Run counters (`ResolveSummary`)
//! - `use_case` - The orchestrator (`Resolver`)
//!
//! ## Usage
//!
//! ```ignore
//! use ecs_template::application::{ResolveRequest, Resolver};
//!
//! let resolver = Resolver::new(fetcher, engine, working_dir);
//! let summary = resolver.run(&ResolveRequest::default().with_globs(["conf/*.tmpl"]))?;
//! ```

mod options;
mod result;
mod use_case;

pub use options::ResolveRequest;
pub use result::ResolveSummary;
pub use use_case::Resolver;
