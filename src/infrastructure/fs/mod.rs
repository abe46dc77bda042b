//! File System Implementations
//!
//! Local disk helpers used by the fetch and render stages.

mod local;

pub use local::LocalFs;
