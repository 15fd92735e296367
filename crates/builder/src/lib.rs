//! Build SpiderMonkey static libraries for distribution.
//!
//! The pipeline lives in [`builder`]; the `build-spidermonkey` binary is a
//! thin CLI over [`builder::run`].

pub mod builder;

pub use builder::error::{BuildError, Result};
pub use builder::{run, BuildFlags, BuildPlan, BuildReport};
