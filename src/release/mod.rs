//! Release orchestration.
//!
//! [`ReleasePipeline`] runs the release steps strictly in order against a
//! [`VersionControl`](crate::git::VersionControl) and a
//! [`PackageManager`](crate::publish::PackageManager), then writes the
//! report whether or not a step failed.

mod context;
mod phases;
mod pipeline;
pub mod retry;

pub use context::ReleaseContext;
pub use pipeline::{DEFAULT_REQUIRED_TOOLS, ReleasePipeline, report_early_failure};
pub use retry::{RetryPolicy, retry_until};
