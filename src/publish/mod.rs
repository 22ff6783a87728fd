//! Package manager and registry operations.
//!
//! The pipeline depends on the [`PackageManager`] trait; [`NpmCli`] is the
//! production implementation.

mod npm;
mod operations;

pub use npm::NpmCli;
pub use operations::PackageManager;
