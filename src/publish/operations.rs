//! Package manager / registry client trait.

use crate::env_config::SecretToken;
use crate::error::Result;
use semver::Version;
use std::future::Future;
use url::Url;

/// Trait defining the package-manager capabilities a release needs
pub trait PackageManager {
    /// Clean, lockfile-exact dependency install
    fn clean_install(&self) -> impl Future<Output = Result<()>>;

    /// Run the package's test command
    fn run_tests(&self) -> impl Future<Output = Result<()>>;

    /// Run a named manifest script
    fn run_script(&self, name: &str) -> impl Future<Output = Result<()>>;

    /// Normalize the manifest in place
    fn normalize_manifest(&self) -> impl Future<Output = Result<()>>;

    /// Write `version` into the manifest without creating a tag
    fn set_version(&self, version: &Version) -> impl Future<Output = Result<()>>;

    /// Publish to the default registry with public access
    fn publish_public(&self, token: &SecretToken) -> impl Future<Output = Result<()>>;

    /// Publish to an alternate registry
    fn publish_to_registry(
        &self,
        registry: &Url,
        token: &SecretToken,
    ) -> impl Future<Output = Result<()>>;

    /// Version the registry reports for `name@version`; `None` when not (yet) visible
    fn published_version(
        &self,
        name: &str,
        version: &Version,
    ) -> impl Future<Output = Result<Option<String>>>;

    /// Human-readable registry metadata for `name`
    fn package_metadata(&self, name: &str) -> impl Future<Output = Result<String>>;
}
