//! Package metadata read from `package.json`.
//!
//! Only the fields the release needs are extracted; the document itself is
//! rewritten by npm (`npm pkg fix`, `npm version`), never by this crate.

use crate::error::{PackageError, Result};
use serde_json::Value;
use std::path::Path;

/// File name of the npm manifest
pub const MANIFEST_FILE: &str = "package.json";

/// Package metadata extracted from package.json
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    /// Package name, possibly scoped (`@scope/name`)
    pub name: String,
    /// Raw version string, validated separately
    pub version: String,
    /// Whether `scripts.build` is declared
    pub has_build_script: bool,
}

impl PackageManifest {
    /// Whether the name carries an npm scope
    pub fn is_scoped(&self) -> bool {
        self.name.starts_with('@') && self.name.contains('/')
    }

    /// Scope including the leading `@`, if any
    pub fn scope(&self) -> Option<&str> {
        if !self.is_scoped() {
            return None;
        }
        self.name.split('/').next()
    }
}

/// Load manifest from package.json in `dir`
pub fn load_manifest(dir: &Path) -> Result<PackageManifest> {
    let path = dir.join(MANIFEST_FILE);
    let content = std::fs::read_to_string(&path).map_err(|e| PackageError::ManifestUnreadable {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    parse_manifest(&content, &path)
}

fn parse_manifest(content: &str, path: &Path) -> Result<PackageManifest> {
    let document: Value =
        serde_json::from_str(content).map_err(|e| PackageError::ManifestUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let string_field = |field: &str| -> Result<String> {
        document
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                PackageError::MissingField {
                    field: field.to_string(),
                }
                .into()
            })
    };

    let has_build_script = document
        .get("scripts")
        .and_then(|scripts| scripts.get("build"))
        .and_then(Value::as_str)
        .is_some_and(|script| !script.trim().is_empty());

    Ok(PackageManifest {
        name: string_field("name")?,
        version: string_field("version")?,
        has_build_script,
    })
}
