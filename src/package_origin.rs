//! Package origin classification
//!
//! Asset paths under `Packages/` belong to a UPM package. Which package, and
//! where that package came from, decides whether its code is first-party
//! editable code or a read-only dependency.

use serde::{Deserialize, Serialize};

const PACKAGES_PREFIX: &str = "packages/";

/// Where a package physically comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageSource {
    /// Lives inside the project's `Packages` folder
    Embedded,
    /// Downloaded from a package registry
    Registry,
    /// Ships with the editor
    BuiltIn,
    /// Referenced from a local folder outside the project
    Local,
    /// Cloned from a git repository
    Git,
    /// Extracted from a local `.tgz`
    LocalTarball,
    Unknown,
}

impl PackageSource {
    /// Parse the `source` field of a `packages-lock.json` entry
    pub fn from_lock_source(source: &str) -> Self {
        match source {
            "embedded" => PackageSource::Embedded,
            "registry" => PackageSource::Registry,
            "builtin" => PackageSource::BuiltIn,
            "local" => PackageSource::Local,
            "git" => PackageSource::Git,
            "local-tarball" => PackageSource::LocalTarball,
            _ => PackageSource::Unknown,
        }
    }
}

/// A package the host knows about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub source: PackageSource,
    /// Asset path of the package root, e.g. `Packages/com.unity.ugui`
    pub asset_path: String,
}

/// Resolve the package root of an asset path.
///
/// Returns the lower-cased `packages/<name>` prefix, or `None` when the path
/// is not under `Packages/`.
pub fn resolve_package_root(asset_path: &str) -> Option<String> {
    let prefix = asset_path.get(..PACKAGES_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(PACKAGES_PREFIX) {
        return None;
    }

    let root = match asset_path[PACKAGES_PREFIX.len()..].find('/') {
        Some(separator) => &asset_path[..PACKAGES_PREFIX.len() + separator],
        None => asset_path,
    };

    Some(root.to_lowercase())
}
