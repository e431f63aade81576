//! Memoized package lookups keyed by package root

use std::collections::HashMap;
use std::sync::Arc;

use crate::host::CompilationHost;
use crate::package_origin::{PackageInfo, resolve_package_root};

/// Cache of host package lookups.
///
/// Misses are cached too, so an asset path under an unknown package root only
/// costs one host query until [`PackageInfoCache::reset`].
#[derive(Debug, Default)]
pub struct PackageInfoCache {
    cache: HashMap<String, Option<Arc<PackageInfo>>>,
}

impl PackageInfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the package that owns `asset_path`, if any
    pub fn find_for_asset_path(
        &mut self,
        host: &dyn CompilationHost,
        asset_path: &str,
    ) -> Option<Arc<PackageInfo>> {
        let package_root = resolve_package_root(asset_path)?;

        if let Some(cached) = self.cache.get(&package_root) {
            return cached.clone();
        }

        let result = host.find_package(&package_root).map(Arc::new);
        self.cache.insert(package_root, result.clone());
        result
    }

    /// Drop every cached lookup. Call after the host's package set changed.
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
