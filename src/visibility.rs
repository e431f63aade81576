//! Which package origins and partitions end up in generated projects

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config_store::ConfigStore;
use crate::host::CompilationHost;
use crate::package_cache::PackageInfoCache;
use crate::package_origin::PackageSource;

/// Preference key the flags are persisted under
pub const PROJECT_GENERATION_FLAG_KEY: &str = "unity_project_generation_flag";

/// Project generation flags (bitflags-style)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectGenerationFlags(u32);

impl ProjectGenerationFlags {
    /// Nothing beyond first-party editor code
    pub const NONE: Self = Self(0);
    pub const EMBEDDED: Self = Self(1 << 0);
    pub const LOCAL: Self = Self(1 << 1);
    pub const REGISTRY: Self = Self(1 << 2);
    pub const GIT: Self = Self(1 << 3);
    pub const BUILT_IN: Self = Self(1 << 4);
    pub const UNKNOWN: Self = Self(1 << 5);
    /// Also generate projects for player-targeted units
    pub const PLAYER_ASSEMBLIES: Self = Self(1 << 6);
    pub const LOCAL_TARBALL: Self = Self(1 << 7);

    /// Used when nothing has been persisted yet
    pub const DEFAULT: Self = Self(Self::EMBEDDED.0 | Self::LOCAL.0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// The flag that admits packages of the given origin
    pub const fn for_source(source: PackageSource) -> Self {
        match source {
            PackageSource::Embedded => Self::EMBEDDED,
            PackageSource::Registry => Self::REGISTRY,
            PackageSource::BuiltIn => Self::BUILT_IN,
            PackageSource::Local => Self::LOCAL,
            PackageSource::Git => Self::GIT,
            PackageSource::LocalTarball => Self::LOCAL_TARBALL,
            PackageSource::Unknown => Self::UNKNOWN,
        }
    }
}

impl std::ops::BitOr for ProjectGenerationFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for ProjectGenerationFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(ProjectGenerationFlags, &str); 8] = [
            (ProjectGenerationFlags::EMBEDDED, "Embedded"),
            (ProjectGenerationFlags::LOCAL, "Local"),
            (ProjectGenerationFlags::REGISTRY, "Registry"),
            (ProjectGenerationFlags::GIT, "Git"),
            (ProjectGenerationFlags::BUILT_IN, "BuiltIn"),
            (ProjectGenerationFlags::UNKNOWN, "Unknown"),
            (ProjectGenerationFlags::PLAYER_ASSEMBLIES, "PlayerAssemblies"),
            (ProjectGenerationFlags::LOCAL_TARBALL, "LocalTarball"),
        ];

        if self.is_empty() {
            return write!(f, "None");
        }

        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", names.join(" | "))
    }
}

/// Persisted visibility policy.
///
/// Loaded from the store once; every mutation writes back before returning.
pub struct ProjectVisibilityPolicy {
    flags: ProjectGenerationFlags,
    store: Box<dyn ConfigStore>,
}

impl ProjectVisibilityPolicy {
    pub fn load(store: Box<dyn ConfigStore>) -> Self {
        let default = i64::from(ProjectGenerationFlags::DEFAULT.bits());
        let stored = store.get_int(PROJECT_GENERATION_FLAG_KEY, default);
        let flags = match u32::try_from(stored) {
            Ok(bits) => ProjectGenerationFlags::from_bits(bits),
            Err(_) => {
                log::warn!("Ignoring invalid persisted project generation flags: {}", stored);
                ProjectGenerationFlags::DEFAULT
            }
        };

        Self { flags, store }
    }

    pub fn flags(&self) -> ProjectGenerationFlags {
        self.flags
    }

    pub fn has(&self, flag: ProjectGenerationFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn set_flags(&mut self, flags: ProjectGenerationFlags) {
        self.flags = flags;
        self.persist();
    }

    /// Flip `flag`: clear it when fully set, set it otherwise
    pub fn toggle(&mut self, flag: ProjectGenerationFlags) {
        let mut flags = self.flags;
        if flags.contains(flag) {
            flags.remove(flag);
        } else {
            flags.insert(flag);
        }
        self.set_flags(flags);
    }

    pub fn reset(&mut self) {
        self.set_flags(ProjectGenerationFlags::NONE);
    }

    /// Whether packages of this origin are included
    pub fn is_source_visible(&self, source: PackageSource) -> bool {
        self.flags.contains(ProjectGenerationFlags::for_source(source))
    }

    /// Whether the unit owning `path` should be part of generated projects.
    ///
    /// Paths outside any package are always visible.
    pub fn is_visible(&self, cache: &mut PackageInfoCache, host: &dyn CompilationHost, path: &str) -> bool {
        if path.trim().is_empty() {
            return true;
        }

        match cache.find_for_asset_path(host, path) {
            Some(package) => self.is_source_visible(package.source),
            None => true,
        }
    }

    fn persist(&mut self) {
        let bits = i64::from(self.flags.bits());
        if let Err(e) = self.store.set_int(PROJECT_GENERATION_FLAG_KEY, bits) {
            log::error!("Failed to persist project generation flags {}: {}", self.flags, e);
        }
    }
}

impl fmt::Debug for ProjectVisibilityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectVisibilityPolicy")
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "visibility_tests.rs"]
mod tests;
