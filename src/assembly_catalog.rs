//! Catalog of the host's compilable units
//!
//! Enumerates editor units (and player units when enabled), keeps the
//! enumeration until [`AssemblyCatalog::reset_cache`], and filters it down to
//! the units a generation pass should produce projects for.

use std::sync::Arc;

use crate::editor_settings::EditorSettings;
use crate::error::Result;
use crate::host::{AssembliesType, CompilableUnit, CompilationHost};
use crate::package_cache::PackageInfoCache;
use crate::package_origin::PackageInfo;
use crate::visibility::{ProjectGenerationFlags, ProjectVisibilityPolicy};

/// Define present on every editor-compiled unit
pub const EDITOR_DEFINE: &str = "UNITY_EDITOR";
/// Appended to project names of player-only units
pub const PLAYER_PROJECT_SUFFIX: &str = ".Player";
/// Root of the intermediate output paths handed to the IDE
pub const OUTPUT_ROOT: &str = "Temp/Bin/Debug";

/// Host units plus the state deciding which of them get projects
pub struct AssemblyCatalog<H: CompilationHost> {
    host: H,
    policy: ProjectVisibilityPolicy,
    package_cache: PackageInfoCache,
    settings: EditorSettings,
    editor_units: Option<Vec<Arc<CompilableUnit>>>,
    player_units: Option<Vec<Arc<CompilableUnit>>>,
}

impl<H: CompilationHost> AssemblyCatalog<H> {
    pub fn new(host: H, policy: ProjectVisibilityPolicy, settings: EditorSettings) -> Self {
        Self {
            host,
            policy,
            package_cache: PackageInfoCache::new(),
            settings,
            editor_units: None,
            player_units: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn policy(&self) -> &ProjectVisibilityPolicy {
        &self.policy
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: EditorSettings) {
        self.settings = settings;
    }

    /// Units with at least one source file accepted by `predicate` and visible
    /// under the current policy.
    ///
    /// Editor units come first, followed by player units when
    /// [`ProjectGenerationFlags::PLAYER_ASSEMBLIES`] is set. A failed host
    /// enumeration is returned as an error and nothing is cached for it.
    pub fn get_units<F>(&mut self, predicate: F) -> Result<Vec<Arc<CompilableUnit>>>
    where
        F: Fn(&str) -> bool,
    {
        let include_player = self.policy.has(ProjectGenerationFlags::PLAYER_ASSEMBLIES);

        if self.editor_units.is_none() {
            self.editor_units = Some(materialize_units(&self.host, AssembliesType::Editor)?);
        }
        if include_player && self.player_units.is_none() {
            self.player_units = Some(materialize_units(&self.host, AssembliesType::Player)?);
        }

        let mut candidates: Vec<Arc<CompilableUnit>> = self.editor_units.iter().flatten().cloned().collect();
        if include_player {
            candidates.extend(self.player_units.iter().flatten().cloned());
        }

        let policy = &self.policy;
        let cache = &mut self.package_cache;
        let host = &self.host;
        candidates.retain(|unit| {
            unit.source_files
                .iter()
                .any(|file| predicate(file) && policy.is_visible(cache, host, file))
        });

        Ok(candidates)
    }

    /// Drop the cached enumerations and the host's snapshot. Call after the host recompiled.
    pub fn reset_cache(&mut self) {
        self.editor_units = None;
        self.player_units = None;
        self.host.reset_snapshot();
    }

    pub fn reset_package_info_cache(&mut self) {
        self.package_cache.reset();
    }

    /// Project name for a unit. When player units are generated, units compiled
    /// without the editor define get the player suffix so both variants of a
    /// unit get distinct projects.
    pub fn project_name<I, S>(&self, name: &str, defines: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.policy.has(ProjectGenerationFlags::PLAYER_ASSEMBLIES) {
            return name.to_string();
        }

        if defines.into_iter().any(|define| define.as_ref() == EDITOR_DEFINE) {
            name.to_string()
        } else {
            format!("{}{}", name, PLAYER_PROJECT_SUFFIX)
        }
    }

    pub fn is_visible(&mut self, path: &str) -> bool {
        self.policy.is_visible(&mut self.package_cache, &self.host, path)
    }

    pub fn find_for_asset_path(&mut self, asset_path: &str) -> Option<Arc<PackageInfo>> {
        self.package_cache.find_for_asset_path(&self.host, asset_path)
    }

    pub fn toggle_project_generation(&mut self, flag: ProjectGenerationFlags) {
        self.policy.toggle(flag);
        log::info!("Project generation flags are now {}", self.policy.flags());
    }

    pub fn reset_project_generation_flag(&mut self) {
        self.policy.reset();
        log::info!("Project generation flags reset");
    }

    pub fn assembly_name_from_script_path(&self, path: &str) -> Option<String> {
        self.host.assembly_name_from_script_path(path)
    }

    pub fn all_asset_paths(&self) -> Result<Vec<String>> {
        self.host.all_asset_paths()
    }

    pub fn roslyn_analyzer_paths(&self) -> Vec<String> {
        self.host.roslyn_analyzer_paths()
    }

    pub fn project_supported_extensions(&self) -> &[String] {
        &self.settings.user_extensions
    }

    pub fn project_generation_root_namespace(&self) -> &str {
        &self.settings.root_namespace
    }
}

/// Snapshot one partition, giving every unit a partition-specific output path
fn materialize_units<H: CompilationHost>(host: &H, assemblies_type: AssembliesType) -> Result<Vec<Arc<CompilableUnit>>> {
    let units = host.get_assemblies(assemblies_type)?;
    log::info!("Enumerated {} {:?} assemblies", units.len(), assemblies_type);

    Ok(units
        .iter()
        .map(|unit| {
            let output_path = match assemblies_type {
                AssembliesType::Editor => format!("{}/{}/", OUTPUT_ROOT, unit.name),
                AssembliesType::Player => format!("{}/{}/Player/", OUTPUT_ROOT, unit.name),
            };
            Arc::new(unit.with_output_path(output_path))
        })
        .collect())
}

#[cfg(test)]
#[path = "assembly_catalog_tests.rs"]
mod tests;
