//! Filesystem-backed host for a Unity project
//!
//! The editor side exports its compilation graph to
//! `Library/UnityCode/compilation.json` after every script compilation. This
//! host reads that snapshot, resolves packages through
//! `Packages/packages-lock.json` and parses response files from disk.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexSet;
use serde::Deserialize;

use crate::error::{IoContext, ProjectGenError, Result};
use crate::host::{
    ApiCompatibilityLevel, AssembliesType, AssemblyFlags, CompilableUnit, CompilationHost,
    CompilerOptions, ResponseFileData,
};
use crate::package_origin::{PackageInfo, PackageSource, resolve_package_root};
use crate::rsp_parser;

/// Location of the compilation snapshot, relative to the project root
pub const SNAPSHOT_RELATIVE_PATH: &str = "Library/UnityCode/compilation.json";

/// Compilation snapshot written by the editor
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompilationSnapshot {
    editor_assemblies: Vec<UnitRecord>,
    player_assemblies: Vec<UnitRecord>,
    system_assembly_directories: HashMap<ApiCompatibilityLevel, Vec<PathBuf>>,
    /// Script asset path to owning assembly file name
    script_assemblies: HashMap<String, String>,
    roslyn_analyzers: Vec<String>,
}

/// One unit as serialized by the editor, references by name
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UnitRecord {
    name: String,
    output_path: String,
    source_files: Vec<String>,
    defines: Vec<String>,
    assembly_references: Vec<String>,
    compiled_assembly_references: Vec<String>,
    flags: u32,
    compiler_options: CompilerOptions,
    root_namespace: String,
}

/// Package information from packages-lock.json
#[derive(Debug, Deserialize)]
struct PackageLockFile {
    #[serde(default)]
    dependencies: HashMap<String, PackageInfoInPackageLock>,
}

#[derive(Debug, Deserialize)]
struct PackageInfoInPackageLock {
    #[serde(default)]
    version: String,
    #[serde(default)]
    source: String,
}

/// Host backed by a Unity project directory.
///
/// The snapshot is read once and shared by every enumeration and lookup until
/// [`CompilationHost::reset_snapshot`], so one generation pass never mixes two
/// exports.
#[derive(Debug)]
pub struct UnityProjectHost {
    project_root: PathBuf,
    snapshot_path: PathBuf,
    packages_lock_path: PathBuf,
    snapshot: RefCell<Option<Rc<CompilationSnapshot>>>,
}

impl UnityProjectHost {
    pub fn new(project_root: PathBuf) -> Self {
        let snapshot_path = project_root.join(SNAPSHOT_RELATIVE_PATH);
        let packages_lock_path = project_root.join("Packages").join("packages-lock.json");

        Self {
            project_root,
            snapshot_path,
            packages_lock_path,
            snapshot: RefCell::new(None),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    fn load_snapshot(&self) -> Result<CompilationSnapshot> {
        let content = fs::read_to_string(&self.snapshot_path).map_err(|e| ProjectGenError::Snapshot {
            path: self.snapshot_path.clone(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ProjectGenError::Snapshot {
            path: self.snapshot_path.clone(),
            message: e.to_string(),
        })
    }

    /// Cached snapshot, read from disk on first use. Failed reads are not cached.
    fn snapshot(&self) -> Result<Rc<CompilationSnapshot>> {
        if let Some(snapshot) = self.snapshot.borrow().as_ref() {
            return Ok(snapshot.clone());
        }

        let snapshot = Rc::new(self.load_snapshot()?);
        *self.snapshot.borrow_mut() = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Snapshot for lookups that degrade to "nothing known" instead of failing
    fn snapshot_or_default(&self) -> Rc<CompilationSnapshot> {
        self.snapshot().unwrap_or_else(|e| {
            log::warn!("{}", e);
            Rc::new(CompilationSnapshot::default())
        })
    }

    fn load_packages_lock(&self) -> Option<PackageLockFile> {
        if !self.packages_lock_path.exists() {
            return None;
        }

        let parsed: std::result::Result<PackageLockFile, String> = fs::read_to_string(&self.packages_lock_path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_json::from_str(&content).map_err(|e| e.to_string()));

        match parsed {
            Ok(lock) => Some(lock),
            Err(e) => {
                log::warn!("Failed to load packages-lock.json: {}", e);
                None
            }
        }
    }
}

impl CompilationHost for UnityProjectHost {
    fn get_assemblies(&self, assemblies_type: AssembliesType) -> Result<Vec<Arc<CompilableUnit>>> {
        let snapshot = self.snapshot()?;
        let records = match assemblies_type {
            AssembliesType::Editor => &snapshot.editor_assemblies,
            AssembliesType::Player => &snapshot.player_assemblies,
        };

        build_unit_graph(records)
    }

    fn parse_response_file(
        &self,
        response_file_path: &str,
        project_directory: &Path,
        system_reference_directories: &[PathBuf],
    ) -> ResponseFileData {
        rsp_parser::parse_response_file(response_file_path, project_directory, system_reference_directories)
    }

    fn system_assembly_directories(&self, level: ApiCompatibilityLevel) -> Vec<PathBuf> {
        self.snapshot_or_default()
            .system_assembly_directories
            .get(&level)
            .cloned()
            .unwrap_or_default()
    }

    fn find_package(&self, package_root: &str) -> Option<PackageInfo> {
        let lock = self.load_packages_lock()?;

        lock.dependencies.into_iter().find_map(|(name, entry)| {
            let root = resolve_package_root(&format!("Packages/{}", name))?;
            (root == package_root).then(|| PackageInfo {
                asset_path: format!("Packages/{}", name),
                name,
                version: entry.version,
                source: PackageSource::from_lock_source(&entry.source),
            })
        })
    }

    fn all_asset_paths(&self) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        for top in ["Assets", "Packages"] {
            let dir = self.project_root.join(top);
            if dir.is_dir() {
                collect_asset_paths(&self.project_root, &dir, &mut paths)?;
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn assembly_name_from_script_path(&self, path: &str) -> Option<String> {
        self.snapshot_or_default().script_assemblies.get(path).cloned()
    }

    fn roslyn_analyzer_paths(&self) -> Vec<String> {
        self.snapshot_or_default().roslyn_analyzers.clone()
    }

    fn reset_snapshot(&self) {
        self.snapshot.borrow_mut().take();
    }
}

fn collect_asset_paths(project_root: &Path, dir: &Path, paths: &mut Vec<String>) -> Result<()> {
    let entries = fs::read_dir(dir).with_io_context("Failed to read asset directory")?;

    for entry in entries {
        let path = entry.with_io_context("Failed to read asset directory entry")?.path();
        if path.is_dir() {
            collect_asset_paths(project_root, &path, paths)?;
        } else if path.extension().and_then(|s| s.to_str()) != Some("meta") {
            if let Ok(relative) = path.strip_prefix(project_root) {
                paths.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
    }

    Ok(())
}

/// Turn name-linked records into shared unit handles, in record order
fn build_unit_graph(records: &[UnitRecord]) -> Result<Vec<Arc<CompilableUnit>>> {
    let mut builder = UnitGraphBuilder {
        records: records.iter().map(|r| (r.name.as_str(), r)).collect(),
        built: HashMap::new(),
        visiting: HashSet::new(),
    };

    records
        .iter()
        .map(|record| builder.build(&record.name))
        .collect::<Result<Vec<_>>>()
        .map(|units| units.into_iter().flatten().collect())
}

struct UnitGraphBuilder<'a> {
    records: HashMap<&'a str, &'a UnitRecord>,
    built: HashMap<String, Arc<CompilableUnit>>,
    visiting: HashSet<String>,
}

impl UnitGraphBuilder<'_> {
    fn build(&mut self, name: &str) -> Result<Option<Arc<CompilableUnit>>> {
        if let Some(unit) = self.built.get(name) {
            return Ok(Some(unit.clone()));
        }
        let Some(record) = self.records.get(name).copied() else {
            return Ok(None);
        };
        if !self.visiting.insert(name.to_string()) {
            return Err(ProjectGenError::ReferenceCycle {
                assembly: name.to_string(),
            });
        }

        let mut assembly_references = Vec::with_capacity(record.assembly_references.len());
        for reference in &record.assembly_references {
            match self.build(reference)? {
                Some(unit) => assembly_references.push(unit),
                None => log::warn!("Assembly '{}' references unknown assembly '{}'", record.name, reference),
            }
        }

        let unit = Arc::new(CompilableUnit {
            name: record.name.clone(),
            output_path: record.output_path.clone(),
            source_files: record.source_files.clone(),
            defines: record.defines.iter().cloned().collect::<IndexSet<_>>(),
            assembly_references,
            compiled_assembly_references: record.compiled_assembly_references.clone(),
            flags: AssemblyFlags::from_bits(record.flags),
            compiler_options: record.compiler_options.clone(),
            root_namespace: record.root_namespace.clone(),
        });

        self.visiting.remove(name);
        self.built.insert(name.to_string(), unit.clone());
        Ok(Some(unit))
    }
}

#[cfg(test)]
#[path = "unity_host_tests.rs"]
mod tests;
