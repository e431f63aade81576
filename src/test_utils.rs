//! Test utilities shared across the codebase

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexSet;

use crate::config_store::{ConfigStore, MemoryConfigStore};
use crate::error::{ProjectGenError, Result};
use crate::host::{
    ApiCompatibilityLevel, AssembliesType, CompilableUnit, CompilationHost, CompilerOptions,
    ResponseFileData,
};
use crate::package_origin::{PackageInfo, PackageSource};

/// Build a unit with the given sources and defines and otherwise default fields
pub fn make_unit(name: &str, source_files: &[&str], defines: &[&str]) -> CompilableUnit {
    CompilableUnit {
        name: name.to_string(),
        output_path: format!("Library/ScriptAssemblies/{}/", name),
        source_files: source_files.iter().map(|s| s.to_string()).collect(),
        defines: defines.iter().map(|s| s.to_string()).collect::<IndexSet<_>>(),
        assembly_references: Vec::new(),
        compiled_assembly_references: Vec::new(),
        flags: Default::default(),
        compiler_options: CompilerOptions::default(),
        root_namespace: String::new(),
    }
}

/// In-memory host with call counters
#[derive(Default)]
pub struct FakeHost {
    editor_units: Vec<Arc<CompilableUnit>>,
    player_units: Vec<Arc<CompilableUnit>>,
    packages: HashMap<String, PackageInfo>,
    response_files: HashMap<String, ResponseFileData>,
    system_directories: HashMap<ApiCompatibilityLevel, Vec<PathBuf>>,
    script_assemblies: HashMap<String, String>,
    extra_assets: Vec<String>,
    fail_enumeration: Cell<bool>,
    package_queries: Cell<usize>,
    enumerations: RefCell<Vec<AssembliesType>>,
    parsed_with: RefCell<Vec<(String, PathBuf, Vec<PathBuf>)>>,
    snapshot_resets: Cell<usize>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_editor_unit(&mut self, unit: CompilableUnit) -> Arc<CompilableUnit> {
        let unit = Arc::new(unit);
        self.editor_units.push(unit.clone());
        unit
    }

    pub fn add_player_unit(&mut self, unit: CompilableUnit) -> Arc<CompilableUnit> {
        let unit = Arc::new(unit);
        self.player_units.push(unit.clone());
        unit
    }

    pub fn add_package(&mut self, name: &str, source: PackageSource) {
        self.packages.insert(
            format!("packages/{}", name.to_lowercase()),
            PackageInfo {
                name: name.to_string(),
                version: "1.0.0".to_string(),
                source,
                asset_path: format!("Packages/{}", name),
            },
        );
    }

    pub fn add_response_file(&mut self, path: &str, data: ResponseFileData) {
        self.response_files.insert(path.to_string(), data);
    }

    pub fn add_system_directory(&mut self, level: ApiCompatibilityLevel, dir: &str) {
        self.system_directories.entry(level).or_default().push(PathBuf::from(dir));
    }

    pub fn add_script(&mut self, script_path: &str, assembly_name: &str) {
        self.script_assemblies.insert(script_path.to_string(), assembly_name.to_string());
    }

    /// Asset that belongs to no unit, e.g. a `.uxml` file
    pub fn add_asset(&mut self, path: &str) {
        self.extra_assets.push(path.to_string());
    }

    pub fn set_fail_enumeration(&self, fail: bool) {
        self.fail_enumeration.set(fail);
    }

    pub fn package_queries(&self) -> usize {
        self.package_queries.get()
    }

    pub fn enumerations(&self) -> Vec<AssembliesType> {
        self.enumerations.borrow().clone()
    }

    pub fn snapshot_resets(&self) -> usize {
        self.snapshot_resets.get()
    }

    /// Every `(response file, project dir, system dirs)` the host was asked to parse
    pub fn parsed_with(&self) -> Vec<(String, PathBuf, Vec<PathBuf>)> {
        self.parsed_with.borrow().clone()
    }
}

impl CompilationHost for FakeHost {
    fn get_assemblies(&self, assemblies_type: AssembliesType) -> Result<Vec<Arc<CompilableUnit>>> {
        self.enumerations.borrow_mut().push(assemblies_type);
        if self.fail_enumeration.get() {
            return Err(ProjectGenError::Host {
                message: "compilation pipeline unavailable".to_string(),
            });
        }

        Ok(match assemblies_type {
            AssembliesType::Editor => self.editor_units.clone(),
            AssembliesType::Player => self.player_units.clone(),
        })
    }

    fn parse_response_file(
        &self,
        response_file_path: &str,
        project_directory: &Path,
        system_reference_directories: &[PathBuf],
    ) -> ResponseFileData {
        self.parsed_with.borrow_mut().push((
            response_file_path.to_string(),
            project_directory.to_path_buf(),
            system_reference_directories.to_vec(),
        ));

        self.response_files
            .get(response_file_path)
            .cloned()
            .unwrap_or_else(|| ResponseFileData {
                errors: vec![format!("Response file not found: {}", response_file_path)],
                ..Default::default()
            })
    }

    fn system_assembly_directories(&self, level: ApiCompatibilityLevel) -> Vec<PathBuf> {
        self.system_directories.get(&level).cloned().unwrap_or_default()
    }

    fn find_package(&self, package_root: &str) -> Option<PackageInfo> {
        self.package_queries.set(self.package_queries.get() + 1);
        self.packages.get(package_root).cloned()
    }

    fn all_asset_paths(&self) -> Result<Vec<String>> {
        let mut paths: Vec<String> = self
            .editor_units
            .iter()
            .chain(self.player_units.iter())
            .flat_map(|unit| unit.source_files.iter().cloned())
            .chain(self.extra_assets.iter().cloned())
            .collect();
        paths.sort();
        paths.dedup();
        Ok(paths)
    }

    fn assembly_name_from_script_path(&self, path: &str) -> Option<String> {
        self.script_assemblies.get(path).cloned()
    }

    fn roslyn_analyzer_paths(&self) -> Vec<String> {
        vec!["Assets/Analyzers/Custom.Analyzers.dll".to_string()]
    }

    fn reset_snapshot(&self) {
        self.snapshot_resets.set(self.snapshot_resets.get() + 1);
    }
}

/// Config store whose contents stay observable after being boxed into a policy
#[derive(Debug, Default, Clone)]
pub struct SharedConfigStore {
    inner: Rc<RefCell<MemoryConfigStore>>,
}

impl SharedConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: i64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryConfigStore::with_value(key, value))),
        }
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.inner.borrow().get(key)
    }

    pub fn boxed(&self) -> Box<dyn ConfigStore> {
        Box::new(self.clone())
    }
}

impl ConfigStore for SharedConfigStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.inner.borrow().get_int(key, default)
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<()> {
        self.inner.borrow_mut().set_int(key, value)
    }
}
