//! Host build system boundary
//!
//! The Unity editor owns the real compilation graph. Everything this crate
//! knows about it comes through [`CompilationHost`] as owned, immutable values.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Result;
use crate::package_origin::PackageInfo;

/// Which compilation partition to enumerate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssembliesType {
    /// Units compiled for the editor (carry the `UNITY_EDITOR` define)
    Editor,
    /// Units compiled for player builds
    Player,
}

/// .NET API surface a unit compiles against, named the way Unity names them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ApiCompatibilityLevel {
    #[serde(rename = "NET_2_0")]
    Net20,
    #[serde(rename = "NET_2_0_Subset")]
    Net20Subset,
    #[serde(rename = "NET_4_6")]
    Net46,
    #[serde(rename = "NET_Web")]
    NetWeb,
    #[serde(rename = "NET_Micro")]
    NetMicro,
    #[serde(rename = "NET_Standard_2_0")]
    NetStandard20,
    #[default]
    #[serde(rename = "NET_Standard")]
    NetStandard,
    #[serde(rename = "NET_Unity_4_8")]
    NetUnity48,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CodeOptimization {
    #[default]
    Debug,
    Release,
}

/// Assembly flags as reported by the host, carried through opaquely
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssemblyFlags(u32);

impl AssemblyFlags {
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }
}

/// Compiler options attached to a unit, mirroring Unity's `ScriptCompilerOptions`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    pub allow_unsafe_code: bool,
    pub code_optimization: CodeOptimization,
    pub api_compatibility_level: ApiCompatibilityLevel,
    /// Response files, as paths relative to the project directory
    pub response_files: Vec<String>,
    pub roslyn_analyzer_dll_paths: Vec<String>,
    pub roslyn_analyzer_ruleset_path: Option<String>,
    pub additional_compiler_arguments: Vec<String>,
}

/// One independently compiled group of source files.
///
/// Values are snapshots: the host hands out fresh instances on every
/// enumeration and nothing in this crate mutates them afterwards. References to
/// other units are shared handles, not copies.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompilableUnit {
    pub name: String,
    pub output_path: String,
    pub source_files: Vec<String>,
    pub defines: IndexSet<String>,
    #[serde(serialize_with = "serialize_unit_names")]
    pub assembly_references: Vec<Arc<CompilableUnit>>,
    pub compiled_assembly_references: Vec<String>,
    pub flags: AssemblyFlags,
    pub compiler_options: CompilerOptions,
    pub root_namespace: String,
}

impl CompilableUnit {
    /// Copy of this unit with a different output path. References stay shared.
    pub fn with_output_path(&self, output_path: impl Into<String>) -> Self {
        Self {
            output_path: output_path.into(),
            ..self.clone()
        }
    }

    pub fn has_define(&self, define: &str) -> bool {
        self.defines.contains(define)
    }
}

/// Serialize a list of unit handles as their names, so serialized graphs stay flat
pub fn serialize_unit_names<S>(units: &[Arc<CompilableUnit>], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(units.iter().map(|unit| unit.name.as_str()))
}

/// Arguments recovered from one response file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseFileData {
    pub defines: Vec<String>,
    pub full_path_references: Vec<String>,
    pub other_arguments: Vec<String>,
    pub unsafe_code: bool,
    pub errors: Vec<String>,
}

impl ResponseFileData {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Everything this crate consumes from the host build system
pub trait CompilationHost {
    /// Enumerate compilable units of one partition. Failure aborts the pass.
    fn get_assemblies(&self, assemblies_type: AssembliesType) -> Result<Vec<Arc<CompilableUnit>>>;

    /// Parse one response file. Problems are reported in `errors`, never as `Err`.
    fn parse_response_file(
        &self,
        response_file_path: &str,
        project_directory: &Path,
        system_reference_directories: &[PathBuf],
    ) -> ResponseFileData;

    fn system_assembly_directories(&self, level: ApiCompatibilityLevel) -> Vec<PathBuf>;

    /// Look up the package rooted at `package_root` (e.g. `packages/com.unity.ugui`)
    fn find_package(&self, package_root: &str) -> Option<PackageInfo>;

    fn all_asset_paths(&self) -> Result<Vec<String>>;

    fn assembly_name_from_script_path(&self, path: &str) -> Option<String>;

    fn roslyn_analyzer_paths(&self) -> Vec<String>;

    /// Forget any host-side state captured since the last enumeration
    fn reset_snapshot(&self) {}
}
