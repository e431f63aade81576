//! Immutable per-unit project descriptors handed to project file emitters

use std::path::Path;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::{Serialize, Serializer};

use crate::assembly_catalog::OUTPUT_ROOT;
use crate::editor_settings::EditorSettings;
use crate::host::{CompilableUnit, CompilationHost, CompilerOptions, ResponseFileData, serialize_unit_names};
use crate::response_files::expand_response_files;

/// Everything an emitter needs to write one project.
///
/// Every unit-derived field has a neutral value when there is no backing unit
/// (an assets-only part), so emitters never deal with missing data.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectPart {
    pub name: String,
    #[serde(serialize_with = "serialize_unit_name")]
    pub unit: Option<Arc<CompilableUnit>>,
    pub assets_project_part: String,
    pub output_path: String,
    pub source_files: Vec<String>,
    pub root_namespace: String,
    #[serde(serialize_with = "serialize_unit_names")]
    pub assembly_references: Vec<Arc<CompilableUnit>>,
    pub compiled_assembly_references: Vec<String>,
    pub defines: IndexSet<String>,
    pub compiler_options: CompilerOptions,
}

impl ProjectPart {
    /// Describe `unit` as a project called `name`.
    ///
    /// `name` and `assets_project_part` are used verbatim. The root namespace
    /// comes from the unit, or from `settings` for assets-only parts.
    pub fn build(
        name: impl Into<String>,
        unit: Option<Arc<CompilableUnit>>,
        assets_project_part: impl Into<String>,
        settings: &EditorSettings,
    ) -> Self {
        let name = name.into();
        let assets_project_part = assets_project_part.into();

        match unit {
            Some(unit) => Self {
                name,
                assets_project_part,
                output_path: unit.output_path.clone(),
                source_files: unit.source_files.clone(),
                root_namespace: unit.root_namespace.clone(),
                assembly_references: unit.assembly_references.clone(),
                compiled_assembly_references: unit.compiled_assembly_references.clone(),
                defines: unit.defines.clone(),
                compiler_options: unit.compiler_options.clone(),
                unit: Some(unit),
            },
            None => Self {
                name,
                unit: None,
                assets_project_part,
                output_path: OUTPUT_ROOT.to_string(),
                source_files: Vec::new(),
                root_namespace: settings.root_namespace.clone(),
                assembly_references: Vec::new(),
                compiled_assembly_references: Vec::new(),
                defines: IndexSet::new(),
                compiler_options: CompilerOptions::default(),
            },
        }
    }

    /// Parsed response files of the backing unit, empty for assets-only parts
    pub fn response_file_data(
        &self,
        host: &dyn CompilationHost,
        project_directory: &Path,
    ) -> IndexMap<String, ResponseFileData> {
        expand_response_files(host, self.unit.as_deref(), project_directory)
    }
}

fn serialize_unit_name<S>(unit: &Option<Arc<CompilableUnit>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match unit {
        Some(unit) => serializer.serialize_some(&unit.name),
        None => serializer.serialize_none(),
    }
}
