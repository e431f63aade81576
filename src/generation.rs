//! One generation pass: catalog units → project parts

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use quick_xml::escape::escape;
use serde::Serialize;

use crate::assembly_catalog::AssemblyCatalog;
use crate::error::Result;
use crate::file_filter::ProjectFileFilter;
use crate::host::{CompilationHost, ResponseFileData};
use crate::project_part::ProjectPart;
use crate::visibility::ProjectGenerationFlags;

/// A project part together with its parsed response files
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedProject {
    #[serde(flatten)]
    pub part: ProjectPart,
    pub response_files: IndexMap<String, ResponseFileData>,
}

/// Result of a generation pass, ready to hand to an emitter
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutput {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub flags: ProjectGenerationFlags,
    pub projects: Vec<GeneratedProject>,
}

/// Build the parts for every unit that should get a project.
///
/// Non-script assets that map to an assembly are attached to that assembly's
/// part; assets whose assembly produced no unit get an assets-only part.
pub fn generate_project_parts<H: CompilationHost>(catalog: &mut AssemblyCatalog<H>) -> Result<Vec<ProjectPart>> {
    let filter = ProjectFileFilter::new(catalog.project_supported_extensions());
    let units = catalog.get_units(|file| filter.is_supported_file(file))?;

    let mut assets_by_assembly: IndexMap<String, Vec<String>> = IndexMap::new();
    for asset in catalog.all_asset_paths()? {
        if ProjectFileFilter::is_script(&asset) || !filter.should_file_be_part_of_solution(catalog, &asset) {
            continue;
        }
        let Some(assembly) = catalog.assembly_name_from_script_path(&asset) else {
            continue;
        };
        let assembly = assembly.strip_suffix(".dll").unwrap_or(&assembly).to_string();
        assets_by_assembly.entry(assembly).or_default().push(asset);
    }

    let mut names = HashSet::new();
    let mut parts = Vec::with_capacity(units.len());
    for unit in units {
        let name = catalog.project_name(&unit.name, &unit.defines);
        if !names.insert(name.clone()) {
            log::warn!("Skipping duplicate project name '{}'", name);
            continue;
        }

        let assets = assets_by_assembly
            .shift_remove(&unit.name)
            .map(|files| render_assets_part(&files))
            .unwrap_or_default();
        parts.push(ProjectPart::build(name, Some(unit), assets, catalog.settings()));
    }

    for (assembly, files) in assets_by_assembly {
        if names.insert(assembly.clone()) {
            parts.push(ProjectPart::build(assembly, None, render_assets_part(&files), catalog.settings()));
        }
    }

    log::info!("Generated {} project parts", parts.len());
    Ok(parts)
}

/// Run a full pass and attach each part's response files
pub fn generate<H: CompilationHost>(catalog: &mut AssemblyCatalog<H>, project_directory: &Path) -> Result<GenerationOutput> {
    let parts = generate_project_parts(catalog)?;

    let projects = parts
        .into_iter()
        .map(|part| {
            let response_files = part.response_file_data(catalog.host(), project_directory);
            GeneratedProject { part, response_files }
        })
        .collect();

    Ok(GenerationOutput {
        generated_at: chrono::Utc::now(),
        flags: catalog.policy().flags(),
        projects,
    })
}

/// MSBuild item lines for non-script assets
fn render_assets_part(files: &[String]) -> String {
    files
        .iter()
        .map(|file| format!("    <None Include=\"{}\" />\n", escape(file.as_str())))
        .collect()
}

#[cfg(test)]
#[path = "generation_tests.rs"]
mod tests;
