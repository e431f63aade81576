//! Expansion of the response files attached to a unit

use std::path::Path;

use indexmap::IndexMap;

use crate::host::{CompilableUnit, CompilationHost, ResponseFileData};

/// Parse every response file of `unit`, keyed by response file path.
///
/// Each file is parsed on its own; entries with errors are kept alongside the
/// clean ones, so callers must check `errors` per entry. Every error is logged
/// with the file it came from.
pub fn expand_response_files(
    host: &dyn CompilationHost,
    unit: Option<&CompilableUnit>,
    project_directory: &Path,
) -> IndexMap<String, ResponseFileData> {
    let Some(unit) = unit else {
        return IndexMap::new();
    };

    let options = &unit.compiler_options;
    if options.response_files.is_empty() {
        return IndexMap::new();
    }

    let system_reference_directories = host.system_assembly_directories(options.api_compatibility_level);

    let response_files: IndexMap<String, ResponseFileData> = options
        .response_files
        .iter()
        .map(|path| {
            let data = host.parse_response_file(path, project_directory, &system_reference_directories);
            (path.clone(), data)
        })
        .collect();

    for (path, data) in response_files.iter().filter(|(_, data)| data.has_errors()) {
        for error in &data.errors {
            log::error!("{} Parse Error : {}", path, error);
        }
    }

    response_files
}
