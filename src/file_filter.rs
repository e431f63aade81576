//! Which files belong in generated projects

use std::path::Path;

use crate::assembly_catalog::AssemblyCatalog;
use crate::host::CompilationHost;

/// Non-script files the IDE should still see
const BUILTIN_EXTENSIONS: &[&str] = &[
    "uxml", "uss", "shader", "compute", "cginc", "hlsl", "glslinc", "template", "raytrace",
];

#[derive(Debug, Clone, Default)]
pub struct ProjectFileFilter {
    user_extensions: Vec<String>,
}

impl ProjectFileFilter {
    /// `user_extensions` are matched case-insensitively; leading dots are ignored
    pub fn new<I, S>(user_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            user_extensions: user_extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    pub fn is_script(path: &str) -> bool {
        extension_of(path).is_some_and(|ext| ext == "cs")
    }

    pub fn is_supported_file(&self, path: &str) -> bool {
        let Some(ext) = extension_of(path) else {
            return false;
        };

        ext == "cs"
            || BUILTIN_EXTENSIONS.contains(&ext.as_str())
            || self.user_extensions.iter().any(|user| *user == ext)
    }

    /// Supported and not hidden by the visibility policy
    pub fn should_file_be_part_of_solution<H: CompilationHost>(
        &self,
        catalog: &mut AssemblyCatalog<H>,
        path: &str,
    ) -> bool {
        self.is_supported_file(path) && catalog.is_visible(path)
    }
}

fn extension_of(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}
