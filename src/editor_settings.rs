//! Workspace-wide project generation settings from `ProjectSettings/EditorSettings.asset`

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{IoContext, ProjectGenError, Result};

#[derive(Debug, Deserialize)]
struct EditorSettingsAsset {
    #[serde(rename = "EditorSettings", default)]
    editor_settings: EditorSettingsFields,
}

#[derive(Debug, Default, Deserialize)]
struct EditorSettingsFields {
    #[serde(rename = "m_ProjectGenerationRootNamespace", default)]
    root_namespace: Option<String>,
    #[serde(rename = "m_ProjectGenerationIncludedExtensions", default)]
    included_extensions: Option<String>,
}

/// Settings that apply to every generated project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorSettings {
    /// Root namespace used when a part has no backing unit
    pub root_namespace: String,
    /// Extra file extensions to include in projects, without leading dots
    pub user_extensions: Vec<String>,
}

impl EditorSettings {
    /// Load settings for the project at `project_root`. A missing asset yields defaults.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join("ProjectSettings").join("EditorSettings.asset");
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).with_io_context("Failed to read EditorSettings.asset")?;
        Self::parse(&content).map_err(|source| ProjectGenError::Yaml { file: path, source })
    }

    /// Parse the content of a Unity settings asset.
    ///
    /// Unity writes `%YAML`/`%TAG` directives and `--- !u!<class> &<id>` headers
    /// that serde_yaml does not understand; those lines are dropped first.
    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let yaml: String = content
            .lines()
            .filter(|line| !line.starts_with('%') && !line.starts_with("---"))
            .map(|line| format!("{}\n", line))
            .collect();

        let asset: EditorSettingsAsset = serde_yaml::from_str(&yaml)?;
        let fields = asset.editor_settings;

        Ok(Self {
            root_namespace: fields.root_namespace.unwrap_or_default().trim().to_string(),
            user_extensions: fields
                .included_extensions
                .as_deref()
                .map(split_extensions)
                .unwrap_or_default(),
        })
    }
}

fn split_extensions(extensions: &str) -> Vec<String> {
    extensions
        .split(';')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}
