//! Persistent integer preferences
//!
//! The editor keeps small settings such as the project generation flags in a
//! process-wide preference store that survives restarts. [`ConfigStore`] is
//! that store as seen from here; the binary uses [`JsonConfigStore`], tests
//! use [`MemoryConfigStore`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IoContext, JsonContext, ProjectGenError, Result};

pub trait ConfigStore {
    fn get_int(&self, key: &str, default: i64) -> i64;
    fn set_int(&mut self, key: &str, value: i64) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryConfigStore {
    values: BTreeMap<String, i64>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: i64) -> Self {
        let mut values = BTreeMap::new();
        values.insert(key.to_string(), value);
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Preferences kept as a flat JSON object on disk, rewritten on every change
#[derive(Debug)]
pub struct JsonConfigStore {
    path: PathBuf,
    values: BTreeMap<String, i64>,
}

impl JsonConfigStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: PathBuf) -> Result<Self> {
        let values = if path.exists() {
            let content = fs::read_to_string(&path).with_io_context("Failed to read preferences file")?;
            serde_json::from_str(&content).with_json_context("Failed to parse preferences file")?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    /// Open the per-user store under the platform config directory
    pub fn open_default() -> Result<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| ProjectGenError::Io {
            message: "Could not determine config directory".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })?;

        Self::open(config_dir.join("UnityCode").join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_io_context("Failed to create preferences directory")?;
        }

        let content = serde_json::to_string_pretty(&self.values)
            .with_json_context("Failed to serialize preferences")?;
        fs::write(&self.path, content).with_io_context("Failed to write preferences file")
    }
}

impl ConfigStore for JsonConfigStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.save()
    }
}
