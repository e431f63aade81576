//! Error types for project generation
//!
//! Malformed response files and missing packages are not errors here: the
//! former are reported inside `ResponseFileData`, the latter are `None`.
//! What remains are the failures that must abort a generation pass.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for project generation
#[derive(Error, Debug)]
pub enum ProjectGenError {
    /// IO errors (file operations, directory access, etc.)
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing/serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parsing errors (Unity settings assets)
    #[error("YAML error in {file:?}: {source}")]
    Yaml {
        file: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The host could not enumerate its compilable units
    #[error("Host enumeration failed: {message}")]
    Host { message: String },

    /// The compilation snapshot exported by the editor is missing or unusable
    #[error("Compilation snapshot {path:?} unavailable: {message}")]
    Snapshot { path: PathBuf, message: String },

    /// Assembly references form a cycle
    #[error("Assembly reference cycle through '{assembly}'")]
    ReferenceCycle { assembly: String },

    /// The file logger could not be set up
    #[error("Logger setup failed: {message}")]
    Logger { message: String },

    /// File watcher setup failed
    #[error("Watcher setup error: {0}")]
    Watcher(#[from] notify::Error),
}

/// Result type alias for project generation
pub type Result<T> = std::result::Result<T, ProjectGenError>;

impl From<std::io::Error> for ProjectGenError {
    fn from(err: std::io::Error) -> Self {
        ProjectGenError::Io {
            source: err,
            message: "IO operation failed".to_string(),
        }
    }
}

impl From<serde_json::Error> for ProjectGenError {
    fn from(err: serde_json::Error) -> Self {
        ProjectGenError::Json {
            source: err,
            message: "JSON operation failed".to_string(),
        }
    }
}

/// Helper trait for converting IO errors with context
pub trait IoContext<T> {
    fn with_io_context(self, message: &str) -> Result<T>;
}

impl<T> IoContext<T> for std::result::Result<T, std::io::Error> {
    fn with_io_context(self, message: &str) -> Result<T> {
        self.map_err(|e| ProjectGenError::Io {
            message: message.to_string(),
            source: e,
        })
    }
}

/// Helper trait for converting JSON errors with context
pub trait JsonContext<T> {
    fn with_json_context(self, message: &str) -> Result<T>;
}

impl<T> JsonContext<T> for std::result::Result<T, serde_json::Error> {
    fn with_json_context(self, message: &str) -> Result<T> {
        self.map_err(|e| ProjectGenError::Json {
            message: message.to_string(),
            source: e,
        })
    }
}
