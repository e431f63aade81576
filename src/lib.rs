//! Unity Project Generation Library
//!
//! Turns the compilation units reported by the Unity editor into IDE project
//! parts, filtered by which package origins the user wants to see.

pub mod assembly_catalog;
pub mod config_store;
pub mod editor_settings;
pub mod error;
pub mod file_filter;
pub mod generation;
pub mod host;
pub mod logging;
pub mod package_cache;
pub mod package_origin;
pub mod project_part;
pub mod response_files;
pub mod rsp_parser;
pub mod snapshot_watcher;
pub mod unity_host;
pub mod visibility;
#[cfg(test)]
pub mod test_utils;
