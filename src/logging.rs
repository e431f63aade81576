use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record};

use crate::error::{IoContext, ProjectGenError, Result};

const LOG_FILE_NAME: &str = "unity_project_gen.log";

struct FileLogger {
    file: Mutex<fs::File>,
    level: LevelFilter,
}

impl FileLogger {
    fn new(file_path: &Path, level: LevelFilter) -> Result<Self> {
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_io_context(&format!("Failed to create log directory {}", parent.display()))?;
        }

        // Each run starts with a fresh log
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(file_path)
            .with_io_context(&format!("Failed to open log file {}", file_path.display()))?;

        Ok(FileLogger {
            file: Mutex::new(file),
            level,
        })
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(
                file,
                "[{}] [{}] [{}] {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            );
            let _ = file.flush();
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Platform-specific log file path under the local data directory
pub fn log_file_path() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir().ok_or_else(|| ProjectGenError::Logger {
        message: "Could not determine local data directory".to_string(),
    })?;

    Ok(data_dir.join("UnityCode").join(LOG_FILE_NAME))
}

/// Install the file logger at `file_path`, overwriting previous logs
pub fn init_logger_at(file_path: &Path) -> Result<()> {
    let level = LevelFilter::Info;
    let logger = FileLogger::new(file_path, level)?;

    log::set_boxed_logger(Box::new(logger)).map_err(|e| ProjectGenError::Logger {
        message: format!("Failed to install logger: {}", e),
    })?;
    log::set_max_level(level);

    Ok(())
}

/// Initialize the logger to write to a single file in local app data
pub fn init_logger() -> Result<()> {
    init_logger_at(&log_file_path()?)
}
