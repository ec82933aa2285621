//! File logger for the `log` facade

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::domain::errors::Result;

/// Appends `[timestamp] LEVEL target: message` lines to a file
pub struct FileLogger {
    file: Mutex<Option<File>>,
    path: PathBuf,
}

impl FileLogger {
    /// Open (or create) the log file for appending
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            file: Mutex::new(Some(file)),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, line: &str) {
        let mut guard = self.file.lock();
        if let Some(file) = guard.as_mut() {
            if writeln!(file, "{}", line).is_err() {
                // Stop writing to a broken file
                *guard = None;
            }
        }
    }
}

fn format_record(record: &log::Record) -> String {
    format!(
        "[{}] {:<5} {}: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level(),
        record.target(),
        record.args()
    )
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            self.write_line(&format_record(record));
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

static LOGGER: OnceLock<FileLogger> = OnceLock::new();

/// Install a [`FileLogger`] as the global logger.
///
/// Returns `Ok(false)` when a logger was already installed, by this
/// function or by the host.
pub fn init(path: impl Into<PathBuf>, level: log::LevelFilter) -> Result<bool> {
    let logger = FileLogger::open(path)?;
    if LOGGER.set(logger).is_err() {
        return Ok(false);
    }
    let Some(logger) = LOGGER.get() else {
        return Ok(false);
    };
    if log::set_logger(logger).is_err() {
        return Ok(false);
    }
    log::set_max_level(level);
    log::info!(target: "casement", "=== Casement log started: {} ===", logger.path().display());
    Ok(true)
}
