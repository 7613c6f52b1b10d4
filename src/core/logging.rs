//! Log setup for the terminal binary.
//!
//! The TUI owns stdout/stderr while it runs, so records go to a file in the
//! platform data directory instead.

use directories::ProjectDirs;
use env_logger::{Env, Target};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

const LOG_FILE: &str = "lexiplay.log";

pub fn default_log_path() -> io::Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "lexiplay").ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "Could not determine data directory")
    })?;
    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir)?;
    Ok(data_dir.join(LOG_FILE))
}

/// Install the global logger writing to `path`. Filter comes from `RUST_LOG`,
/// defaulting to `info`.
pub fn init_file_logging(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))
}
