//! Where the data files live.

use std::fs;
use std::path::PathBuf;

use crate::error::{Result, StoreError};

pub const USERS_FILE: &str = "users.csv";
pub const TASKS_FILE: &str = "tasks.csv";
pub const LOG_FILE: &str = "flowtask.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub users_file: PathBuf,
    pub tasks_file: PathBuf,
    pub log_file: PathBuf,
}

impl Config {
    /// Standard file names inside `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            users_file: data_dir.join(USERS_FILE),
            tasks_file: data_dir.join(TASKS_FILE),
            log_file: data_dir.join(LOG_FILE),
            data_dir,
        }
    }

    /// Create the data directory if it is missing.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| StoreError::io(&self.data_dir, e))
    }
}

impl Default for Config {
    /// Files in the working directory.
    fn default() -> Self {
        Self::new(".")
    }
}
