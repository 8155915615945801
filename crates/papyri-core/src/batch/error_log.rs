//! Persisted log of unreadable inputs

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const ERROR_LOG_NAME: &str = "unreadable.log";

/// An input that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableInput {
    pub path: PathBuf,
    /// 1-based position in the batch
    pub position: usize,
    pub reason: String,
}

/// `<output dir>/unreadable.log`, replaced at the first unreadable input of
/// a batch and removed at the end of a batch without any.
#[derive(Debug)]
pub struct ErrorLog {
    path: PathBuf,
    file: Option<File>,
}

impl ErrorLog {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(ERROR_LOG_NAME),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&mut self, entry: &UnreadableInput) -> Result<()> {
        if self.file.is_none() {
            if let Some(dir) = self.path.parent() {
                fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.path)?;
            self.file = Some(file);
        }
        if let Some(file) = self.file.as_mut() {
            writeln!(
                file,
                "{}\t{}\t{}",
                entry.position,
                entry.path.display(),
                entry.reason
            )?;
        }
        Ok(())
    }

    /// Close the log, deleting a stale one if nothing was recorded.
    pub fn finish(self) -> Result<()> {
        if self.file.is_none() && self.path.is_file() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
