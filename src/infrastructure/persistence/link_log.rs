//! Append-only JSON-lines log backing [`super::MemoryLinkRepository`].
//!
//! Each line is one [`LogEntry`]. Replaying the file from the top rebuilds
//! the in-memory store.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One mutation of the link store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LogEntry {
    Created {
        code: String,
        target: String,
        owner_id: u64,
    },
    Deleted {
        code: String,
        owner_id: u64,
    },
}

/// Writer side of the log. Every append is flushed before returning.
pub struct LinkLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl LinkLog {
    /// Reads every entry already in `path`, then opens it for appending.
    /// A missing file is created empty.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] if the file cannot be opened
    /// or a line is not a valid entry.
    pub fn open(path: impl AsRef<Path>) -> Result<(Self, Vec<LogEntry>), AppError> {
        let path = path.as_ref().to_path_buf();
        let entries = read_entries(&path)?;

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok((
            Self {
                path,
                writer: BufWriter::new(file),
            },
            entries,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `entries` as consecutive lines.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StorageUnavailable`] on encoding or I/O failure.
    pub fn append(&mut self, entries: &[LogEntry]) -> Result<(), AppError> {
        for entry in entries {
            serde_json::to_writer(&mut self.writer, entry)?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<Vec<LogEntry>, AppError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut entries = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = serde_json::from_str(&line).map_err(|e| {
            AppError::storage(format!(
                "malformed entry at {}:{}: {e}",
                path.display(),
                index + 1
            ))
        })?;
        entries.push(entry);
    }

    Ok(entries)
}
