//! Read-once file source.
//!
//! The whole file is loaded at construction; the first drain hands out
//! every line and later drains return nothing.

use crate::model::error::InputError;
use std::fs;
use std::path::{Path, PathBuf};

/// Recorded transport lines loaded from a file.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    lines: Option<Vec<String>>,
}

impl FileSource {
    /// Load `path` into memory.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file does not exist.
    /// Returns `InputError::Io` for other I/O errors.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InputError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let lines = content.lines().map(str::to_owned).collect();

        Ok(Self {
            path: path.to_path_buf(),
            lines: Some(lines),
        })
    }

    /// Take every loaded line. Empty after the first call.
    pub fn drain_lines(&mut self) -> Vec<String> {
        self.lines.take().unwrap_or_default()
    }

    /// Path the lines were loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let missing = std::env::temp_dir().join("danmaku_missing_file_source.jsonl");
        let _ = fs::remove_file(&missing);

        let err = FileSource::new(&missing).unwrap_err();
        assert!(matches!(err, InputError::FileNotFound { ref path } if *path == missing));
    }

    #[test]
    fn drain_returns_lines_once() {
        let file = std::env::temp_dir().join("danmaku_file_source_drain.jsonl");
        fs::write(&file, "one\ntwo\n").unwrap();

        let mut source = FileSource::new(&file).unwrap();
        let _ = fs::remove_file(&file);

        assert_eq!(source.drain_lines(), vec!["one", "two"]);
        assert!(source.drain_lines().is_empty());
        assert_eq!(source.path(), file.as_path());
    }
}
