//! Comment input sources.
//!
//! This module provides the producers that feed the overlay:
//! - File loading for recorded transport lines (replay)
//! - Stdin for piped input (live)
//! - Pacing of batched comments for even release

use crate::model::error::InputError;
use crate::model::RawComment;
use crate::parser;
use std::path::PathBuf;
use tracing::warn;

pub mod file;
pub mod pacing;
pub mod stdin;

pub use file::FileSource;
pub use pacing::{Pacer, RateEstimator, RateSample};
pub use stdin::StdinSource;

/// Comments parsed from one transport line.
pub type Batch = Vec<RawComment>;

#[derive(Debug)]
enum Reader {
    File(FileSource),
    Stdin(StdinSource),
}

/// Unified input source for transport lines.
///
/// Parses at the boundary: callers receive batches of comments, never raw
/// lines. Lines that fail to parse are logged and skipped.
#[derive(Debug)]
pub struct InputSource {
    reader: Reader,
    lines_read: usize,
    parse_errors: usize,
}

impl InputSource {
    /// Replay a recorded file.
    pub fn from_file(source: FileSource) -> Self {
        Self::with_reader(Reader::File(source))
    }

    /// Follow piped input.
    pub fn from_stdin(source: StdinSource) -> Self {
        Self::with_reader(Reader::Stdin(source))
    }

    fn with_reader(reader: Reader) -> Self {
        Self {
            reader,
            lines_read: 0,
            parse_errors: 0,
        }
    }

    /// Poll for new batches. Non-blocking.
    ///
    /// # Behavior:
    /// - File: one batch per line on the first call, nothing after
    /// - Stdin: batches for whatever lines arrived since the last call
    ///
    /// Blank lines yield no batch.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for I/O errors.
    pub fn poll(&mut self) -> Result<Vec<Batch>, InputError> {
        let lines = match &mut self.reader {
            Reader::File(f) => f.drain_lines(),
            Reader::Stdin(s) => s.poll_lines()?,
        };
        Ok(self.parse_lines(lines))
    }

    fn parse_lines(&mut self, lines: Vec<String>) -> Vec<Batch> {
        let mut batches = Vec::with_capacity(lines.len());
        for line in lines {
            self.lines_read += 1;
            if line.trim().is_empty() {
                continue;
            }
            match parser::parse_line(&line, self.lines_read) {
                Ok(batch) => batches.push(batch),
                Err(e) => {
                    self.parse_errors += 1;
                    warn!(line = e.line(), "skipping malformed line: {e}");
                }
            }
        }
        batches
    }

    /// Whether more data may still arrive.
    ///
    /// # Behavior:
    /// - File: always false (static, read-once)
    /// - Stdin: true until EOF is reached
    pub fn is_live(&self) -> bool {
        match &self.reader {
            Reader::File(_) => false,
            Reader::Stdin(s) => !s.is_complete(),
        }
    }

    /// Whether the source replays recorded input.
    pub fn is_replay(&self) -> bool {
        matches!(self.reader, Reader::File(_))
    }

    /// Lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Lines skipped because they did not parse.
    pub fn parse_errors(&self) -> usize {
        self.parse_errors
    }
}

/// Detect and create the appropriate input source.
///
/// # Logic:
/// 1. If a file path is provided: load it (replay)
/// 2. Otherwise: read piped stdin (live)
///
/// # Errors
///
/// Returns `InputError::NoInput` if no file is provided and stdin is a terminal.
/// Returns `InputError::FileNotFound` if the file does not exist.
/// Returns `InputError::Io` for I/O errors during file reading.
pub fn detect_input_source(file: Option<PathBuf>) -> Result<InputSource, InputError> {
    match file {
        Some(path) => Ok(InputSource::from_file(FileSource::new(path)?)),
        None => Ok(InputSource::from_stdin(StdinSource::new()?)),
    }
}
