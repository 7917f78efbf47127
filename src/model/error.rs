//! Error types for the danmaku application.
//!
//! Errors follow the same layering as the rest of the crate:
//!
//! - [`AppError`] - top-level failure of the terminal application
//!   - [`InputError`] - the transport (file or stdin) could not be read
//!   - `std::io::Error` - terminal setup or drawing failed
//! - [`ParseError`] - one transport line could not be understood
//!
//! Parse errors are **non-fatal**: the offending line is logged and skipped so
//! that the overlay keeps running on partial data. Placement-engine signals
//! live beside the engine (see [`crate::engine`]) because every one of them is
//! recoverable by construction.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to read input from file or stdin.
    ///
    /// Fatal: without a transport the overlay has nothing to show.
    #[error("Failed to read input: {0}")]
    InputRead(#[from] InputError),

    /// Terminal or TUI rendering error.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors encountered when opening or reading the comment transport.
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified input file does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use danmaku::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.jsonl")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.jsonl"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was attempted.
        path: PathBuf,
    },

    /// No input source was provided and stdin is an interactive terminal.
    #[error("No input source: provide a file path or pipe data to stdin")]
    NoInput,

    /// Generic I/O error reading from the input source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A transport line that could not be turned into comments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line is not syntactically valid JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use danmaku::model::error::ParseError;
    ///
    /// let err = ParseError::InvalidJson {
    ///     line: 42,
    ///     message: "expected value".to_string()
    /// };
    /// assert!(err.to_string().contains("line 42"));
    /// ```
    #[error("Invalid JSON at line {line}: {message}")]
    InvalidJson {
        /// 1-based line number.
        line: usize,
        /// Parser error message.
        message: String,
    },

    /// The line is JSON but neither a live-chat response nor a comment payload.
    #[error("Unrecognized payload at line {line}: {message}")]
    UnrecognizedPayload {
        /// 1-based line number.
        line: usize,
        /// Why the payload was rejected.
        message: String,
    },
}

impl ParseError {
    /// Line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            ParseError::InvalidJson { line, .. } | ParseError::UnrecognizedPayload { line, .. } => {
                *line
            }
        }
    }
}
