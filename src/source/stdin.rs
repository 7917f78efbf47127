//! Stdin source for piped input.
//!
//! A background thread reads lines and forwards them over a channel so the
//! event loop can poll without blocking. EOF marks the source complete.

use crate::model::error::InputError;
use std::io::{BufRead, BufReader, IsTerminal, Read};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tracing::debug;

#[derive(Debug)]
enum ReaderMessage {
    Line(String),
    Error(std::io::Error),
    Eof,
}

/// Piped stdin, read on a background thread.
///
/// Works for both a stream still being written (`producer | danmaku`) and a
/// finished one (`cat capture.jsonl | danmaku`).
#[derive(Debug)]
pub struct StdinSource {
    rx: Receiver<ReaderMessage>,
    complete: bool,
}

impl StdinSource {
    /// Start reading from process stdin.
    ///
    /// # Errors
    ///
    /// Returns `InputError::NoInput` if stdin is an interactive terminal,
    /// so the app never sits waiting for keyboard input it will not get.
    pub fn new() -> Result<Self, InputError> {
        let stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Err(InputError::NoInput);
        }
        Ok(Self::from_reader(stdin))
    }

    /// Start reading from any reader, bypassing the terminal check.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let reader = BufReader::new(reader);
            for line in reader.lines() {
                let message = match line {
                    Ok(line) => ReaderMessage::Line(line),
                    Err(e) => ReaderMessage::Error(e),
                };
                let failed = matches!(message, ReaderMessage::Error(_));
                if tx.send(message).is_err() || failed {
                    return;
                }
            }
            let _ = tx.send(ReaderMessage::Eof);
        });

        Self {
            rx,
            complete: false,
        }
    }

    /// Every line received since the last poll. Never blocks.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` if the reader thread hit a read error; the
    /// source is complete afterwards.
    pub fn poll_lines(&mut self) -> Result<Vec<String>, InputError> {
        let mut lines = Vec::new();
        while !self.complete {
            match self.rx.try_recv() {
                Ok(ReaderMessage::Line(line)) => lines.push(line),
                Ok(ReaderMessage::Error(e)) => {
                    self.complete = true;
                    return Err(InputError::Io(e));
                }
                Ok(ReaderMessage::Eof) | Err(TryRecvError::Disconnected) => {
                    debug!("stdin reached end of input");
                    self.complete = true;
                }
                Err(TryRecvError::Empty) => break,
            }
        }
        Ok(lines)
    }

    /// Whether EOF has been reached.
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    /// Poll until the source completes, collecting every line.
    fn drain(source: &mut StdinSource) -> Vec<String> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut lines = Vec::new();
        while !source.is_complete() && Instant::now() < deadline {
            lines.extend(source.poll_lines().unwrap());
            thread::sleep(Duration::from_millis(5));
        }
        lines
    }

    #[test]
    fn reads_every_line_then_completes() {
        let mut source = StdinSource::from_reader(&b"first\nsecond\n"[..]);
        assert_eq!(drain(&mut source), vec!["first", "second"]);
        assert!(source.is_complete());
    }

    #[test]
    fn trailing_partial_line_is_delivered_at_eof() {
        let mut source = StdinSource::from_reader(&b"whole\npartial"[..]);
        assert_eq!(drain(&mut source), vec!["whole", "partial"]);
    }

    #[test]
    fn empty_input_completes_without_lines() {
        let mut source = StdinSource::from_reader(&b""[..]);
        assert!(drain(&mut source).is_empty());
        assert!(source.is_complete());
    }

    #[test]
    fn poll_after_completion_returns_nothing() {
        let mut source = StdinSource::from_reader(&b"only\n"[..]);
        drain(&mut source);
        assert!(source.poll_lines().unwrap().is_empty());
    }

    #[test]
    fn read_error_completes_source() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("broken pipe"))
            }
        }

        let mut source = StdinSource::from_reader(Broken);
        let deadline = Instant::now() + Duration::from_secs(5);
        let err = loop {
            match source.poll_lines() {
                Err(e) => break e,
                Ok(_) if Instant::now() > deadline => panic!("no error surfaced"),
                Ok(_) => thread::sleep(Duration::from_millis(5)),
            }
        };
        assert!(matches!(err, InputError::Io(_)));
        assert!(source.is_complete());
    }
}
