//! Comment identifier newtype with a smart constructor.
//!
//! Identifiers validate non-empty strings at construction time.
//! The raw constructor is never exported - use `CommentId::new` or a
//! `CommentIdGenerator`.

use std::fmt;

/// Unique identity of a comment, assigned at ingestion.
///
/// Only used for rendering-key stability; the placement engine never
/// interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommentId(String);

impl CommentId {
    /// Smart constructor: validates non-empty id
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidCommentId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidCommentId::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hands out fresh, never-repeating comment ids.
///
/// One generator lives at the ingestion boundary (see
/// [`crate::integration::Overlay`]); ids are `"<prefix>-<sequence>"`.
#[derive(Debug, Clone)]
pub struct CommentIdGenerator {
    prefix: String,
    next: u64,
}

impl CommentIdGenerator {
    /// Create a generator whose ids start with `prefix`.
    ///
    /// An empty prefix falls back to `"c"` so generated ids are never empty.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: if prefix.is_empty() {
                "c".to_string()
            } else {
                prefix
            },
            next: 0,
        }
    }

    /// Produce the next id.
    pub fn next_id(&mut self) -> CommentId {
        let id = CommentId(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next
    }
}

impl Default for CommentIdGenerator {
    fn default() -> Self {
        Self::new("c")
    }
}

// ===== Error Types =====

/// Rejected comment id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidCommentId {
    /// The id string was empty.
    #[error("Comment ID cannot be empty")]
    Empty,
}

// ===== Tests =====
