//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod comment;
pub mod error;
pub mod identifiers;

// Re-export for convenience
pub use comment::{Comment, CommentElement, RawComment};
pub use error::{AppError, InputError, ParseError};
pub use identifiers::{CommentId, CommentIdGenerator, InvalidCommentId};
