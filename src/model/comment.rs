//! Comment payload types.
//!
//! `RawComment` is what the transport delivers; `Comment` is the same payload
//! after the ingestion boundary assigned it a [`CommentId`].

use super::identifiers::CommentId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One run of comment content.
///
/// Wire format is internally tagged: `{"type":"text","content":"hi"}` or
/// `{"type":"emoji","url":"https://..."}`. Any other `type` deserializes to
/// [`CommentElement::Unknown`], which consumers treat as a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CommentElement {
    /// Plain text run.
    Text {
        /// The text itself.
        content: String,
    },
    /// Inline emoji image.
    Emoji {
        /// Image location of the emoji.
        url: String,
    },
    /// Element kind this build does not know how to render.
    #[serde(other)]
    Unknown,
}

impl CommentElement {
    /// Shorthand for a text element.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Shorthand for an emoji element.
    pub fn emoji(url: impl Into<String>) -> Self {
        Self::Emoji { url: url.into() }
    }
}

/// Comment as delivered by the transport, before it has an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComment {
    /// Ordered content runs.
    pub elements: Vec<CommentElement>,
}

impl RawComment {
    /// Build a raw comment from its elements.
    pub fn new(elements: Vec<CommentElement>) -> Self {
        Self { elements }
    }
}

/// An identified, immutable comment.
///
/// Cloning is cheap: the element list is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    id: CommentId,
    elements: Arc<[CommentElement]>,
}

impl Comment {
    /// Create a comment with the given identity.
    pub fn new(id: CommentId, elements: Vec<CommentElement>) -> Self {
        Self {
            id,
            elements: elements.into(),
        }
    }

    /// Attach an identity to a transport payload.
    pub fn from_raw(id: CommentId, raw: RawComment) -> Self {
        Self::new(id, raw.elements)
    }

    /// Identity assigned at ingestion.
    pub fn id(&self) -> &CommentId {
        &self.id
    }

    /// Content runs in display order.
    pub fn elements(&self) -> &[CommentElement] {
        &self.elements
    }
}
