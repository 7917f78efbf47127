//! Parser for transport lines.
//!
//! Each line is one JSON document and yields one batch of comments. Two
//! shapes are understood:
//!
//! - a live-chat poll response (`continuationContents.liveChatContinuation`),
//!   whose text-message actions become comments;
//! - a bare comment payload `{"elements":[...]}`.

use crate::model::{CommentElement, ParseError, RawComment};
use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

/// Key that marks a live-chat poll response.
const LIVE_CHAT_MARKER: &str = "continuationContents";

// ===== Live-chat response shape =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveChatResponse {
    #[serde(default)]
    continuation_contents: Option<ContinuationContents>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContinuationContents {
    #[serde(default)]
    live_chat_continuation: Option<LiveChatContinuation>,
}

#[derive(Debug, Deserialize)]
struct LiveChatContinuation {
    #[serde(default)]
    actions: Vec<RawAction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAction {
    #[serde(default)]
    add_chat_item_action: Option<AddChatItemAction>,
}

#[derive(Debug, Deserialize)]
struct AddChatItemAction {
    #[serde(default)]
    item: Option<ChatItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatItem {
    #[serde(default)]
    live_chat_text_message_renderer: Option<TextMessageRenderer>,
}

#[derive(Debug, Deserialize)]
struct TextMessageRenderer {
    #[serde(default)]
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    runs: Vec<RawRun>,
}

#[derive(Debug, Deserialize)]
struct RawRun {
    #[serde(default)]
    emoji: Option<RawEmoji>,
    #[serde(default)]
    text: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawEmoji {
    #[serde(default)]
    image: Option<RawImage>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    #[serde(default)]
    thumbnails: Vec<RawThumbnail>,
}

#[derive(Debug, Deserialize)]
struct RawThumbnail {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    width: Option<Value>,
}

// ===== Public API =====

/// Parse one transport line into a batch of comments.
///
/// Blank lines yield an empty batch.
///
/// # Errors
///
/// - [`ParseError::InvalidJson`] if the line is not JSON.
/// - [`ParseError::UnrecognizedPayload`] if it is JSON of neither known shape.
pub fn parse_line(raw: &str, line_number: usize) -> Result<Vec<RawComment>, ParseError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(raw).map_err(|e| ParseError::InvalidJson {
        line: line_number,
        message: e.to_string(),
    })?;

    if value.get(LIVE_CHAT_MARKER).is_some() {
        let response: LiveChatResponse =
            serde_json::from_value(value).map_err(|e| ParseError::UnrecognizedPayload {
                line: line_number,
                message: e.to_string(),
            })?;
        let comments = comments_from_live_chat(response);
        trace!(line = line_number, comments = comments.len(), "parsed live-chat response");
        return Ok(comments);
    }

    let comment: RawComment =
        serde_json::from_value(value).map_err(|e| ParseError::UnrecognizedPayload {
            line: line_number,
            message: e.to_string(),
        })?;
    Ok(vec![comment])
}

fn comments_from_live_chat(response: LiveChatResponse) -> Vec<RawComment> {
    let Some(continuation) = response
        .continuation_contents
        .and_then(|c| c.live_chat_continuation)
    else {
        return Vec::new();
    };

    continuation
        .actions
        .into_iter()
        .filter_map(|action| {
            action
                .add_chat_item_action?
                .item?
                .live_chat_text_message_renderer?
                .message
        })
        .filter_map(|message| comment_from_runs(message.runs))
        .collect()
}

/// Turn message runs into a comment; `None` when no run is usable.
fn comment_from_runs(runs: Vec<RawRun>) -> Option<RawComment> {
    let elements: Vec<CommentElement> = runs.into_iter().filter_map(element_from_run).collect();
    if elements.is_empty() {
        return None;
    }
    Some(RawComment::new(elements))
}

fn element_from_run(run: RawRun) -> Option<CommentElement> {
    if let Some(emoji) = run.emoji {
        let thumbnails = emoji.image?.thumbnails;
        let url = pick_thumbnail(thumbnails)?.url?;
        return Some(CommentElement::Emoji { url });
    }

    let content = run.text?.as_str()?.to_string();
    Some(CommentElement::Text { content })
}

/// The only thumbnail, or else the widest one with an integer width.
fn pick_thumbnail(mut thumbnails: Vec<RawThumbnail>) -> Option<RawThumbnail> {
    match thumbnails.len() {
        0 => None,
        1 => thumbnails.pop(),
        _ => thumbnails
            .into_iter()
            .filter_map(|t| {
                let width = t.width.as_ref()?.as_i64()?;
                Some((width, t))
            })
            .max_by_key(|(width, _)| *width)
            .map(|(_, t)| t),
    }
}
