//! Text rendering and measurement for comments.
//!
//! Measurement and drawing share [`comment_lines`], so a comment occupies
//! exactly the rows it was measured at.

use super::constants::EMOJI_PLACEHOLDER;
use crate::engine::HeightOracle;
use crate::model::{Comment, CommentElement};
use unicode_width::UnicodeWidthChar;

/// Flatten a comment into display text.
///
/// Emoji become a placeholder (the terminal cannot show the image) and
/// unknown elements render nothing.
pub fn comment_text(comment: &Comment) -> String {
    comment
        .elements()
        .iter()
        .map(|element| match element {
            CommentElement::Text { content } => content.as_str(),
            CommentElement::Emoji { .. } => EMOJI_PLACEHOLDER,
            CommentElement::Unknown => "",
        })
        .collect()
}

/// Hard-wrap `text` to `width` display columns.
///
/// Explicit newlines start a new row. A character wider than the whole row
/// gets a row of its own. Empty text yields no rows.
pub fn wrap_lines(text: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();

    for segment in text.split('\n') {
        let mut row = String::new();
        let mut used = 0usize;
        for ch in segment.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if used > 0 && used + ch_width > width {
                rows.push(std::mem::take(&mut row));
                used = 0;
            }
            row.push(ch);
            used += ch_width;
        }
        rows.push(row);
    }

    // Drop trailing empty rows so "" and "abc\n" don't grow an extra line.
    while rows.last().is_some_and(String::is_empty) {
        rows.pop();
    }
    rows
}

/// Rows `comment` occupies at `width` columns.
pub fn comment_lines(comment: &Comment, width: u16) -> Vec<String> {
    wrap_lines(&comment_text(comment), width)
}

/// Measures comments as the overlay will draw them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextHeightOracle {
    width: u16,
    margin: u16,
}

impl TextHeightOracle {
    /// Oracle for a container `width` columns wide, adding `margin` rows
    /// below every non-empty comment.
    pub fn new(width: u16, margin: u16) -> Self {
        Self { width, margin }
    }

    /// Wrap width in columns.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Rows added below each comment.
    pub fn margin(&self) -> u16 {
        self.margin
    }

    /// Follow a container resize.
    pub fn set_width(&mut self, width: u16) {
        self.width = width;
    }
}

impl HeightOracle for TextHeightOracle {
    fn measure(&self, comment: &Comment) -> u16 {
        let rows = comment_lines(comment, self.width).len();
        if rows == 0 {
            // Nothing visible: report zero so the engine drops it.
            return 0;
        }
        u16::try_from(rows)
            .unwrap_or(u16::MAX)
            .saturating_add(self.margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CommentId;

    fn comment(elements: Vec<CommentElement>) -> Comment {
        Comment::new(CommentId::new("m").unwrap(), elements)
    }

    #[test]
    fn text_and_emoji_flatten_in_order() {
        let c = comment(vec![
            CommentElement::text("nice "),
            CommentElement::emoji("https://e/1.png"),
            CommentElement::Unknown,
            CommentElement::text("!"),
        ]);
        assert_eq!(comment_text(&c), format!("nice {EMOJI_PLACEHOLDER}!"));
    }

    #[test]
    fn wraps_at_width() {
        assert_eq!(wrap_lines("abcdefg", 3), vec!["abc", "def", "g"]);
    }

    #[test]
    fn exact_width_fits_on_one_row() {
        assert_eq!(wrap_lines("abc", 3), vec!["abc"]);
    }

    #[test]
    fn newlines_start_new_rows() {
        assert_eq!(wrap_lines("ab\n\ncd\n", 10), vec!["ab", "", "cd"]);
    }

    #[test]
    fn wide_characters_count_double() {
        // Each of these takes two columns.
        assert_eq!(wrap_lines("日本語", 4), vec!["日本", "語"]);
    }

    #[test]
    fn character_wider_than_row_gets_own_row() {
        assert_eq!(wrap_lines("a日b", 1), vec!["a", "日", "b"]);
    }

    #[test]
    fn empty_text_has_no_rows() {
        assert!(wrap_lines("", 10).is_empty());
    }

    #[test]
    fn zero_width_wraps_as_single_column() {
        assert_eq!(wrap_lines("ab", 0), vec!["a", "b"]);
    }

    #[test]
    fn oracle_adds_margin_to_row_count() {
        let oracle = TextHeightOracle::new(4, 1);
        let c = comment(vec![CommentElement::text("abcdefgh")]);
        assert_eq!(oracle.measure(&c), 3);
    }

    #[test]
    fn oracle_reports_zero_for_invisible_comment() {
        let oracle = TextHeightOracle::new(10, 2);
        let c = comment(vec![CommentElement::Unknown]);
        assert_eq!(oracle.measure(&c), 0);
    }

    #[test]
    fn oracle_follows_width_changes() {
        let mut oracle = TextHeightOracle::new(10, 0);
        let c = comment(vec![CommentElement::text("abcdefghij")]);
        assert_eq!(oracle.measure(&c), 1);
        oracle.set_width(5);
        assert_eq!(oracle.measure(&c), 2);
    }
}
