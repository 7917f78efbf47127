//! Status bar: source mode, counts and arrival rate.

use super::styles::OverlayStyles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Where comments are coming from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// Piped input still open.
    Live,
    /// Piped input reached EOF.
    Ended,
    /// Recorded file.
    Replay,
}

impl SourceMode {
    fn label(self) -> &'static str {
        match self {
            SourceMode::Live => "[LIVE]",
            SourceMode::Ended => "[ENDED]",
            SourceMode::Replay => "[REPLAY]",
        }
    }
}

/// Snapshot rendered into the one-row status bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusLine {
    /// Source mode.
    pub mode: SourceMode,
    /// Comments currently on screen.
    pub on_screen: usize,
    /// Comments waiting for their release slot.
    pub queued: usize,
    /// Latest comments-per-second estimate, if shown.
    pub rate: Option<f64>,
}

impl StatusLine {
    /// Build the styled line.
    pub fn to_line(&self, styles: &OverlayStyles) -> Line<'static> {
        let mode_style = if self.mode == SourceMode::Live {
            styles.live()
        } else {
            styles.status()
        };

        let mut text = format!(" {} on screen | {} queued", self.on_screen, self.queued);
        if let Some(rate) = self.rate {
            text.push_str(&format!(" | {rate:.1} comments/s"));
        }
        text.push_str(" | q: quit");

        Line::from(vec![
            Span::styled(self.mode.label(), mode_style),
            Span::styled(text, styles.status()),
        ])
        .style(styles.status())
    }

    /// Widget drawing this status line.
    pub fn widget(&self, styles: &OverlayStyles) -> impl Widget {
        Paragraph::new(self.to_line(styles)).style(styles.status())
    }
}

/// Draw `status` across `area`.
pub fn render_status(status: &StatusLine, styles: &OverlayStyles, area: Rect, buf: &mut Buffer) {
    status.widget(styles).render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn shows_counts_and_rate() {
        let status = StatusLine {
            mode: SourceMode::Live,
            on_screen: 7,
            queued: 2,
            rate: Some(3.5),
        };
        assert_eq!(
            text(&status.to_line(&OverlayStyles::default())),
            "[LIVE] 7 on screen | 2 queued | 3.5 comments/s | q: quit"
        );
    }

    #[test]
    fn rate_is_omitted_when_hidden() {
        let status = StatusLine {
            mode: SourceMode::Replay,
            on_screen: 0,
            queued: 0,
            rate: None,
        };
        assert_eq!(
            text(&status.to_line(&OverlayStyles::default())),
            "[REPLAY] 0 on screen | 0 queued | q: quit"
        );
    }

    #[test]
    fn live_marker_uses_live_style() {
        let styles = OverlayStyles::default();
        let live = StatusLine {
            mode: SourceMode::Live,
            on_screen: 0,
            queued: 0,
            rate: None,
        }
        .to_line(&styles);
        let ended = StatusLine {
            mode: SourceMode::Ended,
            on_screen: 0,
            queued: 0,
            rate: None,
        }
        .to_line(&styles);
        assert_eq!(live.spans[0].style, styles.live());
        assert_eq!(ended.spans[0].style, styles.status());
    }
}
