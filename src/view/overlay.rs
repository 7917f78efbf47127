//! Overlay widget: draws a projection's placed comments.

use super::measure::comment_lines;
use super::styles::OverlayStyles;
use crate::projector::Projection;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// Draws every placement of a [`Projection`] at its absolute row.
///
/// The projection must have been computed with `content_offset == area.y`;
/// rows outside `area` are clipped. The pending comment is not drawn: the
/// terminal oracle measures without rendering off-screen.
#[derive(Debug, Clone, Copy)]
pub struct OverlayView<'a> {
    projection: &'a Projection,
    styles: &'a OverlayStyles,
}

impl<'a> OverlayView<'a> {
    /// Widget over `projection`.
    pub fn new(projection: &'a Projection, styles: &'a OverlayStyles) -> Self {
        Self { projection, styles }
    }
}

impl Widget for OverlayView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bottom = u32::from(area.bottom());
        for placed in &self.projection.placements {
            let style = self.styles.lane(placed.layer);
            let rows = comment_lines(&placed.comment, area.width);
            for (offset, row) in rows.iter().take(usize::from(placed.height)).enumerate() {
                let y = placed.absolute_top + offset as u32;
                if y < u32::from(area.y) {
                    continue;
                }
                if y >= bottom {
                    break;
                }
                // y < bottom <= u16::MAX
                let y = y as u16;
                buf.set_stringn(area.x, y, row, usize::from(area.width), style);
            }
        }
    }
}
