//! Layout dimension constants for TUI rendering.

/// Height of the status bar in lines.
///
/// The status bar sits above the overlay, so the overlay's content offset
/// equals this height.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Stand-in text for emoji, which a terminal cannot draw as images.
pub const EMOJI_PLACEHOLDER: &str = "[emoji]";

/// Width assumed when the terminal reports zero columns.
pub const FALLBACK_WIDTH: u16 = 80;
