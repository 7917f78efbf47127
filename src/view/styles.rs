//! Overlay styling.
//!
//! Each lane gets its own color so the two interleaved columns of comments
//! stay distinguishable while the draining lane is overwritten.

use crate::engine::LayerIndex;
use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Determines whether colors should be enabled or disabled based on:
/// - `--no-color` CLI flag
/// - `NO_COLOR` environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Create a ColorConfig from CLI args and environment.
    ///
    /// Priority (first match wins):
    /// 1. `--no-color` flag (disables colors)
    /// 2. `NO_COLOR` env var (any value disables colors)
    /// 3. Default: colors enabled
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var_os("NO_COLOR").is_none();
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== OverlayStyles =====

/// Styles for lanes and the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStyles {
    lanes: [Style; 2],
    status: Style,
    live: Style,
}

impl OverlayStyles {
    /// Styles honoring `config`. Without colors everything is plain except
    /// the status bar, which stays reversed so it reads as chrome.
    pub fn with_color_config(config: ColorConfig) -> Self {
        let status = Style::default().add_modifier(Modifier::REVERSED);
        if config.colors_enabled() {
            Self {
                lanes: [
                    Style::default().fg(Color::Cyan),
                    Style::default().fg(Color::Yellow),
                ],
                status,
                live: status.fg(Color::Green),
            }
        } else {
            Self {
                lanes: [Style::default(); 2],
                status,
                live: status,
            }
        }
    }

    /// Style for comments in `layer`.
    pub fn lane(&self, layer: LayerIndex) -> Style {
        self.lanes[layer.index()]
    }

    /// Status bar base style.
    pub fn status(&self) -> Style {
        self.status
    }

    /// Status bar live marker.
    pub fn live(&self) -> Style {
        self.live
    }
}

impl Default for OverlayStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig { enabled: true })
    }
}
