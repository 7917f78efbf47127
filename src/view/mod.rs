//! TUI rendering and terminal management (impure shell)
//!
//! The terminal plays host to one overlay surface: every tick it polls the
//! input source, paces the new batches, delivers due comments one at a time
//! through the overlay's measure-then-place protocol and redraws.

pub mod constants;
pub mod measure;
pub mod overlay;
pub mod status;
pub mod styles;

pub use measure::TextHeightOracle;
pub use overlay::OverlayView;
pub use status::{SourceMode, StatusLine};
pub use styles::{ColorConfig, OverlayStyles};

use crate::config::ResolvedConfig;
use crate::engine::ContainerGeometry;
use crate::integration::Overlay;
use crate::model::AppError;
use crate::source::{InputSource, Pacer};
use constants::{FALLBACK_WIDTH, STATUS_BAR_HEIGHT};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout, Rect},
    Terminal,
};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Settings the shell needs, resolved from config and CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    /// Rows added below every measured comment.
    pub comment_margin: u16,
    /// Batch period assumed before one is observed.
    pub fetch_period: Duration,
    /// Event loop tick.
    pub tick: Duration,
    /// Show comments-per-second in the status bar.
    pub show_rate: bool,
    /// Whether to color output.
    pub colors: ColorConfig,
}

impl RunSettings {
    /// Settings from a resolved config.
    pub fn from_config(config: &ResolvedConfig, colors: ColorConfig) -> Self {
        Self {
            comment_margin: config.comment_margin,
            fetch_period: config.fetch_period,
            tick: config.tick,
            show_rate: config.show_rate,
            colors,
        }
    }
}

/// Split the frame into status bar and overlay container.
fn split_frame(area: Rect) -> [Rect; 2] {
    Layout::vertical([Constraint::Length(STATUS_BAR_HEIGHT), Constraint::Min(0)]).areas(area)
}

/// Container geometry of the overlay area within `area`.
fn container_geometry(area: Rect) -> (ContainerGeometry, u16) {
    let [_, content] = split_frame(area);
    let width = if content.width > 0 {
        content.width
    } else {
        FALLBACK_WIDTH
    };
    (ContainerGeometry::new(content.height, content.y), width)
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    overlay: Overlay<TextHeightOracle>,
    input_source: InputSource,
    pacer: Pacer,
    settings: RunSettings,
    styles: OverlayStyles,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen
    pub fn new(input_source: InputSource, settings: RunSettings) -> Result<Self, AppError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Self::with_terminal(terminal, input_source, settings)
    }

    /// Run the main event loop
    ///
    /// Returns when the user quits (q, Esc or Ctrl+C). Input is polled on
    /// every tick; redraws happen on input, resize, or when the overlay
    /// changed.
    pub fn run(&mut self) -> Result<(), AppError> {
        self.draw()?;

        loop {
            if event::poll(self.settings.tick)? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                        continue;
                    }
                    Event::Resize(width, height) => {
                        self.handle_resize(width, height);
                        self.draw()?;
                        continue;
                    }
                    _ => {}
                }
            }

            if self.tick(Instant::now())? {
                self.draw()?;
            }
        }
    }
}

impl<B> TuiApp<B>
where
    B: Backend,
{
    /// Build the app around an already initialized terminal.
    pub fn with_terminal(
        terminal: Terminal<B>,
        input_source: InputSource,
        settings: RunSettings,
    ) -> Result<Self, AppError> {
        let size = terminal.size()?;
        let (geometry, width) =
            container_geometry(Rect::new(0, 0, size.width, size.height));
        let oracle = TextHeightOracle::new(width, settings.comment_margin);
        debug!(?geometry, width, "overlay container ready");

        Ok(Self {
            terminal,
            overlay: Overlay::new(oracle, geometry),
            input_source,
            pacer: Pacer::new(settings.fetch_period),
            settings,
            styles: OverlayStyles::with_color_config(settings.colors),
        })
    }

    /// Poll input, pace new batches and deliver due comments.
    ///
    /// Returns whether anything visible changed.
    pub fn tick(&mut self, now: Instant) -> Result<bool, AppError> {
        let was_live = self.input_source.is_live();
        let batches = self.input_source.poll()?;
        let mut changed = !batches.is_empty() || was_live != self.input_source.is_live();

        let observed = !self.input_source.is_replay();
        for batch in batches {
            self.pacer.ingest(batch, now, observed);
        }

        // Comments wait in the pacer until there is somewhere to put them.
        if !self.overlay.geometry().is_ready() {
            return Ok(changed);
        }

        // A comment left staged by an earlier not-ready container.
        if let Some(result) = self.overlay.settle() {
            changed |= result.is_ok();
        }

        for raw in self.pacer.due(now) {
            match self.overlay.deliver(raw) {
                Ok(report) => {
                    trace!(id = %report.id, top = report.top, "delivered comment");
                    changed = true;
                }
                // Already logged by the engine.
                Err(e) => debug!("comment not placed: {e}"),
            }
        }

        Ok(changed)
    }

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
            KeyCode::Char('q') | KeyCode::Esc => true,
            _ => false,
        }
    }

    /// Follow a terminal resize: new container height and wrap width.
    ///
    /// Placed comments keep the heights they were measured at.
    fn handle_resize(&mut self, width: u16, height: u16) {
        let (geometry, width) = container_geometry(Rect::new(0, 0, width, height));
        debug!(?geometry, width, "terminal resized");
        self.overlay.set_geometry(geometry);
        self.overlay.oracle_mut().set_width(width);
    }

    /// Current status bar contents.
    pub fn status_line(&self) -> StatusLine {
        let mode = if self.input_source.is_replay() {
            SourceMode::Replay
        } else if self.input_source.is_live() {
            SourceMode::Live
        } else {
            SourceMode::Ended
        };
        let rate = if self.settings.show_rate {
            self.pacer.latest().map(|sample| sample.comments_per_sec)
        } else {
            None
        };

        StatusLine {
            mode,
            on_screen: self.overlay.engine().placed_count(),
            queued: self.pacer.pending(),
            rate,
        }
    }

    /// Render the current frame
    fn draw(&mut self) -> Result<(), AppError> {
        let projection = self.overlay.projection();
        let status = self.status_line();
        let styles = self.styles;

        self.terminal.draw(|frame| {
            let [status_area, content_area] = split_frame(frame.area());
            status::render_status(&status, &styles, status_area, frame.buffer_mut());
            if let Ok(projection) = &projection {
                frame.render_widget(OverlayView::new(projection, &styles), content_area);
            }
        })?;

        Ok(())
    }

    /// The overlay surface.
    pub fn overlay(&self) -> &Overlay<TextHeightOracle> {
        &self.overlay
    }

    /// The backing terminal.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

#[cfg(test)]
impl<B> TuiApp<B>
where
    B: Backend,
{
    pub(crate) fn handle_key_test(&mut self, key: KeyEvent) -> bool {
        self.handle_key(key)
    }

    pub(crate) fn handle_resize_test(&mut self, width: u16, height: u16) {
        self.handle_resize(width, height);
    }

    pub(crate) fn render_test(&mut self) -> Result<(), AppError> {
        self.draw()
    }
}

/// Initialize and run the TUI application with input source and settings
///
/// This is the main entry point for the TUI. It handles terminal
/// setup, runs the event loop, and ensures cleanup on exit.
///
/// Note: Logging must be initialized by caller before calling this function.
pub fn run_with_source(input_source: InputSource, settings: RunSettings) -> Result<(), AppError> {
    info!(
        replay = input_source.is_replay(),
        ?settings,
        "starting overlay"
    );

    let mut app = match TuiApp::new(input_source, settings) {
        Ok(app) => app,
        Err(e) => {
            let _ = restore_terminal();
            return Err(e);
        }
    };

    let result = app.run();
    restore_terminal()?;

    let stats = app.overlay().stats();
    info!(
        placed = stats.placed,
        evicted = stats.evicted,
        swaps = stats.swaps,
        collisions = stats.collisions,
        degenerate = stats.degenerate,
        "overlay closed"
    );
    result
}

/// Restore terminal to normal state
///
/// Disables raw mode and leaves alternate screen
fn restore_terminal() -> Result<(), AppError> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StdinSource;
    use ratatui::backend::TestBackend;
    use std::io::Cursor;
    use std::thread;

    fn settings() -> RunSettings {
        RunSettings {
            comment_margin: 0,
            fetch_period: Duration::from_secs(1),
            tick: Duration::from_millis(10),
            show_rate: true,
            colors: ColorConfig::from_env_and_args(true),
        }
    }

    fn bare(text: &str) -> String {
        format!(r#"{{"elements":[{{"type":"text","content":"{text}"}}]}}"#)
    }

    fn app_with_input(input: String, width: u16, height: u16) -> TuiApp<TestBackend> {
        let terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let source = InputSource::from_stdin(StdinSource::from_reader(Cursor::new(
            input.into_bytes(),
        )));
        TuiApp::with_terminal(terminal, source, settings()).unwrap()
    }

    /// Tick until the source has completed and everything was released.
    fn run_to_completion(app: &mut TuiApp<TestBackend>) {
        let start = Instant::now();
        let mut now = start;
        while (app.input_source.is_live() || app.pacer.pending() > 0)
            && now < start + Duration::from_secs(60)
        {
            app.tick(now).unwrap();
            thread::sleep(Duration::from_millis(2));
            now += Duration::from_millis(250);
        }
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn container_excludes_status_bar() {
        let (geometry, width) = container_geometry(Rect::new(0, 0, 30, 10));
        assert_eq!(geometry, ContainerGeometry::new(9, 1));
        assert_eq!(width, 30);
    }

    #[test]
    fn zero_width_falls_back() {
        let (_, width) = container_geometry(Rect::new(0, 0, 0, 10));
        assert_eq!(width, FALLBACK_WIDTH);
    }

    #[test]
    fn quit_keys() {
        let mut app = app_with_input(String::new(), 20, 5);
        assert!(app.handle_key_test(key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(app.handle_key_test(key(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(app.handle_key_test(key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!app.handle_key_test(key(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!app.handle_key_test(key(KeyCode::Char('x'), KeyModifiers::NONE)));
    }

    #[test]
    fn delivered_comments_are_placed_in_order() {
        let input = format!("{}\n{}\n", bare("first"), bare("second"));
        let mut app = app_with_input(input, 20, 6);
        run_to_completion(&mut app);

        let projection = app.overlay().projection().unwrap();
        let tops: Vec<u32> = projection.placements.iter().map(|p| p.absolute_top).collect();
        assert_eq!(tops, vec![1, 2], "offset by the status bar");
    }

    #[test]
    fn status_line_reports_ended_source() {
        let mut app = app_with_input(format!("{}\n", bare("x")), 20, 6);
        run_to_completion(&mut app);

        let status = app.status_line();
        assert_eq!(status.mode, SourceMode::Ended);
        assert_eq!(status.on_screen, 1);
        assert_eq!(status.queued, 0);
        assert!(status.rate.is_some());
    }

    #[test]
    fn resize_updates_geometry_and_wrap_width() {
        let mut app = app_with_input(String::new(), 20, 6);
        app.handle_resize_test(8, 12);
        assert_eq!(app.overlay().geometry(), ContainerGeometry::new(11, 1));
        assert_eq!(app.overlay().oracle().width(), 8);
    }

    #[test]
    fn comments_wait_while_container_has_no_height() {
        let mut app = app_with_input(format!("{}\n", bare("held")), 20, 1);
        run_to_completion_bounded(&mut app);
        assert_eq!(app.overlay().engine().placed_count(), 0);
        assert_eq!(app.pacer.pending(), 1);

        app.handle_resize_test(20, 5);
        app.tick(Instant::now() + Duration::from_secs(10)).unwrap();
        assert_eq!(app.overlay().engine().placed_count(), 1);
    }

    /// Tick until the source completes, without waiting for the pacer.
    fn run_to_completion_bounded(app: &mut TuiApp<TestBackend>) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.input_source.is_live() && Instant::now() < deadline {
            app.tick(Instant::now()).unwrap();
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn draw_renders_status_and_comments() {
        let mut app = app_with_input(format!("{}\n", bare("hello")), 30, 4);
        run_to_completion(&mut app);
        app.render_test().unwrap();

        let buffer = app.terminal().backend().buffer();
        let row = |y: u16| -> String {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect()
        };
        assert!(row(0).starts_with("[ENDED] 1 on screen"));
        assert!(row(1).starts_with("hello"));
    }
}
