//! The terminal pane: the UI-owning context tying session, engine, input
//! encoding, viewport and rendering together.
//!
//! A host embeds a [`TerminalPane`], feeds it input events and a timer, and
//! drains [`TerminalEvent`]s after each [`TerminalPane::pump`] call. All
//! methods must be called from the single context that owns the view state;
//! the pane never blocks it on PTY I/O.

use std::time::Instant;

use tracing::{debug, warn};

use crate::config::Config;
use crate::core::pump::{OutputPump, PumpOutcome};
use crate::core::pty::SpawnOptions;
use crate::core::session::Session;
use crate::engine::cell::CursorShape;
use crate::engine::{Engine, EngineEvent};
use crate::input::encoder::InputEncoder;
use crate::input::keys::{KeyInput, Modifiers, MouseButton, MouseEventKind};
use crate::view::cursor::CursorBlink;
use crate::view::draw::{render_frame, CellMetrics, DrawSink};
use crate::view::viewport::Viewport;

/// Notifications surfaced to the embedding host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminalEvent {
    /// The child process exited with this code. Fires once per launch.
    Exited(u32),
    TitleChanged(String),
    Bell,
    /// Switched to (true) or away from (false) the alternate screen; the
    /// scrollbar affordance should follow `scrollbar_visible`.
    BufferSwitched(bool),
    CursorStyleChanged { shape: CursorShape, blink: bool },
    WindowMoved(i32, i32),
    WindowResized(u32, u32),
    WindowMinimized,
    WindowMaximized,
    WindowRestored,
    WindowRaised,
    WindowLowered,
    WindowFullscreened,
}

impl TerminalEvent {
    pub(crate) fn from_engine(event: EngineEvent) -> Self {
        match event {
            EngineEvent::BufferSwitched(alt) => TerminalEvent::BufferSwitched(alt),
            EngineEvent::TitleChanged(title) => TerminalEvent::TitleChanged(title),
            EngineEvent::CursorStyleChanged { shape, blink } => {
                TerminalEvent::CursorStyleChanged { shape, blink }
            }
            EngineEvent::Bell => TerminalEvent::Bell,
            EngineEvent::WindowMoved(x, y) => TerminalEvent::WindowMoved(x, y),
            EngineEvent::WindowResized(w, h) => TerminalEvent::WindowResized(w, h),
            EngineEvent::WindowMinimized => TerminalEvent::WindowMinimized,
            EngineEvent::WindowMaximized => TerminalEvent::WindowMaximized,
            EngineEvent::WindowRestored => TerminalEvent::WindowRestored,
            EngineEvent::WindowRaised => TerminalEvent::WindowRaised,
            EngineEvent::WindowLowered => TerminalEvent::WindowLowered,
            EngineEvent::WindowFullscreened => TerminalEvent::WindowFullscreened,
        }
    }
}

/// One terminal instance: engine, optional live session, and view state.
pub struct TerminalPane {
    config: Config,
    engine: Box<dyn Engine>,
    session: Option<Session>,
    pump: OutputPump,
    viewport: Viewport,
    blink: CursorBlink,
    cursor_shape: CursorShape,
    focused: bool,
    metrics: CellMetrics,
}

impl TerminalPane {
    /// Wrap an engine sized by the host. No process is spawned until
    /// [`TerminalPane::launch`].
    pub fn new(engine: Box<dyn Engine>, config: Config) -> Self {
        let mut viewport = Viewport::new(engine.rows());
        viewport.sync(engine.total_lines(), engine.rows() as usize);

        let blink = CursorBlink::new(config.cursor.blink, config.cursor.blink_rate());
        let cursor_shape = config.cursor.shape();

        Self {
            config,
            engine,
            session: None,
            pump: OutputPump::new(),
            viewport,
            blink,
            cursor_shape,
            focused: false,
            metrics: CellMetrics {
                cell_width: 8.0,
                cell_height: 16.0,
            },
        }
    }

    /// Spawn the configured process, tearing down any previous session
    /// first. Spawn failure is written into the buffer as a diagnostic and
    /// is not fatal for the host.
    pub fn launch(&mut self) {
        self.shutdown_session();

        let options = SpawnOptions {
            command: self.config.shell.clone(),
            args: self.config.args.clone(),
            cwd: self.config.cwd.clone(),
            env: Vec::new(),
            cols: self.engine.cols(),
            rows: self.engine.rows(),
        };

        match Session::spawn(&options) {
            Ok(session) => self.session = Some(session),
            Err(err) => {
                warn!(error = %err, "launch failed");
                self.engine
                    .write(&format!("Error launching process: {err}\r\n"));
            }
        }
    }

    /// Kill the child and drop the session. Safe to call at any time.
    pub fn kill(&mut self) {
        self.shutdown_session();
    }

    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_running)
    }

    /// Exit code of the child; valid only after exit, while the session is
    /// still attached.
    pub fn exit_code(&self) -> Option<u32> {
        self.session.as_ref().and_then(Session::exit_code)
    }

    pub fn process_id(&self) -> Option<u32> {
        self.session.as_ref().and_then(Session::process_id)
    }

    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metrics(&self) -> CellMetrics {
        self.metrics
    }

    /// Update the cell box measured by the host's font machinery.
    pub fn set_metrics(&mut self, metrics: CellMetrics) {
        self.metrics = metrics;
    }

    /// Handle a key event. Returns true when bytes were queued.
    pub fn on_key(&mut self, input: &KeyInput) -> bool {
        match InputEncoder::encode_key(self.engine.as_ref(), input) {
            Some(bytes) => {
                self.queue(bytes);
                true
            }
            None => false,
        }
    }

    /// Handle committed text from the host's text-input channel.
    pub fn on_text(&mut self, text: &str) -> bool {
        match InputEncoder::encode_text(self.engine.as_ref(), text) {
            Some(bytes) => {
                self.queue(bytes);
                true
            }
            None => false,
        }
    }

    /// Handle a pointer event at a pixel position.
    pub fn on_mouse(
        &mut self,
        x: f64,
        y: f64,
        button: MouseButton,
        kind: MouseEventKind,
        modifiers: Modifiers,
    ) -> bool {
        match InputEncoder::encode_mouse(
            self.engine.as_ref(),
            &self.metrics,
            x,
            y,
            button,
            kind,
            modifiers,
        ) {
            Some(bytes) => {
                self.queue(bytes);
                true
            }
            None => false,
        }
    }

    /// Handle a wheel notch. Routed to the application while a mouse
    /// tracking mode is active, otherwise scrolls the viewport.
    pub fn on_wheel(&mut self, x: f64, y: f64, delta: f64, modifiers: Modifiers) -> bool {
        if delta == 0.0 {
            return false;
        }

        if self.engine.mouse_tracking().is_active() {
            let (button, kind) = if delta > 0.0 {
                (MouseButton::WheelUp, MouseEventKind::WheelUp)
            } else {
                (MouseButton::WheelDown, MouseEventKind::WheelDown)
            };
            if self.on_mouse(x, y, button, kind, modifiers) {
                return true;
            }
        }

        self.viewport.wheel(delta);
        true
    }

    /// Focus transition: resets the blink state machine and notifies the
    /// application when it asked for focus events.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if focused {
            self.blink.focus_gained(Instant::now());
        } else {
            self.blink.focus_lost();
        }

        if let Some(bytes) = InputEncoder::encode_focus(self.engine.as_ref(), focused) {
            self.queue(bytes);
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Resize the grid: engine, PTY and viewport together.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        if cols == self.engine.cols() && rows == self.engine.rows() {
            return;
        }

        self.engine.resize(cols, rows);
        if let Some(session) = &mut self.session {
            if let Err(err) = session.resize(cols, rows) {
                warn!(error = %err, "pty resize failed");
            }
        }
        self.viewport
            .sync(self.engine.total_lines(), rows as usize);
    }

    /// Resize to whatever grid fits the given pixel area.
    pub fn resize_to_pixels(&mut self, width: f64, height: f64) {
        let (cols, rows) = self.metrics.grid_size(width, height);
        self.resize(cols, rows);
    }

    /// Scrollbar interface: jump to an absolute scroll position.
    pub fn scroll_to(&mut self, y: usize) {
        self.viewport.scroll_to(y);
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.viewport.scroll_by(delta);
    }

    /// Drain pending output and engine notifications. Call from the UI
    /// context whenever the host is idle or was woken by output.
    pub fn pump(&mut self) -> PumpOutcome {
        let outcome =
            self.pump
                .drain(self.session.as_ref(), self.engine.as_mut(), &mut self.viewport);

        for event in &outcome.events {
            if let TerminalEvent::CursorStyleChanged { shape, blink } = event {
                self.cursor_shape = *shape;
                self.blink.set_enabled(*blink, Instant::now());
            }
        }

        outcome
    }

    /// Advance the blink timer. Returns true when the phase toggled and the
    /// host should redraw.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.blink.poll(now) {
            return false;
        }

        // Rows carrying the blink attribute swap colors with the phase, so
        // their cached runs go stale on every toggle.
        let start = self.viewport.y();
        let end = (start + self.viewport.lines()).min(self.engine.total_lines());
        for y in start..end {
            if let Some(line) = self.engine.line_mut(y) {
                if line.has_blink() {
                    line.touch();
                }
            }
        }
        true
    }

    /// Draw the visible buffer slice and cursor overlay.
    pub fn render(&mut self, sink: &mut dyn DrawSink) {
        render_frame(
            self.engine.as_mut(),
            &self.viewport,
            &self.blink,
            self.focused,
            self.cursor_shape,
            &self.metrics,
            sink,
        );
    }

    fn queue(&mut self, bytes: Vec<u8>) {
        // Writes after teardown are silently dropped.
        let Some(session) = &self.session else {
            return;
        };
        if let Err(err) = session.write(&bytes) {
            debug!(error = %err, "input dropped");
        }
    }

    fn shutdown_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.kill();
        }
    }
}

impl Drop for TerminalPane {
    fn drop(&mut self) {
        self.shutdown_session();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fake::FakeEngine;
    use crate::engine::MouseTrackingMode;
    use std::time::Duration;

    fn pane_with(f: impl FnOnce(&mut FakeEngine)) -> TerminalPane {
        let mut engine = FakeEngine::new(80, 24);
        f(&mut engine);
        TerminalPane::new(Box::new(engine), Config::default())
    }

    fn pane() -> TerminalPane {
        pane_with(|_| {})
    }

    #[test]
    fn test_resize_round_trip() {
        let mut p = pane();
        // Grow the buffer so scrollback exists.
        p.engine.write(&"x\n".repeat(76));
        p.pump();

        p.resize(132, 43);
        assert_eq!(p.engine.cols(), 132);
        assert_eq!(p.engine.rows(), 43);
        // max_scrollback recomputes against the new row count.
        assert_eq!(
            p.viewport().max_scrollback(),
            p.engine.total_lines() - 43
        );
    }

    #[test]
    fn test_wheel_scrolls_viewport_without_tracking() {
        let mut p = pane();
        p.engine.write(&"x\n".repeat(100));
        p.pump();
        p.scroll_to(usize::MAX);
        let bottom = p.viewport().y();
        assert_eq!(bottom, p.viewport().max_scrollback());

        assert!(p.on_wheel(10.0, 10.0, 1.0, Modifiers::empty()));
        assert_eq!(p.viewport().y(), bottom - 3);
    }

    #[test]
    fn test_wheel_routes_to_application_when_tracking() {
        let mut p = pane_with(|e| e.mouse_mode = MouseTrackingMode::Normal);
        p.engine.write(&"x\n".repeat(100));
        p.pump();
        let bottom = p.viewport().y();

        assert!(p.on_wheel(10.0, 10.0, 1.0, Modifiers::empty()));
        // The viewport does not move; the event went to the child.
        assert_eq!(p.viewport().y(), bottom);
    }

    #[test]
    fn test_engine_growth_without_output_only_reclamps() {
        let mut p = pane();
        p.engine.write(&"x\n".repeat(50));
        p.pump();
        p.scroll_to(0);
        assert_eq!(p.viewport().y(), 0);

        // Only output arriving through the session snaps to the bottom;
        // a plain sync keeps the user's position.
        p.engine.write("more\n");
        let outcome = p.pump.drain(None, p.engine.as_mut(), &mut p.viewport);
        assert!(!outcome.needs_redraw);
        assert_eq!(p.viewport().y(), 0);
    }

    #[test]
    fn test_cursor_style_event_updates_blink() {
        let mut p = pane_with(|e| {
            e.events.push(crate::engine::EngineEvent::CursorStyleChanged {
                shape: CursorShape::Underline,
                blink: false,
            })
        });
        let outcome = p.pump();
        assert!(outcome
            .events
            .contains(&TerminalEvent::CursorStyleChanged {
                shape: CursorShape::Underline,
                blink: false,
            }));
        assert_eq!(p.cursor_shape, CursorShape::Underline);
        assert!(!p.blink.is_enabled());
    }

    #[test]
    fn test_alternate_switch_suppresses_scrollbar() {
        let mut p = pane_with(|e| {
            e.events.push(crate::engine::EngineEvent::BufferSwitched(true));
        });
        p.engine.write(&"x\n".repeat(50));
        let outcome = p.pump();

        assert!(outcome.events.contains(&TerminalEvent::BufferSwitched(true)));
        assert_eq!(p.viewport().y(), 0);
        assert!(!p.viewport().scrollbar_visible());
    }

    #[test]
    fn test_focus_resets_blink() {
        let mut p = pane();
        p.set_focused(true);
        assert!(p.blink.blinking());

        p.blink.on_tick();
        assert!(!p.blink.phase_visible());

        p.set_focused(false);
        assert!(p.blink.phase_visible());
        assert!(!p.blink.blinking());
    }

    #[test]
    fn test_blink_tick_touches_blinking_rows() {
        let mut p = pane();
        use crate::engine::cell::{AttrFlags, Cell, CellAttrs};
        let attrs = CellAttrs {
            flags: AttrFlags::BLINK,
            ..CellAttrs::default()
        };
        let cell = Cell::from_char('b', attrs);
        if let Some(line) = p.engine.line_mut(0) {
            line.set_cell(0, cell);
            line.cache_runs(vec![]);
            assert!(!line.is_dirty());
        }

        p.set_focused(true);
        let later = Instant::now() + Duration::from_secs(5);
        assert!(p.tick(later));
        assert!(p.engine.line_mut(0).is_some_and(|l| l.is_dirty()));
    }

    #[test]
    #[cfg(unix)]
    fn test_launch_pump_and_exit() {
        let config = Config {
            shell: Some("/bin/sh".to_string()),
            args: vec!["-c".to_string(), "printf ready".to_string()],
            ..Config::default()
        };
        let engine = FakeEngine::new(80, 24);
        let mut p = TerminalPane::new(Box::new(engine), config);
        p.launch();
        assert!(p.session.is_some());

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut exits = Vec::new();
        while Instant::now() < deadline && exits.is_empty() {
            for event in p.pump().events {
                if let TerminalEvent::Exited(code) = event {
                    exits.push(code);
                }
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(exits, vec![0]);
        assert_eq!(p.exit_code(), Some(0));
        assert!(!p.is_running());
    }
}
