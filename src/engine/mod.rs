//! Terminal engine seam.
//!
//! The escape-sequence parser and cell buffer live outside this crate; the
//! pane consumes them through the [`Engine`] trait:
//!
//! - **write path**: decoded PTY output goes into [`Engine::write`], and any
//!   auto-replies the engine produces (device status queries, ...) come back
//!   out of [`Engine::take_responses`] to be written to the PTY
//! - **query surface**: buffer lines, dimensions, cursor, and the protocol
//!   mode flags that steer input encoding
//! - **event surface**: [`Engine::take_events`] drains buffer switches,
//!   title changes, cursor style changes, window manipulation requests and
//!   bell notifications

pub mod cell;

use crate::input::keys::{Modifiers, MouseButton, MouseEventKind};
use cell::{CursorPos, CursorShape, Line};

/// Mouse tracking mode requested by the application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MouseTrackingMode {
    #[default]
    None,
    X10,
    Normal,
    ButtonEvent,
    AnyEvent,
}

impl MouseTrackingMode {
    pub fn is_active(&self) -> bool {
        !matches!(self, MouseTrackingMode::None)
    }
}

/// Notifications drained from the engine after each write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// Switched to (true) or away from (false) the alternate screen.
    BufferSwitched(bool),
    TitleChanged(String),
    CursorStyleChanged { shape: CursorShape, blink: bool },
    Bell,
    WindowMoved(i32, i32),
    WindowResized(u32, u32),
    WindowMinimized,
    WindowMaximized,
    WindowRestored,
    WindowRaised,
    WindowLowered,
    WindowFullscreened,
}

/// The terminal emulation collaborator.
///
/// Implementations own the cell buffer and the escape-sequence parser. They
/// are expected to mark mutated lines dirty (`Line::touch`) so the renderer
/// only re-segments what changed.
pub trait Engine {
    /// Feed decoded output from the child process.
    fn write(&mut self, data: &str);

    fn resize(&mut self, cols: u16, rows: u16);

    fn cols(&self) -> u16;
    fn rows(&self) -> u16;

    /// Total number of lines in the buffer, scrollback included.
    fn total_lines(&self) -> usize;

    /// Line at an absolute buffer index (0 = oldest scrollback line).
    fn line(&self, y: usize) -> Option<&Line>;
    fn line_mut(&mut self, y: usize) -> Option<&mut Line>;

    /// Cursor position relative to the active screen area.
    fn cursor(&self) -> CursorPos;

    /// Absolute buffer index of the first line of the active screen area.
    /// The cursor's absolute line is `base_line() + cursor().row`.
    fn base_line(&self) -> usize;

    fn cursor_visible(&self) -> bool;

    fn alternate_screen(&self) -> bool;
    fn mouse_tracking(&self) -> MouseTrackingMode;
    fn reports_focus(&self) -> bool;

    /// Whether the application enabled Win32 extended input mode.
    fn win32_input(&self) -> bool;

    /// Control/meta re-encoding rule for a character key that has no entry
    /// in the fixed named-key table.
    fn encode_char(&self, ch: char, modifiers: Modifiers) -> Option<Vec<u8>>;

    /// Mouse sequence generation for the active tracking mode. Column and
    /// row are passed through untouched.
    fn encode_mouse(
        &self,
        button: MouseButton,
        col: i32,
        row: i32,
        kind: MouseEventKind,
        modifiers: Modifiers,
    ) -> Option<Vec<u8>>;

    /// Focus-gained/lost sequence, when focus reporting is on.
    fn encode_focus(&self, gained: bool) -> Option<Vec<u8>>;

    /// Bytes the engine wants sent to the child (query auto-replies).
    fn take_responses(&mut self) -> Vec<Vec<u8>>;

    /// Pending notifications, drained in order.
    fn take_events(&mut self) -> Vec<EngineEvent>;
}
