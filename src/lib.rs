//! termpane - an embeddable PTY-backed terminal pane core
//!
//! termpane bridges a child process running behind a pseudo terminal and a
//! visual terminal surface. It owns the PTY lifecycle, pumps bytes in both
//! directions, maintains a windowed view over growing scrollback, encodes
//! UI input into the wire format the application selected, and drives the
//! cursor blink state machine.
//!
//! Two collaborators are supplied by the host:
//!
//! - a terminal **engine** ([`engine::Engine`]) that parses escape
//!   sequences and owns the cell buffer
//! - a **draw sink** ([`view::DrawSink`]) that turns styled runs and the
//!   cursor overlay into actual drawing
//!
//! # Quick start
//!
//! ```no_run
//! use termpane::{Config, TerminalPane};
//! # struct MyEngine;
//! # impl MyEngine { fn new() -> Box<dyn termpane::engine::Engine> { unimplemented!() } }
//!
//! let mut pane = TerminalPane::new(MyEngine::new(), Config::load());
//! pane.launch();
//!
//! // In the host's event loop:
//! // - forward key/text/mouse/wheel/focus/resize events to the pane
//! // - call pane.pump() and redraw when it asks to
//! // - call pane.render(&mut sink) to draw a frame
//! ```
//!
//! # Threading
//!
//! Each live session runs a background reader thread and an exit watcher
//! thread; everything else happens on the single context that owns the
//! pane. Writes to the PTY are serialized through a mutual-exclusion gate,
//! and the exit notification is delivered exactly once however the EOF and
//! exit-watcher paths race.

pub mod config;
pub mod core;
pub mod engine;
pub mod input;
pub mod terminal;
pub mod view;

pub use crate::config::Config;
pub use crate::core::pty::{default_shell, PtyError, SpawnOptions};
pub use crate::core::pump::PumpOutcome;
pub use crate::core::session::{Session, SessionEvent};
pub use crate::engine::cell::{
    AttrFlags, Cell, CellAttrs, Color, CursorPos, CursorShape, Line, LineAttr,
};
pub use crate::engine::{Engine, EngineEvent, MouseTrackingMode};
pub use crate::input::{InputEncoder, Key, KeyInput, Modifiers, MouseButton, MouseEventKind};
pub use crate::terminal::{TerminalEvent, TerminalPane};
pub use crate::view::{CellMetrics, CursorBlink, DrawSink, Rect, TextPaint, TextRun, Viewport};
