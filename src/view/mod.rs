//! View-side state and rendering.
//!
//! - **viewport**: windowed view over the scrollback buffer
//! - **cursor**: focus-gated cursor blink state machine
//! - **segment**: row-of-cells to minimal styled runs
//! - **draw**: frame rendering against the host draw sink

pub mod cursor;
pub mod draw;
pub mod segment;
pub mod viewport;

pub use cursor::CursorBlink;
pub use draw::{CellMetrics, DrawSink, Rect, TextPaint};
pub use segment::TextRun;
pub use viewport::Viewport;
