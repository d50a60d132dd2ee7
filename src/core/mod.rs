//! Process-side core: PTY lifecycle, session threads, output pump.
//!
//! - **pty**: cross-platform PTY spawning over portable-pty
//! - **session**: child process + reader/exit-watcher threads + write gate
//! - **pump**: UI-side drain of session output into the terminal engine
//!
//! # Architecture
//!
//! ```text
//! TerminalPane (UI context)
//! ├── OutputPump ── SessionEvent channel ── reader thread ── PTY master
//! └── Session
//!     ├── write gate (Mutex<Writer>)
//!     └── ExitGuard (EOF path and exit watcher converge here)
//! ```

pub mod pty;
pub mod pump;
pub mod session;

pub use pty::{default_shell, PtyError, SpawnOptions};
pub use pump::OutputPump;
pub use session::{Session, SessionEvent};
