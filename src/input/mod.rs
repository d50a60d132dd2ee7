//! Input handling: neutral event vocabulary and protocol encoding.
//!
//! - **keys**: logical keys, modifiers, mouse events, virtual-key tables,
//!   crossterm conversions
//! - **encoder**: standard and Win32-extended encoding against the engine's
//!   mode flags

pub mod encoder;
pub mod keys;

pub use encoder::InputEncoder;
pub use keys::{Key, KeyInput, Modifiers, MouseButton, MouseEventKind};
