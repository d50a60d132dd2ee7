//! Input vocabulary: logical keys, modifiers, mouse events, and the static
//! lookup tables behind the Win32 extended input encoding.
//!
//! Hosts feed the pane with these neutral types; conversions from crossterm
//! events are provided for TUI hosts.

use bitflags::bitflags;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton as CtMouseButton,
    MouseEventKind as CtMouseEventKind,
};

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        let mut result = Modifiers::empty();
        if mods.contains(KeyModifiers::SHIFT) {
            result |= Modifiers::SHIFT;
        }
        if mods.contains(KeyModifiers::CONTROL) {
            result |= Modifiers::CTRL;
        }
        if mods.contains(KeyModifiers::ALT) {
            result |= Modifiers::ALT;
        }
        result
    }
}

bitflags! {
    /// Control key state bits of a Win32 KEY_EVENT_RECORD.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ControlKeyState: u16 {
        const RIGHT_ALT_PRESSED  = 0x0001;
        const LEFT_ALT_PRESSED   = 0x0002;
        const RIGHT_CTRL_PRESSED = 0x0004;
        const LEFT_CTRL_PRESSED  = 0x0008;
        const SHIFT_PRESSED      = 0x0010;
        const NUM_LOCK_ON        = 0x0020;
        const SCROLL_LOCK_ON     = 0x0040;
        const CAPS_LOCK_ON       = 0x0080;
        const ENHANCED_KEY       = 0x0100;
    }
}

/// A logical key. `Char` carries the layout-resolved character for printable
/// keys; everything else is a named key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Tab,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    F(u8),
}

/// A key event as delivered by the host UI.
///
/// `symbol` is the character the platform resolved for this press, when it
/// provides one; key resolution prefers it over the static fallback table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub symbol: Option<char>,
    pub modifiers: Modifiers,
    pub down: bool,
}

impl KeyInput {
    pub fn down(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            symbol: None,
            modifiers,
            down: true,
        }
    }

    pub fn up(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            symbol: None,
            modifiers,
            down: false,
        }
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = Some(symbol);
        self
    }

    /// Convert a crossterm key event. Returns `None` for keys the pane does
    /// not forward (media keys, bare modifiers, ...).
    pub fn from_crossterm(event: &KeyEvent) -> Option<Self> {
        let down = !matches!(event.kind, KeyEventKind::Release);
        let mut modifiers = Modifiers::from(event.modifiers);

        let (key, symbol) = match event.code {
            KeyCode::Char(c) => (Key::Char(c), Some(c)),
            KeyCode::Enter => (Key::Enter, None),
            KeyCode::Backspace => (Key::Backspace, None),
            KeyCode::Tab => (Key::Tab, None),
            KeyCode::BackTab => {
                modifiers |= Modifiers::SHIFT;
                (Key::Tab, None)
            }
            KeyCode::Esc => (Key::Escape, None),
            KeyCode::Up => (Key::Up, None),
            KeyCode::Down => (Key::Down, None),
            KeyCode::Left => (Key::Left, None),
            KeyCode::Right => (Key::Right, None),
            KeyCode::Home => (Key::Home, None),
            KeyCode::End => (Key::End, None),
            KeyCode::PageUp => (Key::PageUp, None),
            KeyCode::PageDown => (Key::PageDown, None),
            KeyCode::Insert => (Key::Insert, None),
            KeyCode::Delete => (Key::Delete, None),
            KeyCode::F(n) => (Key::F(n), None),
            _ => return None,
        };

        Some(Self {
            key,
            symbol,
            modifiers,
            down,
        })
    }
}

/// Mouse button identity as the engine expects it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    None,
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
}

/// Pointer event kind as the engine expects it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseEventKind {
    Down,
    Up,
    Drag,
    Move,
    WheelUp,
    WheelDown,
}

/// Convert a crossterm mouse event kind into the neutral button/kind pair.
pub fn mouse_from_crossterm(kind: CtMouseEventKind) -> Option<(MouseButton, MouseEventKind)> {
    let convert = |b: CtMouseButton| match b {
        CtMouseButton::Left => MouseButton::Left,
        CtMouseButton::Middle => MouseButton::Middle,
        CtMouseButton::Right => MouseButton::Right,
    };

    match kind {
        CtMouseEventKind::Down(b) => Some((convert(b), MouseEventKind::Down)),
        CtMouseEventKind::Up(b) => Some((convert(b), MouseEventKind::Up)),
        CtMouseEventKind::Drag(b) => Some((convert(b), MouseEventKind::Drag)),
        CtMouseEventKind::Moved => Some((MouseButton::None, MouseEventKind::Move)),
        CtMouseEventKind::ScrollUp => Some((MouseButton::WheelUp, MouseEventKind::WheelUp)),
        CtMouseEventKind::ScrollDown => Some((MouseButton::WheelDown, MouseEventKind::WheelDown)),
        _ => None,
    }
}

/// Windows virtual-key code for a logical key, 0 when there is none.
///
/// The table is platform-neutral: it maps logical key names, not hardware
/// scan codes.
pub fn virtual_key(key: Key) -> u16 {
    match key {
        Key::Char(c) => virtual_key_for_char(c),
        Key::Enter => 0x0D,
        Key::Backspace => 0x08,
        Key::Tab => 0x09,
        Key::Escape => 0x1B,
        Key::Up => 0x26,
        Key::Down => 0x28,
        Key::Left => 0x25,
        Key::Right => 0x27,
        Key::Home => 0x24,
        Key::End => 0x23,
        Key::PageUp => 0x21,
        Key::PageDown => 0x22,
        Key::Insert => 0x2D,
        Key::Delete => 0x2E,
        Key::F(n @ 1..=24) => 0x70 + (n as u16 - 1),
        Key::F(_) => 0,
    }
}

fn virtual_key_for_char(c: char) -> u16 {
    if c.is_ascii_alphabetic() {
        return c.to_ascii_uppercase() as u16;
    }
    if c.is_ascii_digit() {
        return c as u16;
    }

    match c {
        ' ' => 0x20,
        // Shifted digit symbols share the digit's virtual key (US layout).
        '!' => 0x31,
        '@' => 0x32,
        '#' => 0x33,
        '$' => 0x34,
        '%' => 0x35,
        '^' => 0x36,
        '&' => 0x37,
        '*' => 0x38,
        '(' => 0x39,
        ')' => 0x30,
        // OEM keys, unshifted and shifted forms.
        ';' | ':' => 0xBA,
        '=' | '+' => 0xBB,
        ',' | '<' => 0xBC,
        '-' | '_' => 0xBD,
        '.' | '>' => 0xBE,
        '/' | '?' => 0xBF,
        '`' | '~' => 0xC0,
        '[' | '{' => 0xDB,
        '\\' | '|' => 0xDC,
        ']' | '}' => 0xDD,
        '\'' | '"' => 0xDE,
        _ => 0,
    }
}

/// Static modifier-aware fallback when the platform supplies no symbol:
/// letters, digits with US-layout shifted symbols, common punctuation.
pub fn fallback_char(key: Key, modifiers: Modifiers) -> Option<char> {
    let shift = modifiers.contains(Modifiers::SHIFT);
    match key {
        Key::Char(c) if shift => Some(shifted(c)),
        Key::Char(c) => Some(c),
        _ => None,
    }
}

/// US-layout shifted form of a base character.
fn shifted(c: char) -> char {
    if c.is_ascii_lowercase() {
        return c.to_ascii_uppercase();
    }
    match c {
        '1' => '!',
        '2' => '@',
        '3' => '#',
        '4' => '$',
        '5' => '%',
        '6' => '^',
        '7' => '&',
        '8' => '*',
        '9' => '(',
        '0' => ')',
        '.' => '>',
        ',' => '<',
        '-' => '_',
        '=' => '+',
        ';' => ':',
        '\'' => '"',
        '`' => '~',
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '/' => '?',
        _ => c,
    }
}

/// Enhanced keys set the EnhancedKey bit in the Win32 control key state.
pub fn is_enhanced(key: Key) -> bool {
    matches!(
        key,
        Key::Insert
            | Key::Delete
            | Key::Home
            | Key::End
            | Key::PageUp
            | Key::PageDown
            | Key::Up
            | Key::Down
            | Key::Left
            | Key::Right
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_conversion() {
        let mods = Modifiers::from(KeyModifiers::SHIFT | KeyModifiers::CONTROL);
        assert!(mods.contains(Modifiers::SHIFT));
        assert!(mods.contains(Modifiers::CTRL));
        assert!(!mods.contains(Modifiers::ALT));
    }

    #[test]
    fn test_virtual_keys() {
        assert_eq!(virtual_key(Key::Char('a')), 0x41);
        assert_eq!(virtual_key(Key::Char('A')), 0x41);
        assert_eq!(virtual_key(Key::Char('5')), 0x35);
        assert_eq!(virtual_key(Key::Char('%')), 0x35);
        assert_eq!(virtual_key(Key::Enter), 0x0D);
        assert_eq!(virtual_key(Key::F(1)), 0x70);
        assert_eq!(virtual_key(Key::F(12)), 0x7B);
        assert_eq!(virtual_key(Key::Left), 0x25);
    }

    #[test]
    fn test_fallback_char_shift() {
        assert_eq!(fallback_char(Key::Char('a'), Modifiers::SHIFT), Some('A'));
        assert_eq!(fallback_char(Key::Char('1'), Modifiers::SHIFT), Some('!'));
        assert_eq!(fallback_char(Key::Char('1'), Modifiers::empty()), Some('1'));
        assert_eq!(fallback_char(Key::Enter, Modifiers::empty()), None);
    }

    #[test]
    fn test_enhanced_keys() {
        assert!(is_enhanced(Key::Up));
        assert!(is_enhanced(Key::Delete));
        assert!(!is_enhanced(Key::Enter));
        assert!(!is_enhanced(Key::Char('a')));
    }

    #[test]
    fn test_backtab_maps_to_shift_tab() {
        let event = KeyEvent::new(KeyCode::BackTab, KeyModifiers::NONE);
        let input = KeyInput::from_crossterm(&event).unwrap();
        assert_eq!(input.key, Key::Tab);
        assert!(input.modifiers.contains(Modifiers::SHIFT));
    }
}
