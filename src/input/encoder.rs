//! Input encoding: UI events to PTY byte sequences.
//!
//! Two mutually exclusive encodings, selected by the engine (never locally):
//!
//! - **Standard**: named keys map to their canonical escape sequences via a
//!   fixed table; Ctrl/Alt-modified characters re-encode through the
//!   engine's control/meta rule; plain characters are left to the separate
//!   text-input channel so composed/IME input is not double-sent.
//! - **Win32 extended**: every key-down and key-up becomes a structured
//!   `ESC [ Vk ; Sc ; Uc ; Kd ; Cs ; Rc _` record and the text channel is
//!   suppressed entirely.
//!
//! Every encode operation that produces no bytes is a no-op, not an error.

use crate::engine::Engine;
use crate::view::draw::CellMetrics;

use super::keys::{
    fallback_char, is_enhanced, virtual_key, ControlKeyState, Key, KeyInput, Modifiers,
    MouseButton, MouseEventKind,
};

/// Stateless encoder; mode flags are read from the engine on every call.
pub struct InputEncoder;

impl InputEncoder {
    /// Encode a key event. Returns `None` when the event should be ignored
    /// or deferred to the text-input channel.
    pub fn encode_key(engine: &dyn Engine, input: &KeyInput) -> Option<Vec<u8>> {
        if engine.win32_input() {
            if let Some(record) = Self::win32_record(input) {
                return Some(record);
            }
            // No virtual key for this event; fall back to normal handling.
        }

        // Standard mode only reacts to key-down.
        if !input.down {
            return None;
        }

        if let Some(sequence) = Self::named_key_sequence(input.key, input.modifiers) {
            return Some(sequence);
        }

        if let Key::Char(_) = input.key {
            if input
                .modifiers
                .intersects(Modifiers::CTRL | Modifiers::ALT)
            {
                let ch = Self::resolve_char(input)?;
                return engine.encode_char(ch, input.modifiers);
            }
            // Plain characters arrive through the text-input channel.
        }

        None
    }

    /// Encode committed text (keyboard characters, IME composition, paste).
    pub fn encode_text(engine: &dyn Engine, text: &str) -> Option<Vec<u8>> {
        // Win32 mode already carries character data on key-down/up records.
        if engine.win32_input() || text.is_empty() {
            return None;
        }
        Some(text.as_bytes().to_vec())
    }

    /// Encode a pointer event. Active only while the engine reports a mouse
    /// tracking mode; column/row come from the pixel position divided by the
    /// cell metrics and are passed through unclamped.
    pub fn encode_mouse(
        engine: &dyn Engine,
        metrics: &CellMetrics,
        x: f64,
        y: f64,
        button: MouseButton,
        kind: MouseEventKind,
        modifiers: Modifiers,
    ) -> Option<Vec<u8>> {
        if !engine.mouse_tracking().is_active() {
            return None;
        }
        let col = (x / metrics.cell_width) as i32;
        let row = (y / metrics.cell_height) as i32;
        engine.encode_mouse(button, col, row, kind, modifiers)
    }

    /// Encode a focus transition, when the application asked for them.
    pub fn encode_focus(engine: &dyn Engine, gained: bool) -> Option<Vec<u8>> {
        if !engine.reports_focus() {
            return None;
        }
        engine.encode_focus(gained)
    }

    /// Resolution order: platform symbol, then the static fallback table.
    fn resolve_char(input: &KeyInput) -> Option<char> {
        input
            .symbol
            .or_else(|| fallback_char(input.key, input.modifiers))
    }

    /// Build a Win32 INPUT_RECORD sequence: `ESC [ Vk ; Sc ; Uc ; Kd ; Cs ; Rc _`.
    /// Returns `None` for keys without a virtual-key mapping.
    fn win32_record(input: &KeyInput) -> Option<Vec<u8>> {
        let vk = virtual_key(input.key);
        if vk == 0 {
            return None;
        }

        // No hardware scan code is available from a UI event.
        let scan_code = 0;

        let unicode_char = match Self::resolve_char(input) {
            Some(ch) => ch as u32,
            None => match input.key {
                Key::Enter => 0x0D,
                Key::Tab => 0x09,
                Key::Backspace => 0x08,
                Key::Escape => 0x1B,
                _ => 0,
            },
        };

        let mut state = ControlKeyState::empty();
        if input.modifiers.contains(Modifiers::SHIFT) {
            state |= ControlKeyState::SHIFT_PRESSED;
        }
        if input.modifiers.contains(Modifiers::CTRL) {
            state |= ControlKeyState::LEFT_CTRL_PRESSED;
        }
        if input.modifiers.contains(Modifiers::ALT) {
            state |= ControlKeyState::LEFT_ALT_PRESSED;
        }
        if is_enhanced(input.key) {
            state |= ControlKeyState::ENHANCED_KEY;
        }

        let key_down = if input.down { 1 } else { 0 };
        let repeat_count = 1;

        Some(
            format!(
                "\x1b[{};{};{};{};{};{}_",
                vk,
                scan_code,
                unicode_char,
                key_down,
                state.bits(),
                repeat_count
            )
            .into_bytes(),
        )
    }

    /// Fixed table for named keys, with xterm modifier codes.
    fn named_key_sequence(key: Key, mods: Modifiers) -> Option<Vec<u8>> {
        match key {
            Key::Enter => Some(vec![0x0D]),

            Key::Backspace => {
                if mods.contains(Modifiers::ALT) {
                    Some(vec![0x1B, 0x7F])
                } else {
                    Some(vec![0x7F])
                }
            }

            Key::Tab => {
                if mods.contains(Modifiers::SHIFT) {
                    Some(b"\x1b[Z".to_vec())
                } else {
                    Some(vec![0x09])
                }
            }

            Key::Escape => Some(vec![0x1B]),

            Key::Up => Some(Self::arrow_key(b'A', mods)),
            Key::Down => Some(Self::arrow_key(b'B', mods)),
            Key::Right => Some(Self::arrow_key(b'C', mods)),
            Key::Left => Some(Self::arrow_key(b'D', mods)),

            Key::Home => Some(Self::special_key(b'H', mods)),
            Key::End => Some(Self::special_key(b'F', mods)),
            Key::PageUp => Some(Self::tilde_key(5, mods)),
            Key::PageDown => Some(Self::tilde_key(6, mods)),
            Key::Insert => Some(Self::tilde_key(2, mods)),
            Key::Delete => Some(Self::tilde_key(3, mods)),

            Key::F(n) => Self::function_key(n, mods),

            Key::Char(_) => None,
        }
    }

    fn arrow_key(key: u8, mods: Modifiers) -> Vec<u8> {
        if mods.is_empty() {
            vec![0x1B, b'[', key]
        } else {
            format!("\x1b[1;{}{}", Self::modifier_code(mods), key as char).into_bytes()
        }
    }

    fn special_key(key: u8, mods: Modifiers) -> Vec<u8> {
        if mods.is_empty() {
            vec![0x1B, b'[', key]
        } else {
            format!("\x1b[1;{}{}", Self::modifier_code(mods), key as char).into_bytes()
        }
    }

    fn tilde_key(code: u8, mods: Modifiers) -> Vec<u8> {
        if mods.is_empty() {
            format!("\x1b[{}~", code).into_bytes()
        } else {
            format!("\x1b[{};{}~", code, Self::modifier_code(mods)).into_bytes()
        }
    }

    fn function_key(n: u8, mods: Modifiers) -> Option<Vec<u8>> {
        let base: Vec<u8> = match n {
            1 => b"\x1bOP".to_vec(),
            2 => b"\x1bOQ".to_vec(),
            3 => b"\x1bOR".to_vec(),
            4 => b"\x1bOS".to_vec(),
            5 => b"\x1b[15~".to_vec(),
            6 => b"\x1b[17~".to_vec(),
            7 => b"\x1b[18~".to_vec(),
            8 => b"\x1b[19~".to_vec(),
            9 => b"\x1b[20~".to_vec(),
            10 => b"\x1b[21~".to_vec(),
            11 => b"\x1b[23~".to_vec(),
            12 => b"\x1b[24~".to_vec(),
            _ => return None,
        };

        if mods.is_empty() {
            return Some(base);
        }

        let mod_code = Self::modifier_code(mods);
        let sequence = match n {
            1..=4 => {
                // ESC O X -> ESC [ 1 ; mod X
                let key = base[2];
                format!("\x1b[1;{}{}", mod_code, key as char).into_bytes()
            }
            _ => {
                // ESC [ n ~ -> ESC [ n ; mod ~
                let code = String::from_utf8_lossy(&base[2..base.len() - 1]).into_owned();
                format!("\x1b[{};{}~", code, mod_code).into_bytes()
            }
        };
        Some(sequence)
    }

    fn modifier_code(mods: Modifiers) -> u8 {
        1 + if mods.contains(Modifiers::SHIFT) { 1 } else { 0 }
            + if mods.contains(Modifiers::ALT) { 2 } else { 0 }
            + if mods.contains(Modifiers::CTRL) { 4 } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fake::FakeEngine;
    use crate::engine::MouseTrackingMode;

    fn metrics() -> CellMetrics {
        CellMetrics {
            cell_width: 10.0,
            cell_height: 20.0,
        }
    }

    #[test]
    fn test_standard_arrow_keys() {
        let engine = FakeEngine::new(80, 24);

        let input = KeyInput::down(Key::Up, Modifiers::empty());
        assert_eq!(
            InputEncoder::encode_key(&engine, &input),
            Some(b"\x1b[A".to_vec())
        );

        let input = KeyInput::down(Key::Up, Modifiers::CTRL);
        assert_eq!(
            InputEncoder::encode_key(&engine, &input),
            Some(b"\x1b[1;5A".to_vec())
        );
    }

    #[test]
    fn test_standard_function_keys() {
        let engine = FakeEngine::new(80, 24);

        let input = KeyInput::down(Key::F(1), Modifiers::empty());
        assert_eq!(
            InputEncoder::encode_key(&engine, &input),
            Some(b"\x1bOP".to_vec())
        );

        let input = KeyInput::down(Key::F(5), Modifiers::empty());
        assert_eq!(
            InputEncoder::encode_key(&engine, &input),
            Some(b"\x1b[15~".to_vec())
        );

        let input = KeyInput::down(Key::F(5), Modifiers::SHIFT);
        assert_eq!(
            InputEncoder::encode_key(&engine, &input),
            Some(b"\x1b[15;2~".to_vec())
        );
    }

    #[test]
    fn test_ctrl_char_uses_engine_rule() {
        let engine = FakeEngine::new(80, 24);
        let input = KeyInput::down(Key::Char('c'), Modifiers::CTRL).with_symbol('c');
        assert_eq!(InputEncoder::encode_key(&engine, &input), Some(vec![0x03]));
    }

    #[test]
    fn test_plain_char_defers_to_text_channel() {
        // A plain key-down produces nothing; the text channel delivers the
        // character exactly once.
        let engine = FakeEngine::new(80, 24);

        let input = KeyInput::down(Key::Char('c'), Modifiers::empty()).with_symbol('c');
        assert_eq!(InputEncoder::encode_key(&engine, &input), None);
        assert_eq!(
            InputEncoder::encode_text(&engine, "c"),
            Some(b"c".to_vec())
        );
    }

    #[test]
    fn test_ctrl_c_single_delivery() {
        // Ctrl+C is handled on key-down; the text channel emits nothing for
        // it, so exactly one sequence is queued per physical press.
        let engine = FakeEngine::new(80, 24);
        let input = KeyInput::down(Key::Char('c'), Modifiers::CTRL).with_symbol('c');

        let mut queued = Vec::new();
        if let Some(bytes) = InputEncoder::encode_key(&engine, &input) {
            queued.push(bytes);
        }
        assert_eq!(queued, vec![vec![0x03]]);
    }

    #[test]
    fn test_win32_letter_key_down() {
        let mut engine = FakeEngine::new(80, 24);
        engine.win32 = true;

        let input = KeyInput::down(Key::Char('a'), Modifiers::empty()).with_symbol('a');
        assert_eq!(
            InputEncoder::encode_key(&engine, &input),
            Some(b"\x1b[65;0;97;1;0;1_".to_vec())
        );
    }

    #[test]
    fn test_win32_shifted_letter() {
        let mut engine = FakeEngine::new(80, 24);
        engine.win32 = true;

        let input = KeyInput::down(Key::Char('a'), Modifiers::SHIFT).with_symbol('a');
        assert_eq!(
            InputEncoder::encode_key(&engine, &input),
            Some(b"\x1b[65;0;97;1;16;1_".to_vec())
        );
    }

    #[test]
    fn test_win32_key_up() {
        let mut engine = FakeEngine::new(80, 24);
        engine.win32 = true;

        let input = KeyInput::up(Key::Char('a'), Modifiers::empty()).with_symbol('a');
        assert_eq!(
            InputEncoder::encode_key(&engine, &input),
            Some(b"\x1b[65;0;97;0;0;1_".to_vec())
        );
    }

    #[test]
    fn test_win32_enter_sends_cr() {
        let mut engine = FakeEngine::new(80, 24);
        engine.win32 = true;

        let input = KeyInput::down(Key::Enter, Modifiers::empty());
        assert_eq!(
            InputEncoder::encode_key(&engine, &input),
            Some(b"\x1b[13;0;13;1;0;1_".to_vec())
        );
    }

    #[test]
    fn test_win32_arrow_is_enhanced() {
        let mut engine = FakeEngine::new(80, 24);
        engine.win32 = true;

        let input = KeyInput::down(Key::Up, Modifiers::empty());
        assert_eq!(
            InputEncoder::encode_key(&engine, &input),
            Some(b"\x1b[38;0;0;1;256;1_".to_vec())
        );
    }

    #[test]
    fn test_win32_suppresses_text() {
        let mut engine = FakeEngine::new(80, 24);
        engine.win32 = true;
        assert_eq!(InputEncoder::encode_text(&engine, "abc"), None);
    }

    #[test]
    fn test_standard_ignores_key_up() {
        let engine = FakeEngine::new(80, 24);
        let input = KeyInput::up(Key::Up, Modifiers::empty());
        assert_eq!(InputEncoder::encode_key(&engine, &input), None);
    }

    #[test]
    fn test_mouse_requires_tracking_mode() {
        let engine = FakeEngine::new(80, 24);
        assert_eq!(
            InputEncoder::encode_mouse(
                &engine,
                &metrics(),
                25.0,
                45.0,
                MouseButton::Left,
                MouseEventKind::Down,
                Modifiers::empty()
            ),
            None
        );
    }

    #[test]
    fn test_mouse_cell_from_pixels() {
        let mut engine = FakeEngine::new(80, 24);
        engine.mouse_mode = MouseTrackingMode::Normal;

        // 25px / 10px = col 2, 45px / 20px = row 2 (1-based 3;3 in the fake's
        // SGR output).
        assert_eq!(
            InputEncoder::encode_mouse(
                &engine,
                &metrics(),
                25.0,
                45.0,
                MouseButton::Left,
                MouseEventKind::Down,
                Modifiers::empty()
            ),
            Some(b"\x1b[<0;3;3M".to_vec())
        );
    }

    #[test]
    fn test_focus_requires_reporting_flag() {
        let mut engine = FakeEngine::new(80, 24);
        assert_eq!(InputEncoder::encode_focus(&engine, true), None);

        engine.focus_reports = true;
        assert_eq!(
            InputEncoder::encode_focus(&engine, true),
            Some(b"\x1b[I".to_vec())
        );
        assert_eq!(
            InputEncoder::encode_focus(&engine, false),
            Some(b"\x1b[O".to_vec())
        );
    }
}
