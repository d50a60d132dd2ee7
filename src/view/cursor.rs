//! Cursor blink state machine.
//!
//! The cursor blinks only while the pane is focused and blinking is enabled;
//! in every other state it is forced visible. The pane drives ticks from its
//! host's timer through [`CursorBlink::poll`].

use std::time::{Duration, Instant};

/// Default toggle interval in milliseconds.
pub const DEFAULT_BLINK_RATE_MS: u64 = 530;

/// Focus-gated visibility toggle for the cursor.
#[derive(Clone, Debug)]
pub struct CursorBlink {
    enabled: bool,
    rate: Duration,
    visible: bool,
    focused: bool,
    next_toggle: Option<Instant>,
}

impl CursorBlink {
    pub fn new(enabled: bool, rate: Duration) -> Self {
        Self {
            enabled,
            rate,
            visible: true,
            focused: false,
            next_toggle: None,
        }
    }

    /// Whether the cursor is in its visible phase right now.
    pub fn phase_visible(&self) -> bool {
        self.visible
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the toggle timer should be running.
    pub fn blinking(&self) -> bool {
        self.enabled && self.focused
    }

    /// Focus gained: reset to the visible phase and arm the timer if
    /// blinking is enabled.
    pub fn focus_gained(&mut self, now: Instant) {
        self.focused = true;
        self.visible = true;
        self.rearm(now);
    }

    /// Focus lost: stop the timer and force the visible phase. Rendering an
    /// outline cursor for unfocused panes is the renderer's concern.
    pub fn focus_lost(&mut self) {
        self.focused = false;
        self.visible = true;
        self.next_toggle = None;
    }

    /// Toggle the blink-enabled flag. Takes effect immediately while
    /// focused; while unfocused the cursor stays visible either way.
    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        self.enabled = enabled;
        if !enabled {
            self.visible = true;
        }
        self.rearm(now);
    }

    pub fn set_rate(&mut self, rate: Duration, now: Instant) {
        self.rate = rate;
        self.rearm(now);
    }

    /// A timer tick: toggles the phase only while focused and enabled.
    pub fn on_tick(&mut self) {
        if self.blinking() {
            self.visible = !self.visible;
        }
    }

    /// Advance the internal deadline; returns true when the phase toggled
    /// and the cursor cell needs a redraw.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.next_toggle else {
            return false;
        };
        if now < deadline {
            return false;
        }
        self.on_tick();
        self.next_toggle = Some(now + self.rate);
        true
    }

    /// Deadline of the next toggle, for hosts that schedule wakeups.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_toggle
    }

    fn rearm(&mut self, now: Instant) {
        self.next_toggle = if self.blinking() {
            Some(now + self.rate)
        } else {
            None
        };
    }
}

impl Default for CursorBlink {
    fn default() -> Self {
        Self::new(true, Duration::from_millis(DEFAULT_BLINK_RATE_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blink() -> CursorBlink {
        CursorBlink::new(true, Duration::from_millis(100))
    }

    #[test]
    fn test_ticks_toggle_while_focused() {
        let mut b = blink();
        b.focus_gained(Instant::now());
        assert!(b.phase_visible());

        b.on_tick();
        assert!(!b.phase_visible());
        b.on_tick();
        assert!(b.phase_visible());
    }

    #[test]
    fn test_never_blinks_unfocused() {
        let mut b = blink();
        assert!(!b.blinking());
        b.on_tick();
        assert!(b.phase_visible());
    }

    #[test]
    fn test_focus_lost_forces_visible() {
        let mut b = blink();
        b.focus_gained(Instant::now());
        b.on_tick();
        assert!(!b.phase_visible());

        b.focus_lost();
        assert!(b.phase_visible());
        assert!(b.next_deadline().is_none());
    }

    #[test]
    fn test_disabled_never_toggles() {
        let mut b = blink();
        let now = Instant::now();
        b.focus_gained(now);
        b.set_enabled(false, now);

        b.on_tick();
        assert!(b.phase_visible());
        assert!(b.next_deadline().is_none());
    }

    #[test]
    fn test_enabling_while_unfocused_has_no_effect_until_focus() {
        let now = Instant::now();
        let mut b = CursorBlink::new(false, Duration::from_millis(100));
        b.set_enabled(true, now);
        assert!(!b.blinking());
        assert!(b.next_deadline().is_none());

        b.focus_gained(now);
        assert!(b.blinking());
        assert!(b.next_deadline().is_some());
    }

    #[test]
    fn test_poll_respects_deadline() {
        let now = Instant::now();
        let mut b = blink();
        b.focus_gained(now);

        assert!(!b.poll(now + Duration::from_millis(50)));
        assert!(b.phase_visible());

        assert!(b.poll(now + Duration::from_millis(150)));
        assert!(!b.phase_visible());
    }
}
