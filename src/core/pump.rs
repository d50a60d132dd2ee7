//! Output pump
//!
//! Drains session events into the terminal engine on the UI-owning context:
//! decodes output as UTF-8 (carrying split sequences across chunk
//! boundaries), feeds the engine's single write entry point, forwards the
//! engine's auto-replies back to the PTY, snaps the viewport to the bottom,
//! and fans engine notifications out as [`TerminalEvent`]s.

use tracing::warn;

use crate::engine::{Engine, EngineEvent};
use crate::terminal::TerminalEvent;
use crate::view::viewport::Viewport;

use super::session::{Session, SessionEvent};

/// What a drain pass produced.
#[derive(Debug, Default)]
pub struct PumpOutcome {
    pub events: Vec<TerminalEvent>,
    pub needs_redraw: bool,
}

/// UI-side pump between the session's event channel and the engine.
#[derive(Default)]
pub struct OutputPump {
    utf8_carry: Vec<u8>,
}

impl OutputPump {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything the session has pending, plus the engine's own
    /// notifications. Must run on the context that owns the engine and
    /// viewport.
    pub fn drain(
        &mut self,
        session: Option<&Session>,
        engine: &mut dyn Engine,
        viewport: &mut Viewport,
    ) -> PumpOutcome {
        let mut outcome = PumpOutcome::default();

        while let Some(event) = session.and_then(|s| s.poll_event()) {
            match event {
                SessionEvent::Output(bytes) => {
                    let text = self.decode(&bytes);
                    if !text.is_empty() {
                        engine.write(&text);
                    }
                    if let Some(session) = session {
                        for response in engine.take_responses() {
                            if let Err(err) = session.write(&response) {
                                warn!(error = %err, "failed to send engine response");
                            }
                        }
                    }
                    outcome.needs_redraw = true;
                }
                SessionEvent::Exited(code) => {
                    engine.write(&format!("\r\nProcess exited with code: {code}\r\n"));
                    outcome.events.push(TerminalEvent::Exited(code));
                    outcome.needs_redraw = true;
                }
                SessionEvent::ReadError(message) => {
                    engine.write(&format!("\r\nError reading from process: {message}\r\n"));
                    outcome.needs_redraw = true;
                }
            }
        }

        for event in engine.take_events() {
            if let EngineEvent::BufferSwitched(alternate) = event {
                viewport.set_alternate(alternate);
                outcome.needs_redraw = true;
            }
            outcome.events.push(TerminalEvent::from_engine(event));
        }

        viewport.sync(engine.total_lines(), engine.rows() as usize);
        if outcome.needs_redraw {
            // Output arrival always snaps the view back to live output.
            viewport.snap_to_bottom();
        }

        outcome
    }

    /// Decode a chunk, holding back a trailing incomplete UTF-8 sequence for
    /// the next read.
    fn decode(&mut self, bytes: &[u8]) -> String {
        let mut data = std::mem::take(&mut self.utf8_carry);
        data.extend_from_slice(bytes);

        match std::str::from_utf8(&data) {
            Ok(text) => text.to_string(),
            Err(err) => {
                let valid = err.valid_up_to();
                let mut text = String::from_utf8_lossy(&data[..valid]).into_owned();
                match err.error_len() {
                    // Incomplete sequence at the end of the chunk.
                    None if data.len() - valid < 4 => {
                        self.utf8_carry = data[valid..].to_vec();
                    }
                    // Invalid bytes: substitute and move on.
                    _ => {
                        text.push_str(&String::from_utf8_lossy(&data[valid..]));
                    }
                }
                text
            }
        }
    }
}
