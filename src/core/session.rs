//! Session management
//!
//! A [`Session`] owns one child process behind a PTY: a background reader
//! thread drains its output into an event channel, an exit watcher thread
//! waits on the child, and all writes go through a single mutual-exclusion
//! gate so concurrent senders cannot interleave partial sequences.
//!
//! EOF on the output stream and the watcher's explicit exit notification
//! converge on one guarded mark-exited operation, so subscribers observe the
//! exit exactly once whichever path wins.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use portable_pty::ChildKiller;
use tracing::{debug, warn};

use super::pty::{PtyError, PtyProcess, Result, SpawnOptions};

/// Output read buffer size.
const READ_BUFFER_SIZE: usize = 8192;

/// How long the EOF path waits for the exit watcher to claim the exit with
/// the child's real code before falling back to its best-effort value.
const EXIT_CLAIM_GRACE: Duration = Duration::from_millis(500);

/// Poll step while waiting out [`EXIT_CLAIM_GRACE`].
const EXIT_CLAIM_STEP: Duration = Duration::from_millis(10);

/// Events delivered from the background threads to the UI-owning context.
#[derive(Debug)]
pub enum SessionEvent {
    /// Raw output bytes from the child.
    Output(Vec<u8>),
    /// The child exited; delivered at most once per session.
    Exited(u32),
    /// The read loop failed (not teardown) and stopped.
    ReadError(String),
}

/// Single compare-and-set guard for the exit notification.
///
/// EOF detection and the explicit exit watcher both call [`ExitGuard::try_mark`];
/// only the winner records a code and reports the exit.
#[derive(Debug, Default)]
pub struct ExitGuard {
    claimed: AtomicBool,
    code: Mutex<Option<u32>>,
}

impl ExitGuard {
    /// Claim the exit with the given code. Returns true for the single
    /// caller that wins; everyone else gets false.
    pub fn try_mark(&self, code: u32) -> bool {
        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let mut slot = self.code.lock().unwrap_or_else(|e| e.into_inner());
            *slot = Some(code);
            true
        } else {
            false
        }
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    /// The recorded exit code; valid only after the exit was claimed.
    pub fn code(&self) -> Option<u32> {
        *self.code.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A live child process behind a PTY.
pub struct Session {
    pty: PtyProcess,
    writer: Mutex<Box<dyn Write + Send>>,
    events: Receiver<SessionEvent>,
    running: Arc<AtomicBool>,
    exit: Arc<ExitGuard>,
    killer: Box<dyn ChildKiller + Send + Sync>,
    reader_thread: Option<JoinHandle<()>>,
    waiter_thread: Option<JoinHandle<()>>,
    cols: u16,
    rows: u16,
}

impl Session {
    /// Spawn the configured command and start the background threads.
    pub fn spawn(options: &SpawnOptions) -> Result<Self> {
        let mut pty = PtyProcess::spawn(options)?;
        let writer = pty.writer()?;
        let reader = pty.reader()?;
        let child = pty.take_child().ok_or(PtyError::NotRunning)?;
        let killer = pty.killer();

        let (tx, rx) = mpsc::channel::<SessionEvent>();
        let running = Arc::new(AtomicBool::new(true));
        let exit = Arc::new(ExitGuard::default());

        let reader_thread = {
            let tx = tx.clone();
            let running = running.clone();
            let exit = exit.clone();
            thread::spawn(move || read_loop(reader, tx, running, exit))
        };

        let waiter_thread = {
            let running = running.clone();
            let exit = exit.clone();
            thread::spawn(move || wait_loop(child, tx, running, exit))
        };

        Ok(Self {
            pty,
            writer: Mutex::new(writer),
            events: rx,
            running,
            exit,
            killer,
            reader_thread: Some(reader_thread),
            waiter_thread: Some(waiter_thread),
            cols: options.cols,
            rows: options.rows,
        })
    }

    /// Write input to the child. Serialized through the write gate, so
    /// concurrent senders never interleave partial sequences.
    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(PtyError::NotRunning);
        }
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writer.write_all(bytes).map_err(PtyError::Write)?;
        writer.flush().map_err(PtyError::Write)
    }

    /// Resize both sides of the PTY.
    pub fn resize(&mut self, cols: u16, rows: u16) -> Result<()> {
        self.pty.resize(cols, rows)?;
        self.cols = cols;
        self.rows = rows;
        Ok(())
    }

    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    /// Next pending event, if any. Non-blocking.
    pub fn poll_event(&self) -> Option<SessionEvent> {
        self.events.try_recv().ok()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Exit code of the child; valid only after exit.
    pub fn exit_code(&self) -> Option<u32> {
        self.exit.code()
    }

    pub fn process_id(&self) -> Option<u32> {
        self.pty.process_id()
    }

    /// Stop the background loops and kill the child. Best-effort; teardown
    /// never fails.
    pub fn kill(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Err(err) = self.killer.kill() {
            debug!(error = %err, "kill after exit or without child");
        }
    }

    fn join_threads(&mut self) {
        if let Some(handle) = self.reader_thread.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.waiter_thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.kill();
        self.join_threads();
    }
}

/// Background read loop. A zero-length read is the canonical EOF signal and
/// is treated as process-exited; errors after the child died are the same
/// exit, reported by the watcher.
fn read_loop(
    mut reader: Box<dyn std::io::Read + Send>,
    tx: Sender<SessionEvent>,
    running: Arc<AtomicBool>,
    exit: Arc<ExitGuard>,
) {
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => {
                debug!("pty reader reached eof");
                running.store(false, Ordering::SeqCst);
                await_watcher(&exit);
                if exit.try_mark(0) {
                    let _ = tx.send(SessionEvent::Exited(0));
                }
                break;
            }
            Ok(n) => {
                if tx.send(SessionEvent::Output(buffer[..n].to_vec())).is_err() {
                    break;
                }
            }
            Err(err) => {
                if !running.load(Ordering::SeqCst) {
                    // Expected during teardown.
                    break;
                }
                running.store(false, Ordering::SeqCst);
                await_watcher(&exit);
                if exit.is_claimed() {
                    // The child exited and the watcher already reported it;
                    // the failed read was just the closed PTY.
                    break;
                }
                warn!(error = %err, "pty read failed");
                let _ = tx.send(SessionEvent::ReadError(err.to_string()));
                if exit.try_mark(0) {
                    let _ = tx.send(SessionEvent::Exited(0));
                }
                break;
            }
        }
    }
}

/// Give the exit watcher first claim at the real exit code.
fn await_watcher(exit: &ExitGuard) {
    let deadline = std::time::Instant::now() + EXIT_CLAIM_GRACE;
    while !exit.is_claimed() && std::time::Instant::now() < deadline {
        thread::sleep(EXIT_CLAIM_STEP);
    }
}

/// Exit watcher: blocks on the child and reports its real exit code.
fn wait_loop(
    mut child: Box<dyn portable_pty::Child + Send + Sync>,
    tx: Sender<SessionEvent>,
    running: Arc<AtomicBool>,
    exit: Arc<ExitGuard>,
) {
    let code = match child.wait() {
        Ok(status) => status.exit_code(),
        Err(err) => {
            debug!(error = %err, "child wait failed");
            0
        }
    };
    running.store(false, Ordering::SeqCst);
    if exit.try_mark(code) {
        debug!(code, "child exited");
        let _ = tx.send(SessionEvent::Exited(code));
    }
}
