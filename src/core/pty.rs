//! Cross-platform PTY wrapper
//!
//! This module provides spawning of a child process behind a pseudo
//! terminal, with resize and handle access for the session layer.

use std::io::{self, Read, Write};
use std::path::PathBuf;

use portable_pty::{native_pty_system, Child, ChildKiller, CommandBuilder, MasterPty, PtySize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PtyError {
    #[error("Failed to open pseudo terminal: {0}")]
    Open(#[source] anyhow::Error),

    #[error("Failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to resize pseudo terminal: {0}")]
    Resize(#[source] anyhow::Error),

    #[error("Failed to write to PTY: {0}")]
    Write(#[source] io::Error),

    #[error("Failed to read from PTY: {0}")]
    Read(#[source] io::Error),

    #[error("Session is not running")]
    NotRunning,
}

pub type Result<T> = std::result::Result<T, PtyError>;

/// Options for spawning the child process.
#[derive(Clone, Debug, Default)]
pub struct SpawnOptions {
    /// Executable name or path; the platform default shell when empty.
    pub command: Option<String>,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    pub cols: u16,
    pub rows: u16,
}

impl SpawnOptions {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            ..Self::default()
        }
    }

    /// The command to run, falling back to the platform default shell.
    pub fn resolved_command(&self) -> String {
        match &self.command {
            Some(cmd) if !cmd.is_empty() => cmd.clone(),
            _ => default_shell(),
        }
    }
}

/// Platform-conventional shell: the Windows command shell on Windows, the
/// login shell (or `sh`) elsewhere.
pub fn default_shell() -> String {
    #[cfg(windows)]
    {
        std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
    }
    #[cfg(not(windows))]
    {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
}

/// A spawned child process behind a PTY.
pub struct PtyProcess {
    master: Box<dyn MasterPty + Send>,
    child: Option<Box<dyn Child + Send + Sync>>,
    killer: Box<dyn ChildKiller + Send + Sync>,
    pid: Option<u32>,
}

impl PtyProcess {
    /// Open a PTY and spawn the configured command on its slave side.
    pub fn spawn(options: &SpawnOptions) -> Result<Self> {
        let command = options.resolved_command();
        debug!(command = %command, cols = options.cols, rows = options.rows, "spawning pty child");

        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows: options.rows,
                cols: options.cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(PtyError::Open)?;

        let mut cmd = CommandBuilder::new(&command);
        cmd.args(&options.args);
        if let Some(cwd) = &options.cwd {
            cmd.cwd(cwd);
        }
        for (key, value) in &options.env {
            cmd.env(key, value);
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|source| PtyError::Spawn { command, source })?;

        // The slave side now belongs to the child.
        drop(pair.slave);

        let killer = child.clone_killer();
        let pid = child.process_id();

        Ok(Self {
            master: pair.master,
            child: Some(child),
            killer,
            pid,
        })
    }

    /// Clone a reader for the child's output stream.
    pub fn reader(&self) -> Result<Box<dyn Read + Send>> {
        self.master.try_clone_reader().map_err(PtyError::Open)
    }

    /// Take the writer for the child's input stream. Callable once.
    pub fn writer(&mut self) -> Result<Box<dyn Write + Send>> {
        self.master.take_writer().map_err(PtyError::Open)
    }

    /// Take the child handle for the exit watcher. Callable once.
    pub fn take_child(&mut self) -> Option<Box<dyn Child + Send + Sync>> {
        self.child.take()
    }

    /// A handle that can kill the child from any thread.
    pub fn killer(&self) -> Box<dyn ChildKiller + Send + Sync> {
        self.killer.clone_killer()
    }

    pub fn process_id(&self) -> Option<u32> {
        self.pid
    }

    pub fn resize(&self, cols: u16, rows: u16) -> Result<()> {
        self.master
            .resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(PtyError::Resize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_platform_shell() {
        let options = SpawnOptions::new(80, 24);
        assert_eq!(options.resolved_command(), default_shell());

        let options = SpawnOptions {
            command: Some("vim".to_string()),
            ..SpawnOptions::new(80, 24)
        };
        assert_eq!(options.resolved_command(), "vim");
    }

    #[test]
    #[cfg(unix)]
    fn test_spawn_and_resize() {
        let options = SpawnOptions {
            command: Some("/bin/sh".to_string()),
            args: vec!["-c".to_string(), "exit 0".to_string()],
            ..SpawnOptions::new(80, 24)
        };
        let pty = PtyProcess::spawn(&options).expect("spawn sh");
        assert!(pty.resize(132, 43).is_ok());
    }
}
