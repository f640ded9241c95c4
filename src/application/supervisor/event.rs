//! Supervisor events

use std::path::PathBuf;
use std::time::Instant;

/// Everything the supervisor thread reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    /// A key pressed on the interactive console.
    Key(char),
    /// A watcher reported a changed source path, or a failed sync of one is
    /// due for another attempt.
    FileChanged {
        /// Index of the application in the orchestrator.
        application: usize,
        path: PathBuf,
        /// When the change was first reported.
        observed: Instant,
        /// Sync attempt to make, starting at 1.
        attempt: u32,
    },
    /// Termination signal.
    Terminate,
}

impl SupervisorEvent {
    pub fn file_changed(application: usize, path: impl Into<PathBuf>) -> Self {
        Self::FileChanged {
            application,
            path: path.into(),
            observed: Instant::now(),
            attempt: 1,
        }
    }
}

/// Interactive key bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    RecycleAll,
    Quit,
}

impl KeyCommand {
    /// `r` recycles, `q` quits, anything else is ignored.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'r' => Some(Self::RecycleAll),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Whether the run loop keeps going after a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}
