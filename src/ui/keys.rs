//! Interactive key input
//!
//! In a terminal, keys are read one at a time in raw mode; otherwise stdin
//! is read byte by byte. Either way every key becomes a
//! [`SupervisorEvent::Key`].

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use is_terminal::IsTerminal;

use stagehand::application::SupervisorEvent;

use super::logging::set_raw_terminal;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Restores cooked mode on drop.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        set_raw_terminal(true);
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        set_raw_terminal(false);
        let _ = terminal::disable_raw_mode();
    }
}

/// Background key reader; stops reading when dropped.
pub struct KeyReader {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    _raw: Option<RawModeGuard>,
}

impl KeyReader {
    pub fn spawn(sender: Sender<SupervisorEvent>) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));

        if io::stdin().is_terminal() {
            let raw = RawModeGuard::enable()?;
            let flag = Arc::clone(&stop);
            let handle = thread::Builder::new()
                .name("keys".to_string())
                .spawn(move || read_terminal(sender, flag))?;
            return Ok(Self {
                stop,
                handle: Some(handle),
                _raw: Some(raw),
            });
        }

        // A blocking stdin read cannot be interrupted, so this thread is detached.
        thread::Builder::new()
            .name("keys".to_string())
            .spawn(move || read_stdin(sender))?;
        Ok(Self {
            stop,
            handle: None,
            _raw: None,
        })
    }
}

impl Drop for KeyReader {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn read_terminal(sender: Sender<SupervisorEvent>, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::SeqCst) {
        match event::poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => {
                tracing::warn!(error = %e, "key input unavailable");
                return;
            }
        }
        let key = match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => key,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "key input unavailable");
                return;
            }
        };
        let event = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                SupervisorEvent::Terminate
            }
            KeyCode::Char(c) => SupervisorEvent::Key(c),
            _ => continue,
        };
        if sender.send(event).is_err() {
            return;
        }
    }
}

fn read_stdin(sender: Sender<SupervisorEvent>) {
    for byte in io::stdin().lock().bytes() {
        let Ok(byte) = byte else { break };
        if byte.is_ascii_whitespace() {
            continue;
        }
        if sender.send(SupervisorEvent::Key(char::from(byte))).is_err() {
            return;
        }
    }
    tracing::debug!("stdin closed, key input disabled");
}
