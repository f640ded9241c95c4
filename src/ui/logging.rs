//! Tracing subscriber initialisation.
//!
//! # Verbosity mapping
//!
//! | Flag(s) | Filter level |
//! |---------|--------------|
//! | (none)  | INFO         |
//! | `-v`    | DEBUG        |
//! | `-vv`   | TRACE        |
//!
//! `STAGEHAND_LOG` overrides all of the above if set.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV_VAR: &str = "STAGEHAND_LOG";

static RAW_TERMINAL: AtomicBool = AtomicBool::new(false);

/// Tell the log writer whether the terminal is in raw mode.
pub fn set_raw_terminal(raw: bool) {
    RAW_TERMINAL.store(raw, Ordering::SeqCst);
}

/// Initialise the global tracing subscriber. Logs go to stderr.
pub fn init_logging(verbose: u8, json: bool) -> anyhow::Result<()> {
    let level = derive_level(verbose);
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(format!("stagehand={level},warn")));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_writer(|| ConsoleWriter),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(use_ansi())
                    .with_writer(|| ConsoleWriter),
            )
            .try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))
}

fn use_ansi() -> bool {
    use is_terminal::IsTerminal;
    io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn derive_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Stderr writer that emits `\r\n` while the terminal is in raw mode.
struct ConsoleWriter;

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if RAW_TERMINAL.load(Ordering::SeqCst) {
            io::stderr().write_all(&crlf(buf))?;
            Ok(buf.len())
        } else {
            io::stderr().write(buf)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

fn crlf(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len() + 8);
    let mut previous = 0u8;
    for &byte in buf {
        if byte == b'\n' && previous != b'\r' {
            out.push(b'\r');
        }
        out.push(byte);
        previous = byte;
    }
    out
}
